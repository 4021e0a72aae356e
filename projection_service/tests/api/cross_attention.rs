use projection_service::domain::entities::token_sequence::CrossAttentionResult;
use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn cross_attention_rows_are_distributions_over_cited_tokens() {
    let app = spawn_app().await;
    let body = json!({
        "main_text": "A turbine blade mounted on a rotor.",
        "cited_text": "Rotor with blades"
    });

    let response = app.post_visualization("bert", &body).await;

    assert_eq!(200, response.status().as_u16());
    let result: CrossAttentionResult = response.json().await.unwrap();

    // Texts are padded by the encoder, no padding token reaches the response
    assert!(!result.tokens1.iter().any(|t| t == "[PAD]"));
    assert_eq!(result.tokens2, ["[CLS]", "rotor", "with", "blades", "[SEP]"]);
    assert_eq!(result.cross_attention.len(), result.tokens1.len());
    for row in &result.cross_attention {
        assert_eq!(row.len(), result.tokens2.len());
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
    }
    assert_eq!(result.is_special2, [true, false, false, false, true]);
    assert_eq!(result.is_special1.first(), Some(&true));
    assert_eq!(result.is_special1.last(), Some(&true));
}

#[tokio::test]
async fn blank_texts_are_rejected_before_encoding() {
    let app = spawn_app().await;
    let body = json!({ "main_text": "a gear", "cited_text": "   " });

    let response = app.post_visualization("bert", &body).await;

    assert_eq!(400, response.status().as_u16());
}
