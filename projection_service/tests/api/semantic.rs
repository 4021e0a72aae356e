use projection_service::domain::entities::lexical::LexicalSimilarityResult;
use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn identical_texts_are_fully_similar() {
    let app = spawn_app().await;
    let body = json!({
        "main_text": "patent claim for a widget",
        "cited_text": "patent claim for a widget"
    });

    let response = app.post_visualization("semantic", &body).await;

    assert_eq!(200, response.status().as_u16());
    let result: LexicalSimilarityResult = response.json().await.unwrap();
    assert!((result.similarity - 1.0).abs() < 1e-9);
    assert!(!result.main_terms.is_empty());
    assert_eq!(result.main_terms, result.cited_terms);
}

#[tokio::test]
async fn missing_or_empty_texts_are_rejected() {
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({ "main_text": "", "cited_text": "something" }), "empty main text"),
        (json!({ "main_text": "a rotor" }), "missing cited text"),
        (json!({ "main_text": "  ", "cited_text": "a rotor" }), "blank main text"),
    ];

    for (body, description) in test_cases {
        let response = app.post_visualization("semantic", &body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had an {}.",
            description
        );
    }
}
