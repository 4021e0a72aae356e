use projection_service::routes::visualization::{CosineResponse, EuclideanResponse};
use serde_json::json;
use std::f64::consts::FRAC_PI_2;

use crate::helpers::spawn_app;

fn comparison_body() -> serde_json::Value {
    json!({
        "main_patent": {
            "id": "US-1",
            "embedding": [1.0, 0.0, 0.0],
            "reduced_embedding": [0.0, 0.0, 0.0]
        },
        "cited_patents": [
            { "id": 2, "embedding": [0.0, 1.0, 0.0], "reduced_embedding": [3.0, 4.0, 0.0] },
            { "id": "US-3", "embedding": [2.0, 0.0, 0.0], "reduced_embedding": [0.0, 0.0, 0.0] }
        ]
    })
}

#[tokio::test]
async fn cosine_projection_returns_angles_in_order() {
    let app = spawn_app().await;

    let response = app.post_visualization("cosine", &comparison_body()).await;

    assert_eq!(200, response.status().as_u16());
    let body: CosineResponse = response.json().await.unwrap();
    assert_eq!(body.reference_axis, [1.0, 0.0]);
    assert_eq!(body.angles.len(), 2);
    assert_eq!(body.angles[0].id.to_string(), "2");
    assert!((body.angles[0].angle - FRAC_PI_2).abs() < 1e-12);
    assert_eq!(body.angles[1].id.to_string(), "US-3");
    assert_eq!(body.angles[1].angle, 0.0);
}

#[tokio::test]
async fn cosine_projection_rejects_a_zero_main_embedding() {
    let app = spawn_app().await;
    let mut body = comparison_body();
    body["main_patent"]["embedding"] = json!([0.0, 0.0, 0.0]);

    let response = app.post_visualization("cosine", &body).await;

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["error"]
        .as_str()
        .unwrap()
        .starts_with("Degenerate vector"));
}

#[tokio::test]
async fn cosine_projection_rejects_mismatched_dimensions() {
    let app = spawn_app().await;
    let mut body = comparison_body();
    body["cited_patents"][0]["embedding"] = json!([0.0, 1.0]);

    let response = app.post_visualization("cosine", &body).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn euclidean_projection_returns_distances() {
    let app = spawn_app().await;

    let response = app.post_visualization("euclidean", &comparison_body()).await;

    assert_eq!(200, response.status().as_u16());
    let body: EuclideanResponse = response.json().await.unwrap();
    assert_eq!(body.main_point, vec![0.0, 0.0, 0.0]);
    assert_eq!(body.distances[0].distance, 5.0);
    assert_eq!(body.distances[1].distance, 0.0);
}

#[tokio::test]
async fn euclidean_projection_requires_reduced_embeddings() {
    let app = spawn_app().await;
    let mut body = comparison_body();
    body["cited_patents"][1]
        .as_object_mut()
        .unwrap()
        .remove("reduced_embedding");

    let response = app.post_visualization("euclidean", &body).await;

    assert_eq!(400, response.status().as_u16());
}
