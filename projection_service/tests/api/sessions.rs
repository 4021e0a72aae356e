use chrono::Utc;
use projection_service::routes::SessionResponse;
use uuid::Uuid;

use crate::helpers::spawn_app;

#[tokio::test]
async fn a_created_session_can_be_checked() {
    let app = spawn_app().await;
    let session = app.create_session().await;

    let response = app
        .client
        .get(&format!("{}/sessions/{}", &app.address, session.session_token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let checked: SessionResponse = response.json().await.unwrap();
    assert_eq!(checked.session_token, session.session_token);
    assert!(checked.expires_at > Utc::now());
}

#[tokio::test]
async fn a_cleared_session_is_not_found_anymore() {
    let app = spawn_app().await;
    let session = app.create_session().await;
    let session_url = format!("{}/sessions/{}", &app.address, session.session_token);

    let response = app.client.delete(&session_url).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());

    let response = app.client.get(&session_url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn clearing_an_unknown_session_succeeds() {
    let app = spawn_app().await;

    let response = app
        .client
        .delete(&format!("{}/sessions/{}", &app.address, Uuid::new_v4()))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn a_malformed_session_token_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&format!("{}/sessions/not-a-token", &app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn visualization_routes_require_a_live_session() {
    let app = spawn_app().await;
    let body = serde_json::json!({ "main_text": "a gear", "cited_text": "a shaft" });

    let without_token = app
        .post_visualization_with_token("semantic", &body, None)
        .await;
    let unknown_token = app
        .post_visualization_with_token("semantic", &body, Some(&Uuid::new_v4().to_string()))
        .await;

    assert_eq!(401, without_token.status().as_u16());
    assert_eq!(401, unknown_token.status().as_u16());
}
