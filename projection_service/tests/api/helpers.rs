use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use once_cell::sync::Lazy;
use projection_service::{
    configuration::get_configuration, middlewares::session::middleware::SESSION_TOKEN_HEADER,
    routes::SessionResponse, startup::Application,
};

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the type returned by `get_tracing_subscriber`,
    // so each branch initializes its own subscriber.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

/// A test API client / test suite
impl TestApp {
    pub async fn create_session(&self) -> SessionResponse {
        self.client
            .post(&format!("{}/sessions", &self.address))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse session response")
    }

    /// Posts a JSON body to a visualization route, within a new session
    pub async fn post_visualization(
        &self,
        route: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        let session = self.create_session().await;

        self.post_visualization_with_token(route, body, Some(&session.session_token))
            .await
    }

    pub async fn post_visualization_with_token(
        &self,
        route: &str,
        body: &serde_json::Value,
        session_token: Option<&str>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(&format!("{}/api/visualization/{}", &self.address, route))
            .json(body);

        if let Some(session_token) = session_token {
            request = request.header(SESSION_TOKEN_HEADER, session_token);
        }

        request.send().await.expect("Failed to execute request")
    }
}

/// Launches the server as a background task
/// When a tokio runtime is shut down all tasks spawned on it are dropped.
/// tokio::test spins up a new runtime at the beginning of each test case and they shut down at the end of each test case.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Port 0 makes the OS pick an available port
        c.application.port = 0;
        c.encoder.pad_to_multiple_of = Some(8);
        c
    };

    // Only one actix-web worker is needed for integration tests
    let application = Application::build(configuration, Some(1))
        .await
        .expect("Failed to build application.");

    let application_port = application.port();

    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        client: reqwest::Client::new(),
    }
}
