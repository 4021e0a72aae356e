use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::Settings,
    domain::services::cross_attention_service::CrossAttentionService,
    encoder::{encoder_service::EncoderService, hashing_encoder::HashingTokenEncoder},
    middlewares::session::middleware::RequireSession,
    repositories::session_memory_repository::SessionMemoryRepository,
    routes::{
        check_session, clear_session, create_session, health_check,
        visualization::{
            cosine_projection, cross_attention_comparison, euclidean_projection,
            semantic_comparison,
        },
    },
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application")]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let session_repository = SessionMemoryRepository::new(settings.session.ttl());

        // The encoder could come from the configuration, a single instance is shared by all workers
        let encoder = HashingTokenEncoder::new(&settings.encoder);
        let encoder_service = Arc::new(EncoderService::new(
            encoder,
            settings.encoder.channel_capacity,
        ));
        let cross_attention_service = CrossAttentionService::new(encoder_service);

        let server = run(
            listener,
            nb_workers,
            session_repository,
            cross_attention_service,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    session_repository: SessionMemoryRepository,
    cross_attention_service: CrossAttentionService,
) -> Result<Server, std::io::Error> {
    // Wraps services in a `actix_web::Data` (`Arc`) to share them among all workers
    let session_repository = Data::new(session_repository);
    let cross_attention_service = Data::new(cross_attention_service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(create_session))
                    .route("/{token}", web::get().to(check_session))
                    .route("/{token}", web::delete().to(clear_session)),
            )
            .service(
                web::scope("/api/visualization")
                    .wrap(RequireSession::new(session_repository.clone()))
                    .route("/cosine", web::post().to(cosine_projection))
                    .route("/euclidean", web::post().to(euclidean_projection))
                    .route("/semantic", web::post().to(semantic_comparison))
                    .route("/bert", web::post().to(cross_attention_comparison)),
            )
            .app_data(session_repository.clone())
            .app_data(cross_attention_service.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    Ok(server.run())
}
