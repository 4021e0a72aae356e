use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use serde_json::json;
use tracing::info;

use crate::repositories::session_memory_repository::{
    Session, SessionMemoryRepository, SessionRepositoryError, SessionToken,
};

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct SessionResponse {
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_token: session.token.to_string(),
            expires_at: session.expires_at,
        }
    }
}

#[tracing::instrument(name = "Create session", skip(session_repository))]
pub async fn create_session(
    session_repository: web::Data<SessionMemoryRepository>,
) -> Result<HttpResponse, SessionError> {
    let session = session_repository.create(Utc::now())?;

    Ok(HttpResponse::Ok().json(SessionResponse::from(session)))
}

#[tracing::instrument(name = "Check session", skip(session_repository))]
pub async fn check_session(
    session_repository: web::Data<SessionMemoryRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, SessionError> {
    let token = SessionToken::parse(&path.into_inner())?;
    let session = session_repository.touch(&token, Utc::now())?;

    Ok(HttpResponse::Ok().json(SessionResponse::from(session)))
}

/// Clearing an unknown session succeeds: the session is gone either way
#[tracing::instrument(name = "Clear session", skip(session_repository))]
pub async fn clear_session(
    session_repository: web::Data<SessionMemoryRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, SessionError> {
    let token = SessionToken::parse(&path.into_inner())?;
    let removed = session_repository.remove(&token)?;

    info!(%token, removed, "Session cleared");
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

#[derive(thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    RepositoryError(#[from] SessionRepositoryError),
}

impl std::fmt::Debug for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::RepositoryError(SessionRepositoryError::InvalidToken(_)) => {
                StatusCode::BAD_REQUEST
            }
            SessionError::RepositoryError(SessionRepositoryError::SessionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            SessionError::RepositoryError(SessionRepositoryError::Poisoned(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from sessions controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
