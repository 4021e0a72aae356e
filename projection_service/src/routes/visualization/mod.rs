pub mod bert;
pub mod cosine;
pub mod euclidean;
pub mod semantic;

pub use bert::*;
pub use cosine::*;
pub use euclidean::*;
pub use semantic::*;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;

use crate::domain::{
    projection_error::ProjectionError,
    services::cross_attention_service::CrossAttentionServiceError,
};

/// Body of the text comparison routes
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct TextComparisonBodyData {
    #[serde(default)]
    pub main_text: Option<String>,
    #[serde(default)]
    pub cited_text: Option<String>,
}

impl TextComparisonBodyData {
    /// Both texts, missing ones being rejected like blank ones
    pub fn texts(self) -> Result<(String, String), VisualizationError> {
        match (self.main_text, self.cited_text) {
            (Some(main_text), Some(cited_text)) => Ok((main_text, cited_text)),
            _ => Err(ProjectionError::EmptyInput(
                "missing required fields: main_text or cited_text".to_string(),
            )
            .into()),
        }
    }
}

#[derive(thiserror::Error)]
pub enum VisualizationError {
    #[error(transparent)]
    ProjectionError(#[from] ProjectionError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl From<CrossAttentionServiceError> for VisualizationError {
    fn from(error: CrossAttentionServiceError) -> Self {
        match error {
            CrossAttentionServiceError::ProjectionError(error) => Self::ProjectionError(error),
            CrossAttentionServiceError::InternalError(error) => Self::InternalError(error),
        }
    }
}

impl std::fmt::Debug for VisualizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for VisualizationError {
    fn status_code(&self) -> StatusCode {
        match self {
            VisualizationError::ProjectionError(error) if error.is_caller_error() => {
                StatusCode::BAD_REQUEST
            }
            VisualizationError::ProjectionError(_) | VisualizationError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from visualization controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
