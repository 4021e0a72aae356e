use anyhow::Context;
use common::{helper::error_chain_fmt, telemetry::spawn_blocking_with_tracing};
use std::sync::Arc;
use tracing::info;

use super::cross_attention_scorer::score_cross_attention;
use crate::{
    domain::{
        entities::token_sequence::CrossAttentionResult, projection_error::ProjectionError,
    },
    encoder::encoder_service::EncoderService,
};

#[derive(thiserror::Error)]
pub enum CrossAttentionServiceError {
    #[error(transparent)]
    ProjectionError(#[from] ProjectionError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CrossAttentionServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Compares two raw texts token by token: encodes them, then scores their cross-attention
pub struct CrossAttentionService {
    encoder_service: Arc<EncoderService>,
}

impl CrossAttentionService {
    pub fn new(encoder_service: Arc<EncoderService>) -> Self {
        Self { encoder_service }
    }

    /// Blank texts are rejected before reaching the encoder
    #[tracing::instrument(name = "Comparing texts with cross-attention", skip(self, main_text, cited_text))]
    pub async fn compare_texts(
        &self,
        main_text: &str,
        cited_text: &str,
    ) -> Result<CrossAttentionResult, CrossAttentionServiceError> {
        let main_text = main_text.trim();
        let cited_text = cited_text.trim();
        if main_text.is_empty() || cited_text.is_empty() {
            return Err(ProjectionError::EmptyInput(
                "main and cited texts are required".to_string(),
            )
            .into());
        }

        info!(
            main_len = main_text.len(),
            cited_len = cited_text.len(),
            "Encoding texts"
        );

        let mut sequences = self
            .encoder_service
            .encode(vec![main_text.to_string(), cited_text.to_string()])
            .await
            .map_err(|e| ProjectionError::EncoderFailure(e.to_string()))?;

        let (cited, main) = match (sequences.pop(), sequences.pop()) {
            (Some(cited), Some(main)) => (cited, main),
            _ => {
                return Err(ProjectionError::EncoderFailure(
                    "encoder did not return a sequence for each text".to_string(),
                )
                .into())
            }
        };

        let result = spawn_blocking_with_tracing(move || score_cross_attention(&main, &cited))
            .await
            .context("Failed to run the cross-attention scoring task")??;

        Ok(result)
    }
}
