//! Turning texts into token sequences with hidden states.
//!
//! An encoder is a capability injected in the application. It is not assumed to be reentrant:
//! it only needs to be `Send`, and the [`encoder_service::EncoderService`] owns it on a
//! single runner thread so calls never interleave.

pub mod encoder_service;
pub mod hashing_encoder;

use common::helper::error_chain_fmt;

use crate::domain::entities::token_sequence::TokenSequence;

pub trait TokenEncoder: Send {
    fn encode(&self, text: &str) -> Result<TokenSequence, EncoderError>;
}

#[derive(thiserror::Error)]
pub enum EncoderError {
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    #[error("Encoder runner is not available: {0}")]
    RunnerUnavailable(String),
}

impl std::fmt::Debug for EncoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
