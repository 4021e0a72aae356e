use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::projection_error::ProjectionError;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";

/// Tokens inserted by the tokenizer to mark the start and the boundaries of a sequence
pub const STRUCTURAL_TOKENS: [&str; 2] = [CLS_TOKEN, SEP_TOKEN];

pub fn is_structural_token(token: &str) -> bool {
    STRUCTURAL_TOKENS.contains(&token)
}

/// Output of an encoder for one text.
///
/// `hidden_states` has the shape (batch, tokens, hidden size). Tokens and padding mask
/// describe the token axis, they are shared by every batch item.
/// Every hidden value is finite.
#[derive(Debug, Clone)]
pub struct TokenSequence {
    tokens: Vec<String>,
    hidden_states: Array3<f64>,
    padding_mask: Vec<bool>,
}

impl TokenSequence {
    pub fn try_new(
        tokens: Vec<String>,
        hidden_states: Array3<f64>,
        padding_mask: Vec<bool>,
    ) -> Result<Self, ProjectionError> {
        let (batch_size, nb_tokens, hidden_size) = hidden_states.dim();

        if batch_size == 0 || nb_tokens == 0 || hidden_size == 0 {
            return Err(ProjectionError::EmptyInput(format!(
                "hidden states of shape ({}, {}, {}) have an empty axis",
                batch_size, nb_tokens, hidden_size
            )));
        }

        if tokens.len() != nb_tokens || padding_mask.len() != nb_tokens {
            return Err(ProjectionError::ShapeMismatch(format!(
                "{} tokens and {} padding flags for {} hidden vectors",
                tokens.len(),
                padding_mask.len(),
                nb_tokens
            )));
        }

        if let Some(value) = hidden_states.iter().find(|v| !v.is_finite()) {
            return Err(ProjectionError::EncoderFailure(format!(
                "hidden states contain a non-finite value: {}",
                value
            )));
        }

        Ok(Self {
            tokens,
            hidden_states,
            padding_mask,
        })
    }

    /// Builds a sequence from an encoder run without batch dimension
    pub fn try_from_single(
        tokens: Vec<String>,
        hidden_states: Array2<f64>,
        padding_mask: Vec<bool>,
    ) -> Result<Self, ProjectionError> {
        Self::try_new(tokens, hidden_states.insert_axis(Axis(0)), padding_mask)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn padding_mask(&self) -> &[bool] {
        &self.padding_mask
    }

    pub fn batch_size(&self) -> usize {
        self.hidden_states.len_of(Axis(0))
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_states.len_of(Axis(2))
    }

    /// Hidden vectors (tokens, hidden size) of one batch item
    pub fn hidden_states_of(&self, batch_index: usize) -> ArrayView2<'_, f64> {
        self.hidden_states.index_axis(Axis(0), batch_index)
    }

    /// Positions of the tokens which are not padding, in order
    pub fn content_positions(&self) -> Vec<usize> {
        self.padding_mask
            .iter()
            .enumerate()
            .filter(|(_, is_padding)| !**is_padding)
            .map(|(position, _)| position)
            .collect()
    }

    /// Same sequence without its padding positions
    pub fn without_padding(&self) -> Result<Self, ProjectionError> {
        let positions = self.content_positions();
        let tokens = positions.iter().map(|&p| self.tokens[p].clone()).collect();
        let hidden_states = self.hidden_states.select(Axis(1), &positions);

        Self::try_new(tokens, hidden_states, vec![false; positions.len()])
    }
}

/// Cross-attention between the content tokens of two texts.
///
/// Row `i` is the distribution of attention of `tokens1[i]` over `tokens2`: it sums to 1.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CrossAttentionResult {
    pub tokens1: Vec<String>,
    pub tokens2: Vec<String>,
    pub cross_attention: Vec<Vec<f64>>,
    pub is_special1: Vec<bool>,
    pub is_special2: Vec<bool>,
}
