use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

use crate::domain::{
    entities::token_sequence::{is_structural_token, CrossAttentionResult, TokenSequence},
    projection_error::ProjectionError,
};

/// Scores how much each content token of `main` attends to each content token of `cited`.
///
/// Scaled dot-product attention, `softmax(H1 · H2ᵀ / √d)`, normalized row by row:
/// each token of `main` distributes an attention of 1 over the tokens of `cited`.
/// Padding tokens of `cited` get no attention and padding tokens of both sides
/// are dropped from the result, so padding a sequence never changes the scores
/// of its real tokens.
/// When the encoder ran on a batch, the attention matrices are averaged over the batch.
#[tracing::instrument(
    name = "Scoring cross-attention",
    skip(main, cited),
    fields(main_tokens = main.tokens().len(), cited_tokens = cited.tokens().len())
)]
pub fn score_cross_attention(
    main: &TokenSequence,
    cited: &TokenSequence,
) -> Result<CrossAttentionResult, ProjectionError> {
    if main.hidden_size() != cited.hidden_size() {
        return Err(ProjectionError::ShapeMismatch(format!(
            "hidden vectors of size {} and {}",
            main.hidden_size(),
            cited.hidden_size()
        )));
    }
    if main.batch_size() != cited.batch_size() {
        return Err(ProjectionError::ShapeMismatch(format!(
            "batches of size {} and {}",
            main.batch_size(),
            cited.batch_size()
        )));
    }

    let rows = main.content_positions();
    let columns = cited.content_positions();
    if rows.is_empty() || columns.is_empty() {
        return Err(ProjectionError::EmptyInput(
            "a sequence only contains padding tokens".to_string(),
        ));
    }

    let scale = 1.0 / (main.hidden_size() as f64).sqrt();
    let batch_size = main.batch_size();

    let mut attention = Array2::<f64>::zeros((main.tokens().len(), cited.tokens().len()));
    for batch_index in 0..batch_size {
        attention += &attention_probabilities(
            main.hidden_states_of(batch_index),
            cited.hidden_states_of(batch_index),
            cited.padding_mask(),
            scale,
        )?;
    }
    if batch_size > 1 {
        attention /= batch_size as f64;
    }

    let attention = attention.select(Axis(0), &rows).select(Axis(1), &columns);

    let tokens1: Vec<String> = rows.iter().map(|&i| main.tokens()[i].clone()).collect();
    let tokens2: Vec<String> = columns.iter().map(|&j| cited.tokens()[j].clone()).collect();

    debug!(
        rows = tokens1.len(),
        columns = tokens2.len(),
        "Cross-attention matrix computed"
    );

    Ok(CrossAttentionResult {
        is_special1: tokens1.iter().map(|t| is_structural_token(t)).collect(),
        is_special2: tokens2.iter().map(|t| is_structural_token(t)).collect(),
        cross_attention: attention.outer_iter().map(|row| row.to_vec()).collect(),
        tokens1,
        tokens2,
    })
}

/// Row-wise softmax of the scaled scores, masked columns get a probability of 0
fn attention_probabilities(
    queries: ArrayView2<'_, f64>,
    keys: ArrayView2<'_, f64>,
    key_padding_mask: &[bool],
    scale: f64,
) -> Result<Array2<f64>, ProjectionError> {
    let mut scores = queries.dot(&keys.t()) * scale;
    if scores.iter().any(|score| !score.is_finite()) {
        return Err(ProjectionError::EncoderFailure(
            "attention scores exceed the float range".to_string(),
        ));
    }

    for mut row in scores.outer_iter_mut() {
        let max = row
            .iter()
            .zip(key_padding_mask)
            .filter(|(_, is_padding)| !**is_padding)
            .map(|(score, _)| *score)
            .fold(f64::NEG_INFINITY, f64::max);

        // Shifting by the max keeps `exp` from overflowing
        row.iter_mut()
            .zip(key_padding_mask)
            .for_each(|(score, is_padding)| {
                *score = if *is_padding {
                    0.0
                } else {
                    (*score - max).exp()
                }
            });

        let sum = row.sum();
        row.mapv_inplace(|p| p / sum);
    }

    Ok(scores)
}
