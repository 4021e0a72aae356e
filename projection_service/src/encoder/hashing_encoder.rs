use ndarray::Array2;
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;

use super::{EncoderError, TokenEncoder};
use crate::{
    configuration::EncoderSettings,
    domain::entities::token_sequence::{TokenSequence, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN},
};

/// Words or single punctuation marks
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+|[^\w\s]").unwrap());

/// Deterministic encoder without model weights.
///
/// Each token is mapped to a pseudo-random vector seeded by its text, plus a sinusoidal
/// position signal. Same tokens get close vectors, which is enough to exercise the
/// cross-attention pipeline end to end. It carries no semantics: a transformer encoder
/// can be plugged in instead through [`TokenEncoder`].
#[derive(Debug, Clone)]
pub struct HashingTokenEncoder {
    hidden_size: usize,
    max_length: usize,
    pad_to_multiple_of: Option<usize>,
}

impl HashingTokenEncoder {
    pub fn new(settings: &EncoderSettings) -> Self {
        Self {
            hidden_size: settings.hidden_size.max(1),
            // Room for at least the 2 structural tokens
            max_length: settings.max_length.max(2),
            pad_to_multiple_of: settings.pad_to_multiple_of.filter(|m| *m > 1),
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let content = TOKEN_RE
            .find_iter(&text)
            .map(|token| token.as_str().to_string())
            .take(self.max_length - 2);

        std::iter::once(CLS_TOKEN.to_string())
            .chain(content)
            .chain(std::iter::once(SEP_TOKEN.to_string()))
            .collect()
    }

    fn token_vector(&self, token: &str, position: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(fnv1a(token));

        (0..self.hidden_size)
            .map(|i| {
                let frequency = 1.0 / 10_000f64.powf((i - i % 2) as f64 / self.hidden_size as f64);
                let angle = position as f64 * frequency;
                let position_signal = if i % 2 == 0 { angle.sin() } else { angle.cos() };

                rng.gen_range(-1.0..1.0) + 0.1 * position_signal
            })
            .collect()
    }
}

impl TokenEncoder for HashingTokenEncoder {
    #[tracing::instrument(name = "Hashing encoder", skip(self, text), fields(text_len = text.len()))]
    fn encode(&self, text: &str) -> Result<TokenSequence, EncoderError> {
        let mut tokens = self.tokenize(text);
        let nb_content_tokens = tokens.len();

        if let Some(multiple) = self.pad_to_multiple_of {
            let padded_len = ((tokens.len() + multiple - 1) / multiple) * multiple;
            tokens.resize(padded_len, PAD_TOKEN.to_string());
        }

        let mut hidden_states = Array2::<f64>::zeros((tokens.len(), self.hidden_size));
        for (position, token) in tokens.iter().take(nb_content_tokens).enumerate() {
            let vector = self.token_vector(token, position);
            hidden_states
                .row_mut(position)
                .iter_mut()
                .zip(vector)
                .for_each(|(value, v)| *value = v);
        }

        let padding_mask = (0..tokens.len()).map(|i| i >= nb_content_tokens).collect();

        TokenSequence::try_from_single(tokens, hidden_states, padding_mask)
            .map_err(|e| EncoderError::EncodingFailed(e.to_string()))
    }
}

/// FNV-1a hash, stable across runs and platforms
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}
