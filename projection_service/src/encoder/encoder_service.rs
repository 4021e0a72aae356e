use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use super::{EncoderError, TokenEncoder};
use crate::domain::entities::token_sequence::TokenSequence;

/// Handle to an encoder running on its own thread.
///
/// The encoder is moved into a runner thread and only reached through a bounded channel:
/// encoding requests are handled one at a time, in order, whatever the number of
/// actix-web workers sharing this service.
pub struct EncoderService {
    sender_to_runner: mpsc::Sender<RunnerMessage>,
    _thread_handle: JoinHandle<()>,
}

impl EncoderService {
    /// Spawns the runner owning `encoder`
    pub fn new<E>(encoder: E, channel_capacity: usize) -> Self
    where
        E: TokenEncoder + 'static,
    {
        let (sender, receiver) = mpsc::channel(channel_capacity.max(1));
        let handle = thread::spawn(move || Self::runner(encoder, receiver));

        Self {
            sender_to_runner: sender,
            _thread_handle: handle,
        }
    }

    /// Encoding is CPU-bound: it runs on a plain thread, outside of the async runtime.
    ///
    /// Stops when every sender has been dropped.
    fn runner<E: TokenEncoder>(encoder: E, mut receiver: mpsc::Receiver<RunnerMessage>) {
        info!("Encoder runner started ✅");

        while let Some((texts, sender)) = receiver.blocking_recv() {
            let sequences = texts
                .iter()
                .map(|text| encoder.encode(text))
                .collect::<Result<Vec<_>, _>>();

            if sender.send(sequences).is_err() {
                error!("Encoding requester dropped before receiving its sequences");
            }
        }

        info!("Encoder runner stopped");
    }

    /// Encodes texts in a single request to the runner, results keep the order of `texts`
    #[tracing::instrument(name = "Encode texts", skip(self, texts), fields(nb_texts = texts.len()))]
    pub async fn encode(&self, texts: Vec<String>) -> Result<Vec<TokenSequence>, EncoderError> {
        let (sender, receiver) = oneshot::channel();

        self.sender_to_runner
            .send((texts, sender))
            .await
            .map_err(|e| EncoderError::RunnerUnavailable(e.to_string()))?;

        receiver
            .await
            .map_err(|e| EncoderError::RunnerUnavailable(e.to_string()))?
    }
}

/// Message type for internal channel, passing around input texts and encoded sequences
type RunnerMessage = (
    Vec<String>,
    oneshot::Sender<Result<Vec<TokenSequence>, EncoderError>>,
);
