//! Speech output seam

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

/// Speech error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeechError {
    #[error("Speech capability not available")]
    Unavailable,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Speech recognition failed: {0}")]
    Recognition(String),
}

/// Platform text-to-speech
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, resolving when the utterance has finished
    async fn speak(&self, text: &str, locale: &str) -> Result<(), SpeechError>;

    /// Stop the current utterance immediately
    fn stop(&self);

    fn is_speaking(&self) -> bool;
}

/// Speech output for devices without a synthesizer; logs instead
#[derive(Debug, Default)]
pub struct SilentSpeech {
    utterances: AtomicU64,
}

impl SilentSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of utterances that would have been spoken
    pub fn utterances(&self) -> u64 {
        self.utterances.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SpeechOutput for SilentSpeech {
    async fn speak(&self, text: &str, locale: &str) -> Result<(), SpeechError> {
        self.utterances.fetch_add(1, Ordering::Relaxed);
        info!("[{}] {}", locale, text);
        Ok(())
    }

    fn stop(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
