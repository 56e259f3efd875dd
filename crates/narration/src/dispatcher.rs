//! Narration Dispatcher Implementation

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::SpeechOutput;

/// Narration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// BCP-47 locale passed to the synthesizer
    pub locale: String,
    /// When false, announcements are dropped
    pub enabled: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            enabled: true,
        }
    }
}

/// Dispatches announcements to the speech output.
///
/// At most one utterance is in flight. A new announcement interrupts the
/// current one; nothing is queued.
pub struct NarrationDispatcher {
    speech: Arc<dyn SpeechOutput>,
    config: NarrationConfig,
    in_flight: Option<JoinHandle<()>>,
    last_announced: Option<String>,
}

impl NarrationDispatcher {
    pub fn new(speech: Arc<dyn SpeechOutput>, config: NarrationConfig) -> Self {
        Self {
            speech,
            config,
            in_flight: None,
            last_announced: None,
        }
    }

    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }

    /// Start speaking `text`, interrupting whatever is being spoken.
    ///
    /// Returns immediately; the utterance runs on the current tokio runtime.
    /// Returns false when nothing was dispatched.
    pub fn announce(&mut self, text: &str) -> bool {
        if !self.config.enabled || text.trim().is_empty() {
            return false;
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot narrate \"{}\": {}", text, e);
                return false;
            }
        };

        self.cancel();

        let speech = self.speech.clone();
        let utterance = text.to_string();
        let locale = self.config.locale.clone();
        debug!("Narrating: {}", utterance);

        self.in_flight = Some(runtime.spawn(async move {
            if let Err(e) = speech.speak(&utterance, &locale).await {
                warn!("Narration of \"{}\" failed: {}", utterance, e);
            }
        }));
        self.last_announced = Some(text.to_string());
        true
    }

    /// Interrupt the in-flight utterance, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                handle.abort();
                self.speech.stop();
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn last_announced(&self) -> Option<&str> {
        self.last_announced.as_deref()
    }
}

impl Drop for NarrationDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
