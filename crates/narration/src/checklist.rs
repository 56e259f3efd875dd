//! Voice-checked pre-drive checklist

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::SpeechError;

/// Items checked off before every drive
pub const DEFAULT_CHECKLIST_ITEMS: [&str; 3] = ["Seatbelt", "Parallel Parking", "Left"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    pub is_checked: bool,
}

impl ChecklistItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_checked: false,
        }
    }
}

/// Shared checklist; written by the recognizer task, read by the session
#[derive(Debug, Clone)]
pub struct Checklist {
    items: Arc<RwLock<Vec<ChecklistItem>>>,
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKLIST_ITEMS)
    }
}

impl Checklist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = names.into_iter().map(ChecklistItem::new).collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Check off every item named in the transcript (case-insensitive).
    /// Returns the number of items newly checked.
    pub fn apply_transcript(&self, transcript: &str) -> usize {
        let heard = transcript.to_lowercase();
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        let mut checked = 0;
        for item in items.iter_mut().filter(|i| !i.is_checked) {
            if heard.contains(&item.name.to_lowercase()) {
                info!("Checklist: {} checked", item.name);
                item.is_checked = true;
                checked += 1;
            }
        }
        checked
    }

    /// Consistent copy of all items
    pub fn snapshot(&self) -> Vec<ChecklistItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_complete(&self) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .all(|i| i.is_checked)
    }

    pub fn reset(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        for item in items.iter_mut() {
            item.is_checked = false;
        }
    }

    /// Consume recognizer transcripts in the background until the sender
    /// is dropped. The task yields the total number of items checked.
    pub fn listen(
        &self,
        mut transcripts: mpsc::Receiver<Result<String, SpeechError>>,
    ) -> JoinHandle<usize> {
        let checklist = self.clone();
        tokio::spawn(async move {
            let mut total = 0;
            while let Some(result) = transcripts.recv().await {
                match result {
                    Ok(text) => {
                        debug!("Transcript: {}", text);
                        total += checklist.apply_transcript(&text);
                    }
                    Err(e) => warn!("Checklist listener: {}", e),
                }
            }
            debug!("Checklist listener stopped");
            total
        })
    }
}
