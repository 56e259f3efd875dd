//! Narration
//!
//! Spoken announcements for the drive (one utterance at a time, newest wins)
//! and the voice-checked pre-drive checklist.

mod checklist;
mod dispatcher;
mod speech;

pub use checklist::{Checklist, ChecklistItem, DEFAULT_CHECKLIST_ITEMS};
pub use dispatcher::{NarrationConfig, NarrationDispatcher};
pub use speech::{SilentSpeech, SpeechError, SpeechOutput};
