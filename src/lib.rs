pub mod cli;
pub mod config;
pub mod contacts;
pub mod detail;
pub mod error;
pub mod logging;
pub mod store;

pub use config::Config;
pub use contacts::{Contact, ContactDirectory, ContactSource, PermissionState};
pub use detail::{Aggregator, ContactWithNote, NoteWithContact};
pub use error::{Error, Result};
pub use store::{ContactNote, NoteStore, SaveOutcome};
