//! Client side of the document-analysis service: a conversation session
//! controller plus the HTTP boundary it talks through.

pub mod backend;
pub mod composer;
pub mod config;
pub mod error;
pub mod presentation;
mod query;
mod session;
pub mod status;
pub mod transcript;
mod upload;

pub use backend::{AnalysisBackend, HttpAnalysisBackend, UploadFile};
pub use composer::ComposerInput;
pub use config::{load_settings, ClientSettings};
pub use error::{BackendError, SettingsError};
pub use query::{SubmitOutcome, SubmitRejection};
pub use session::{SessionController, SessionEvent, SessionPolicy, SessionSnapshot};
pub use transcript::TranscriptView;
pub use upload::{ingested_message, ready_note, uploading_message};
