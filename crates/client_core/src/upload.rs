//! Document ingestion workflow. Independent of the query workflow: uploads
//! may overlap an in-flight query.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use shared::domain::{ConversationEntry, UploadStatus};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    backend::UploadFile,
    error::BackendError,
    session::{SessionController, SessionEvent, SessionInner},
};

pub fn uploading_message(file_name: &str) -> String {
    format!("Uploading {file_name}...")
}

/// Success notice. A service that omits the chunk count still gets a
/// success notice, just without the number.
pub fn ingested_message(chunks_created: Option<u64>) -> String {
    match chunks_created {
        Some(count) => format!("{count} chunks stored"),
        None => "Document stored".to_string(),
    }
}

pub fn ready_note(file_name: &str) -> String {
    format!("Document \"{file_name}\" uploaded and processed. Ready for queries!")
}

impl SessionController {
    /// Sends `file` for ingestion. The returned handle resolves once the
    /// outcome is reflected in the status (and, on success, the transcript).
    pub async fn upload(&self, file: UploadFile) -> JoinHandle<()> {
        let status = UploadStatus::info(uploading_message(&file.name));
        {
            let mut state = self.inner.state.lock().await;
            self.inner.replace_status(&mut state, status.clone());
            self.inner.notify(SessionEvent::StatusChanged(Some(status)));
        }
        info!(file = %file.name, size_bytes = file.bytes.len(), "upload dispatched");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.settle_upload(file).await;
        })
    }
}

impl SessionInner {
    async fn settle_upload(self: &Arc<Self>, file: UploadFile) {
        let file_name = file.name.clone();
        let result = AssertUnwindSafe(self.backend.upload(file))
            .catch_unwind()
            .await
            .unwrap_or(Err(BackendError::Interrupted));

        let mut state = self.state.lock().await;
        match result {
            Ok(response) => {
                info!(
                    file = %file_name,
                    chunks_created = ?response.chunks_created,
                    "upload ingested"
                );
                let status = UploadStatus::success(ingested_message(response.chunks_created));
                let entry = ConversationEntry::system_note(ready_note(&file_name));
                self.replace_status(&mut state, status.clone());
                state.transcript.append(entry.clone());
                self.notify(SessionEvent::DocumentIngested { entry, status });
            }
            Err(err) => {
                // Ingestion failures stay out of the transcript.
                warn!(file = %file_name, error = %err, "upload failed");
                let status = UploadStatus::error(err.user_message());
                self.replace_status(&mut state, status.clone());
                self.notify(SessionEvent::StatusChanged(Some(status)));
            }
        }
    }
}
