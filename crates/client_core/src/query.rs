//! Query workflow: at most one query in flight, every outcome lands in the
//! transcript.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use shared::{domain::ConversationEntry, protocol::QueryRequest};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    error::BackendError,
    session::{SessionController, SessionEvent, SessionInner, SessionState},
};

pub const EMPTY_ANSWER_TEXT: &str = "The analysis service returned an empty answer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyText,
    QueryInFlight,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Accepted; the handle resolves once the answer or error entry is appended.
    Dispatched(JoinHandle<()>),
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }

    pub fn rejection(&self) -> Option<SubmitRejection> {
        match self {
            Self::Dispatched(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }

    /// Waits for the dispatched query to settle. Rejections return immediately.
    pub async fn settled(self) {
        if let Self::Dispatched(handle) = self {
            if let Err(err) = handle.await {
                warn!(error = %err, "query task ended abnormally");
            }
        }
    }
}

impl SessionController {
    /// Submits `text` as a query. Empty text, or any submit while a query is
    /// in flight, is dropped without touching the transcript.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let mut state = self.inner.state.lock().await;
        self.dispatch(&mut state, text)
    }

    /// Submits whatever is in the draft, atomically with reading it.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let mut state = self.inner.state.lock().await;
        let draft = state.draft_input.clone();
        self.dispatch(&mut state, &draft)
    }

    fn dispatch(&self, state: &mut SessionState, text: &str) -> SubmitOutcome {
        let query = text.trim();
        if query.is_empty() {
            debug!("ignoring empty query submission");
            return SubmitOutcome::Rejected(SubmitRejection::EmptyText);
        }
        if state.pending_query {
            debug!("ignoring query submission while another is in flight");
            return SubmitOutcome::Rejected(SubmitRejection::QueryInFlight);
        }

        let entry = ConversationEntry::user(query);
        state.transcript.append(entry.clone());
        state.draft_input.clear();
        state.pending_query = true;
        self.inner.notify(SessionEvent::QueryDispatched { entry });

        info!(
            session_id = %self.inner.session_id,
            query_len = query.len(),
            "query dispatched"
        );
        let request = QueryRequest {
            query: query.to_string(),
            session_id: Some(self.inner.session_id.to_string()),
        };
        let inner = Arc::clone(&self.inner);
        SubmitOutcome::Dispatched(tokio::spawn(async move {
            inner.settle_query(request).await;
        }))
    }
}

impl SessionInner {
    async fn settle_query(&self, request: QueryRequest) {
        let result = AssertUnwindSafe(self.backend.query(request))
            .catch_unwind()
            .await
            .unwrap_or(Err(BackendError::Interrupted));

        let entry = match result {
            Ok(response) => {
                let tool = response
                    .tool_used
                    .filter(|tool| !tool.as_str().trim().is_empty());
                info!(
                    tool = tool.as_ref().map(|t| t.as_str()),
                    elapsed_ms = response.execution_time_ms,
                    "query answered"
                );
                let text = if response.answer.trim().is_empty() {
                    EMPTY_ANSWER_TEXT.to_string()
                } else {
                    response.answer
                };
                ConversationEntry::agent(text, tool, response.execution_time_ms)
            }
            Err(err) => {
                warn!(error = %err, "query failed");
                ConversationEntry::agent(format!("Error: {}", err.user_message()), None, None)
            }
        };

        let mut state = self.state.lock().await;
        state.transcript.append(entry.clone());
        state.pending_query = false;
        self.notify(SessionEvent::QuerySettled { entry });
    }
}
