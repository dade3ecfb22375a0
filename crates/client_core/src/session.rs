//! Conversation session controller: owns [`SessionState`] and publishes a
//! [`SessionEvent`] for every state transition.

use std::{sync::Arc, time::Duration};

use shared::domain::{ConversationEntry, UploadStatus};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    backend::AnalysisBackend,
    composer::{self, ComposerInput, KeyAction},
    config::ClientSettings,
    query::SubmitOutcome,
    status::{ExpiryTicket, StatusChannel},
    transcript::{Transcript, TranscriptView},
};

const EVENT_CAPACITY: usize = 256;

/// Policy values that shape user-visible behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub status_expiry: Duration,
    pub disable_input_while_pending: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            status_expiry: Duration::from_millis(crate::config::DEFAULT_STATUS_EXPIRY_MS),
            disable_input_while_pending: true,
        }
    }
}

impl From<&ClientSettings> for SessionPolicy {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            status_expiry: settings.status_expiry,
            disable_input_while_pending: settings.disable_input_while_pending,
        }
    }
}

/// One notification per state transition, sent after the transition is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// User entry appended, draft cleared, query now in flight.
    QueryDispatched { entry: ConversationEntry },
    /// Agent entry (answer or error) appended, query no longer in flight.
    QuerySettled { entry: ConversationEntry },
    /// Success status shown and system note appended.
    DocumentIngested {
        entry: ConversationEntry,
        status: UploadStatus,
    },
    StatusChanged(Option<UploadStatus>),
    DraftChanged(String),
}

impl SessionEvent {
    /// The transcript entry this transition appended, if any.
    pub fn appended_entry(&self) -> Option<&ConversationEntry> {
        match self {
            Self::QueryDispatched { entry }
            | Self::QuerySettled { entry }
            | Self::DocumentIngested { entry, .. } => Some(entry),
            Self::StatusChanged(_) | Self::DraftChanged(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) transcript: Transcript,
    pub(crate) pending_query: bool,
    pub(crate) draft_input: String,
    pub(crate) upload_status: StatusChannel,
    expiry_timer: Option<JoinHandle<()>>,
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub transcript: TranscriptView,
    pub pending_query: bool,
    pub draft_input: String,
    pub upload_status: Option<UploadStatus>,
    pub input_enabled: bool,
}

pub(crate) struct SessionInner {
    pub(crate) backend: Arc<dyn AnalysisBackend>,
    pub(crate) policy: SessionPolicy,
    pub(crate) session_id: Uuid,
    pub(crate) state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Clone)]
pub struct SessionController {
    pub(crate) inner: Arc<SessionInner>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: SessionPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                backend,
                policy,
                session_id: Uuid::new_v4(),
                state: Mutex::new(SessionState::default()),
                events,
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn policy(&self) -> SessionPolicy {
        self.inner.policy
    }

    pub fn backend(&self) -> Arc<dyn AnalysisBackend> {
        Arc::clone(&self.inner.backend)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            transcript: state.transcript.entries(),
            pending_query: state.pending_query,
            draft_input: state.draft_input.clone(),
            upload_status: state.upload_status.current().cloned(),
            input_enabled: self.inner.input_enabled(&state),
        }
    }

    pub async fn transcript(&self) -> TranscriptView {
        self.inner.state.lock().await.transcript.entries()
    }

    pub async fn is_query_pending(&self) -> bool {
        self.inner.state.lock().await.pending_query
    }

    pub async fn upload_status(&self) -> Option<UploadStatus> {
        self.inner.state.lock().await.upload_status.current().cloned()
    }

    pub async fn draft(&self) -> String {
        self.inner.state.lock().await.draft_input.clone()
    }

    pub async fn input_enabled(&self) -> bool {
        let state = self.inner.state.lock().await;
        self.inner.input_enabled(&state)
    }

    /// Replaces the draft. Ignored (returns false) while input is disabled.
    pub async fn set_draft(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        let mut state = self.inner.state.lock().await;
        if !self.inner.input_enabled(&state) {
            debug!("draft edit ignored while query is in flight");
            return false;
        }
        if state.draft_input != text {
            state.draft_input = text;
            self.inner
                .notify(SessionEvent::DraftChanged(state.draft_input.clone()));
        }
        true
    }

    /// Feeds one composer input. A plain Enter submits the current draft.
    pub async fn press_key(&self, input: ComposerInput) -> Option<SubmitOutcome> {
        if composer::classify(&input) == KeyAction::Commit {
            return Some(self.submit_draft().await);
        }
        let mut state = self.inner.state.lock().await;
        if !self.inner.input_enabled(&state) {
            debug!("draft edit ignored while query is in flight");
            return None;
        }
        composer::apply(&mut state.draft_input, &input);
        self.inner
            .notify(SessionEvent::DraftChanged(state.draft_input.clone()));
        None
    }

    /// Sets the upload status, arming expiry for terminal severities.
    pub async fn set_status(&self, status: UploadStatus) {
        let mut state = self.inner.state.lock().await;
        self.inner.replace_status(&mut state, status.clone());
        self.inner.notify(SessionEvent::StatusChanged(Some(status)));
    }

    /// Clears the upload status. No-op (and no event) when nothing is showing.
    pub async fn clear_status(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(timer) = state.expiry_timer.take() {
            timer.abort();
        }
        if state.upload_status.clear() {
            self.inner.notify(SessionEvent::StatusChanged(None));
        }
    }

    /// User-initiated close of the status banner.
    pub async fn dismiss_status(&self) {
        self.clear_status().await;
    }
}

impl SessionInner {
    pub(crate) fn notify(&self, event: SessionEvent) {
        // No subscribers is fine; the state already changed.
        let _ = self.events.send(event);
    }

    pub(crate) fn input_enabled(&self, state: &SessionState) -> bool {
        !(self.policy.disable_input_while_pending && state.pending_query)
    }

    /// Swaps in `status` under the caller's lock. The caller emits the event.
    pub(crate) fn replace_status(self: &Arc<Self>, state: &mut SessionState, status: UploadStatus) {
        if let Some(timer) = state.expiry_timer.take() {
            timer.abort();
        }
        if let Some(ticket) = state.upload_status.set(status) {
            state.expiry_timer = Some(self.arm_expiry(ticket));
        }
    }

    fn arm_expiry(self: &Arc<Self>, ticket: ExpiryTicket) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        let delay = self.policy.status_expiry;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = inner.state.lock().await;
            if state.upload_status.expire(ticket) {
                state.expiry_timer = None;
                debug!("upload status expired");
                inner.notify(SessionEvent::StatusChanged(None));
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
