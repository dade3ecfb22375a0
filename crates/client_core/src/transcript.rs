//! Append-only conversation log.

use std::{ops::Deref, sync::Arc};

use shared::domain::ConversationEntry;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Arc<Vec<ConversationEntry>>,
}

impl Transcript {
    pub fn append(&mut self, entry: ConversationEntry) {
        // Outstanding views keep the old vector; they never observe this push.
        Arc::make_mut(&mut self.entries).push(entry);
    }

    pub fn entries(&self) -> TranscriptView {
        TranscriptView(Arc::clone(&self.entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Point-in-time read view of a [`Transcript`].
#[derive(Debug, Clone, Default)]
pub struct TranscriptView(Arc<Vec<ConversationEntry>>);

impl Deref for TranscriptView {
    type Target = [ConversationEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
