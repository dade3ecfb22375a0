//! Single-slot upload notification with expiry bookkeeping.
//!
//! The channel itself is clock-free: [`StatusChannel::set`] hands back a
//! ticket for terminal statuses and the owner arms a timer that later calls
//! [`StatusChannel::expire`] with it. A ticket only clears the exact status
//! instance it was issued for.

use shared::domain::UploadStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTicket(u64);

#[derive(Debug, Default)]
pub struct StatusChannel {
    current: Option<UploadStatus>,
    generation: u64,
}

impl StatusChannel {
    /// Replaces the current status. Returns a ticket when the new status
    /// should expire on its own.
    pub fn set(&mut self, status: UploadStatus) -> Option<ExpiryTicket> {
        self.generation += 1;
        let expires = status.severity.is_terminal();
        self.current = Some(status);
        expires.then_some(ExpiryTicket(self.generation))
    }

    /// Returns whether anything was showing.
    pub fn clear(&mut self) -> bool {
        if self.current.take().is_some() {
            self.generation += 1;
            true
        } else {
            false
        }
    }

    /// Clears the status only if `ticket` still names the one showing.
    pub fn expire(&mut self, ticket: ExpiryTicket) -> bool {
        if ticket.0 == self.generation && self.current.is_some() {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&UploadStatus> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_status_does_not_expire() {
        let mut channel = StatusChannel::default();
        assert!(channel
            .set(UploadStatus::info("Uploading report.pdf..."))
            .is_none());
    }

    #[test]
    fn terminal_status_expires_with_its_ticket() {
        let mut channel = StatusChannel::default();
        let ticket = channel
            .set(UploadStatus::success("14 chunks stored"))
            .expect("ticket");
        assert!(channel.expire(ticket));
        assert!(channel.current().is_none());
    }

    #[test]
    fn superseded_ticket_leaves_newer_status_alone() {
        let mut channel = StatusChannel::default();
        let stale = channel.set(UploadStatus::success("3 chunks stored")).expect("ticket");
        channel.set(UploadStatus::info("Uploading next.pdf..."));

        assert!(!channel.expire(stale));
        assert_eq!(
            channel.current().map(|s| s.message.as_str()),
            Some("Uploading next.pdf...")
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let mut channel = StatusChannel::default();
        assert!(!channel.clear());
        channel.set(UploadStatus::error("unsupported format"));
        assert!(channel.clear());
        assert!(!channel.clear());
    }

    #[test]
    fn ticket_from_before_clear_cannot_clear_later_status() {
        let mut channel = StatusChannel::default();
        let stale = channel.set(UploadStatus::error("boom")).expect("ticket");
        channel.clear();
        channel.set(UploadStatus::info("Uploading again..."));
        assert!(!channel.expire(stale));
        assert!(channel.current().is_some());
    }
}
