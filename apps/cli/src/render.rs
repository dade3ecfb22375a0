//! Terminal rendering of session events.

use client_core::{
    presentation::{entry_view, status_line, EntryView},
    SessionEvent, SubmitRejection,
};
use shared::{domain::EntryKind, protocol::HealthResponse};
use std::io::Write;

use tokio::sync::{
    broadcast::{self, error::RecvError, error::TryRecvError},
    oneshot,
};
use tracing::warn;

pub fn format_entry(view: &EntryView) -> String {
    match view.kind {
        EntryKind::User => format!("[{}] you> {}", view.time, view.text),
        EntryKind::SystemNote => format!("[{}] -- {} --", view.time, view.text),
        EntryKind::Agent => {
            let mut line = format!("[{}] analyst> {}", view.time, view.text);
            let annotations: Vec<String> = view
                .tool
                .iter()
                .map(|tool| match tool.icon {
                    Some(icon) => format!("{} ({})", tool.label, icon.key()),
                    None => tool.label.clone(),
                })
                .chain(view.elapsed.iter().cloned())
                .collect();
            if !annotations.is_empty() {
                line.push_str(&format!("\n    {}", annotations.join(" · ")));
            }
            line
        }
    }
}

pub fn format_event(event: &SessionEvent) -> Option<String> {
    match event {
        // The user already sees what they typed.
        SessionEvent::QueryDispatched { .. } => Some("… thinking".to_string()),
        SessionEvent::QuerySettled { entry } => Some(format_entry(&entry_view(entry))),
        SessionEvent::DocumentIngested { entry, status } => Some(format!(
            "{}\n{}",
            status_line(status),
            format_entry(&entry_view(entry))
        )),
        SessionEvent::StatusChanged(Some(status)) => Some(status_line(status)),
        SessionEvent::StatusChanged(None) | SessionEvent::DraftChanged(_) => None,
    }
}

pub fn rejection_hint(reason: SubmitRejection) -> Option<&'static str> {
    match reason {
        SubmitRejection::EmptyText => None,
        SubmitRejection::QueryInFlight => Some("still waiting for the previous answer"),
    }
}

pub fn format_health(health: &HealthResponse) -> String {
    let mut out = format!("service status: {}", health.status);
    if let Some(error) = &health.error {
        out.push_str(&format!("\n  error: {error}"));
    }
    for (name, value) in [
        ("configuration", &health.configuration),
        ("vector store", &health.vector_store),
    ] {
        if let Some(value) = value {
            out.push_str(&format!("\n  {name}: {value}"));
        }
    }
    out
}

/// Prints session events to `out` until the session closes or `shutdown`
/// fires. On shutdown, events already sent are still printed before
/// returning, so the last settlements are never lost.
pub async fn run<W: Write>(
    mut events: broadcast::Receiver<SessionEvent>,
    mut shutdown: oneshot::Receiver<()>,
    mut out: W,
) -> W {
    loop {
        tokio::select! {
            biased;
            received = events.recv() => match received {
                Ok(event) => print_event(&mut out, &event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind; some updates were not shown");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                loop {
                    match events.try_recv() {
                        Ok(event) => print_event(&mut out, &event),
                        Err(TryRecvError::Lagged(skipped)) => {
                            warn!(skipped, "renderer fell behind; some updates were not shown");
                        }
                        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                    }
                }
                break;
            }
        }
    }
    if let Err(err) = out.flush() {
        warn!(error = %err, "failed to flush output");
    }
    out
}

fn print_event<W: Write>(out: &mut W, event: &SessionEvent) {
    if let Some(text) = format_event(event) {
        if let Err(err) = writeln!(out, "{text}") {
            warn!(error = %err, "failed to write session update");
        }
    }
}
