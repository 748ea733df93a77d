//! Session event broadcaster for consumers that render matchmaking state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::monitor::SessionView;

/// What changed in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    /// No job and no results: the consumer should offer to start an analysis.
    PromptShown,
    JobUpdated,
    PollingStarted,
    PollingStopped,
    JobFailed,
    ResultsLoading,
    ResultsLoaded,
    ResultsFailed,
    /// An operation failed; `message` carries the user-facing text.
    Error,
}

impl std::fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEventKind::PromptShown => write!(f, "Start analysis"),
            SessionEventKind::JobUpdated => write!(f, "Job updated"),
            SessionEventKind::PollingStarted => write!(f, "Polling started"),
            SessionEventKind::PollingStopped => write!(f, "Polling stopped"),
            SessionEventKind::JobFailed => write!(f, "Job failed"),
            SessionEventKind::ResultsLoading => write!(f, "Loading results"),
            SessionEventKind::ResultsLoaded => write!(f, "Results loaded"),
            SessionEventKind::ResultsFailed => write!(f, "Results failed"),
            SessionEventKind::Error => write!(f, "Error"),
        }
    }
}

/// A state change plus the view as of that change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub project_key: String,
    pub kind: SessionEventKind,
    pub message: String,
    pub view: SessionView,
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(kind: SessionEventKind, message: impl Into<String>, view: SessionView) -> Self {
        Self {
            project_key: view.project_key.clone(),
            kind,
            message: message.into(),
            view,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcasts session events to any number of subscribers.
#[derive(Clone)]
pub struct SessionEventBroadcaster {
    sender: Arc<broadcast::Sender<SessionEvent>>,
}

impl SessionEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: SessionEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{SessionPhase, SessionView};

    fn view() -> SessionView {
        SessionView::empty("acme", SessionPhase::StartPrompt)
    }

    #[test]
    fn test_send_without_receivers_is_ok() {
        let broadcaster = SessionEventBroadcaster::default();
        broadcaster.send(SessionEvent::new(SessionEventKind::PromptShown, "", view()));
        assert_eq!(broadcaster.receiver_count(), 0);
    }

    #[test]
    fn test_send_receive() {
        let broadcaster = SessionEventBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        broadcaster.send(SessionEvent::new(
            SessionEventKind::PromptShown,
            "No analysis yet",
            view(),
        ));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.project_key, "acme");
        assert_eq!(received.kind, SessionEventKind::PromptShown);
        assert_eq!(received.message, "No analysis yet");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SessionEventKind::ResultsLoaded).unwrap(),
            serde_json::json!("results_loaded")
        );
    }
}
