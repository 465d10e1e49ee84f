use tokio::sync::broadcast;

use crate::limits::NOTICE_CHANNEL_CAPACITY;

/// Something the front end should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The booking set was re-fetched; redraw from the new snapshot.
    Refreshed { count: usize },
    /// Blocking user notification (e.g. a failed store call).
    Alert(String),
}

/// Broadcast hub for refresh signals and alerts.
pub struct NotifyHub {
    sender: broadcast::Sender<Notice>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(NOTICE_CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Send a notice. No-op if nobody is listening.
    pub fn send(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }
}
