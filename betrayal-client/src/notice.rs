//! Transient, auto-dismissing notices

use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

/// At most one notice is up at a time; a new one replaces the old.
#[derive(Clone, Debug)]
pub struct Notices {
    duration: Duration,
    current: Option<Notice>,
}

impl Notices {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) -> &Notice {
        self.current.insert(Notice {
            message: message.into(),
            expires_at: now + self.duration,
        })
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|n| n.expires_at)
    }

    /// Drop the notice if its time is up. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.deadline().is_some_and(|at| at <= now) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
