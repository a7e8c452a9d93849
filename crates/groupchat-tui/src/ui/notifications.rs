// Toast queue shown in the status bar. Send, roster and member failures end
// up here; poll failures never do.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Same text pushed again within this window is dropped
const DEDUP_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✗",
        }
    }

    fn default_duration(&self) -> Duration {
        match self {
            NotificationLevel::Info | NotificationLevel::Success => Duration::from_secs(3),
            NotificationLevel::Warning => Duration::from_secs(4),
            NotificationLevel::Error => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration: Duration,
    shown_at: Option<Instant>,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            duration: level.default_duration(),
            shown_at: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|shown| now.duration_since(shown) >= self.duration)
    }

    fn mark_shown(&mut self, now: Instant) {
        self.shown_at.get_or_insert(now);
    }
}

/// One visible toast plus a priority-ordered backlog.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
    current: Option<Notification>,
    recent: Vec<(String, Instant)>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A more severe notification replaces the visible one outright; the
    /// replaced toast is not shown again.
    pub fn push(&mut self, notification: Notification) {
        self.push_at(notification, Instant::now());
    }

    fn push_at(&mut self, mut notification: Notification, now: Instant) {
        self.recent.retain(|(_, expiry)| *expiry > now);
        if self.recent.iter().any(|(m, _)| *m == notification.message) {
            return;
        }
        self.recent
            .push((notification.message.clone(), now + DEDUP_WINDOW));

        match &self.current {
            None => {
                notification.mark_shown(now);
                self.current = Some(notification);
            }
            Some(current) if notification.level > current.level => {
                notification.mark_shown(now);
                self.current = Some(notification);
            }
            Some(_) => {
                let pos = self
                    .queue
                    .iter()
                    .position(|n| n.level < notification.level)
                    .unwrap_or(self.queue.len());
                self.queue.insert(pos, notification);
            }
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
        self.advance(Instant::now());
    }

    /// Expire the visible toast and promote the next one.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
            self.advance(now);
        }
    }

    fn advance(&mut self, now: Instant) {
        if self.current.is_none() {
            if let Some(mut next) = self.queue.pop_front() {
                next.mark_shown(now);
                self.current = Some(next);
            }
        }
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}
