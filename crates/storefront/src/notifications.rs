//! Transient toast notifications.
//!
//! Each call to [`Storefront::notify`] mounts an independent element
//! off-screen, slides it in shortly after, holds it, slides it back out, and
//! finally removes it. There is no queue and no de-duplication; concurrent
//! notifications stack. An optional cap dismisses the oldest notification when
//! too many are mounted at once.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shopfront_core::NotificationId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::controller::Storefront;
use crate::page::Page;
use crate::scheduler::Deferred;
use crate::storage::KeyValueStore;
use crate::templates;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    /// Background color of the notification element.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Success => "#28a745",
            Self::Warning => "#ffc107",
            Self::Error => "#dc3545",
            Self::Info => "#17a2b8",
        }
    }

    /// Parse a severity name. Unknown names fall back to [`Severity::Info`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Where a notification element sits in its slide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPhase {
    /// Mounted but translated off-screen.
    Offscreen,
    /// Slid into view.
    Visible,
    /// Sliding back off-screen before removal.
    Leaving,
}

impl NotificationPhase {
    /// Inline `transform` for the element.
    #[must_use]
    pub const fn transform(self) -> &'static str {
        match self {
            Self::Visible => "translateX(0)",
            Self::Offscreen | Self::Leaving => "translateX(400px)",
        }
    }
}

/// A notification element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// Phase at mount time.
    pub phase: NotificationPhase,
    /// Rendered markup. Empty if rendering failed.
    pub html: String,
}

#[derive(Debug)]
struct Active {
    id: NotificationId,
    token: CancellationToken,
}

/// Bookkeeping for mounted notifications.
#[derive(Debug)]
pub struct NotificationCenter {
    next_id: NotificationId,
    active: VecDeque<Active>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self {
            next_id: NotificationId::new(1),
            active: VecDeque::new(),
        }
    }
}

impl NotificationCenter {
    fn allocate(&mut self) -> NotificationId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Number of notifications currently mounted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn take(&mut self, id: NotificationId) -> Option<CancellationToken> {
        let index = self.active.iter().position(|a| a.id == id)?;
        self.active.remove(index).map(|a| a.token)
    }

    fn token(&self, id: NotificationId) -> Option<CancellationToken> {
        self.active
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.token.clone())
    }
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Show a transient notification.
    #[instrument(skip(self, message), fields(severity = severity.as_str()))]
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let message = message.into();

        if let Some(max) = self.config.max_notifications {
            while self.notifications.len() >= max.get() {
                let Some(oldest) = self.notifications.active.front().map(|a| a.id) else {
                    break;
                };
                tracing::debug!(notification = %oldest, "Notification cap reached, dismissing oldest");
                self.dismiss_notification(oldest);
            }
        }

        let id = self.notifications.allocate();
        let html = templates::render_notification(&message, severity).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to render notification");
            String::new()
        });
        let notification = Notification {
            id,
            message,
            severity,
            phase: NotificationPhase::Offscreen,
            html,
        };
        self.page.mount_notification(&notification);

        let token = self.scheduler.child_token();
        let timing = self.config.notifications;
        self.scheduler
            .schedule(timing.enter_delay, token.clone(), Deferred::NotificationEnter(id));
        self.scheduler
            .schedule(timing.visible_for, token.clone(), Deferred::NotificationLeave(id));
        self.notifications.active.push_back(Active { id, token });

        tracing::debug!(notification = %id, message = %notification.message, "Notification shown");
        id
    }

    /// Remove a notification immediately, cancelling its remaining lifecycle.
    ///
    /// Returns `false` if the notification was already gone.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        let Some(token) = self.notifications.take(id) else {
            return false;
        };
        token.cancel();
        self.page.remove_notification(id);
        tracing::debug!(notification = %id, "Notification dismissed");
        true
    }

    pub(crate) fn on_notification_enter(&mut self, id: NotificationId) {
        if !self.page.set_notification_phase(id, NotificationPhase::Visible) {
            self.forget_notification(id);
        }
    }

    pub(crate) fn on_notification_leave(&mut self, id: NotificationId, due: Instant) {
        if !self.page.set_notification_phase(id, NotificationPhase::Leaving) {
            self.forget_notification(id);
            return;
        }
        if let Some(token) = self.notifications.token(id) {
            let exit = self.config.notifications.exit_duration;
            self.scheduler
                .schedule_at(due + exit, token, Deferred::NotificationRemove(id));
        }
    }

    pub(crate) fn on_notification_remove(&mut self, id: NotificationId) {
        self.notifications.take(id);
        self.page.remove_notification(id);
    }

    /// The element vanished underneath us; stop its lifecycle.
    fn forget_notification(&mut self, id: NotificationId) {
        tracing::debug!(notification = %id, "Notification element gone, cancelling lifecycle");
        if let Some(token) = self.notifications.take(id) {
            token.cancel();
        }
    }
}
