//! Cancelable deferred tasks.
//!
//! Timed UI effects (notification slide-in/out, add-button reversion, the
//! simulated subscription round-trip) are queued here against the tokio clock
//! instead of being spawned. The controller owns the queue, so a fired task
//! runs with exclusive access to storefront state, exactly like an event
//! handler.
//!
//! Every task carries a [`CancellationToken`] derived from the scheduler's
//! root token. Cancelling a token (because its target was torn down)
//! guarantees the task never fires; [`Scheduler::shutdown`] cancels all of
//! them at once.

use std::collections::BTreeMap;
use std::time::Duration;

use shopfront_core::{NotificationId, TimerId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A deferred UI effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Slide a freshly mounted notification into view.
    NotificationEnter(NotificationId),
    /// Start sliding a notification out of view.
    NotificationLeave(NotificationId),
    /// Remove a notification element from the document.
    NotificationRemove(NotificationId),
    /// Restore the default add-to-cart label for a product.
    ResetAddButton(String),
    /// Finish the simulated subscription request.
    CompleteSubscription,
}

#[derive(Debug)]
struct Task {
    token: CancellationToken,
    action: Deferred,
}

/// A task whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTask {
    /// When the task was scheduled to run. Follow-up tasks are scheduled
    /// relative to this rather than to the (possibly later) firing time.
    pub due: Instant,
    pub action: Deferred,
}

/// Deadline-ordered queue of cancelable tasks.
#[derive(Debug)]
pub struct Scheduler {
    root: CancellationToken,
    next_id: TimerId,
    queue: BTreeMap<(Instant, TimerId), Task>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            next_id: TimerId::new(0),
            queue: BTreeMap::new(),
        }
    }

    /// A fresh token that is cancelled when the scheduler shuts down.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Run `action` after `delay` unless `token` is cancelled first.
    pub fn schedule(
        &mut self,
        delay: Duration,
        token: CancellationToken,
        action: Deferred,
    ) -> TimerId {
        self.schedule_at(Instant::now() + delay, token, action)
    }

    /// Run `action` at `due` unless `token` is cancelled first.
    pub fn schedule_at(
        &mut self,
        due: Instant,
        token: CancellationToken,
        action: Deferred,
    ) -> TimerId {
        let id = self.next_id;
        self.next_id = id.next();

        if self.root.is_cancelled() {
            tracing::debug!(timer = %id, ?action, "Scheduler shut down, dropping task");
            return id;
        }

        tracing::debug!(timer = %id, ?action, "Scheduled task");
        self.queue.insert((due, id), Task { token, action });
        id
    }

    /// Deadline of the earliest live task.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.prune_cancelled_head();
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest live task due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<DueTask> {
        self.prune_cancelled_head();
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > now {
            return None;
        }
        let task = self.queue.remove(&(due, id))?;
        tracing::debug!(timer = %id, action = ?task.action, "Firing task");
        Some(DueTask {
            due,
            action: task.action,
        })
    }

    /// Number of queued tasks that can still fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .values()
            .filter(|task| !task.token.is_cancelled())
            .count()
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Cancel every task, queued or future.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        let dropped = self.queue.len();
        self.queue.clear();
        tracing::debug!(dropped, "Scheduler shut down");
    }

    fn prune_cancelled_head(&mut self) {
        while let Some(entry) = self.queue.first_entry() {
            if !entry.get().token.is_cancelled() {
                break;
            }
            entry.remove();
        }
    }
}
