//! Newsletter subscription form.
//!
//! There is no backend: a valid submission disables the form for a fixed
//! delay that stands in for the network round-trip, then confirms.

use shopfront_core::{Email, EmailError};
use tracing::instrument;

use crate::controller::Storefront;
use crate::notifications::Severity;
use crate::page::{Page, SubscribeButton};
use crate::scheduler::Deferred;
use crate::storage::KeyValueStore;

/// Trim and validate a submitted email address.
///
/// # Errors
///
/// Returns the validation failure for malformed input.
pub fn validate_email(raw: &str) -> Result<Email, EmailError> {
    Email::parse(raw.trim())
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Handle a subscription form submission.
    ///
    /// Submissions while a previous one is still pending are ignored, as the
    /// submit control is disabled.
    #[instrument(skip(self, raw))]
    pub fn subscribe(&mut self, raw: &str) {
        if self.subscription.is_some() {
            tracing::debug!("Subscription already in progress, ignoring submit");
            return;
        }

        let email = match validate_email(raw) {
            Ok(email) => email,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected subscription email");
                self.notify("Please enter a valid email address!", Severity::Warning);
                return;
            }
        };

        self.page.set_subscribe_button(SubscribeButton::Submitting);
        let token = self.scheduler.child_token();
        self.scheduler.schedule(
            self.config.subscribe_delay,
            token.clone(),
            Deferred::CompleteSubscription,
        );
        self.subscription = Some(token);
        tracing::info!(domain = email.domain(), "Newsletter subscription submitted");
    }

    #[must_use]
    pub const fn is_subscription_pending(&self) -> bool {
        self.subscription.is_some()
    }

    pub(crate) fn on_subscription_complete(&mut self) {
        self.subscription = None;
        self.notify(
            "Thank you for subscribing! Check your email for the 10% off voucher.",
            Severity::Success,
        );
        self.page.clear_email_input();
        self.page.set_subscribe_button(SubscribeButton::Ready);
        tracing::info!("Newsletter subscription confirmed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::page::VirtualPage;
    use crate::storage::MemoryStore;

    fn storefront() -> Storefront<MemoryStore, VirtualPage> {
        Storefront::init(
            StorefrontConfig::default(),
            MemoryStore::default(),
            VirtualPage::default(),
        )
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("  a@b.co  ").is_ok());
        assert!(validate_email("test@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("foo").is_err());
        assert!(validate_email("foo@bar").is_err());
        assert!(validate_email("foo@bar@baz.com").is_err());
        assert!(validate_email("foo bar@baz.com").is_err());
    }

    #[test]
    fn test_invalid_email_warns() {
        let mut storefront = storefront();
        storefront.subscribe("foo@bar");

        assert!(!storefront.is_subscription_pending());
        assert_eq!(storefront.page().subscribe_button(), SubscribeButton::Ready);
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.message, "Please enter a valid email address!");
        assert_eq!(last.severity, Severity::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_email_completes_after_delay() {
        let mut storefront = storefront();
        storefront.page_mut().set_email_input("a@b.co");
        storefront.subscribe("a@b.co");

        assert!(storefront.is_subscription_pending());
        assert_eq!(
            storefront.page().subscribe_button(),
            SubscribeButton::Submitting
        );

        tokio::time::advance(Duration::from_millis(1999)).await;
        storefront.fire_due_timers();
        assert!(storefront.is_subscription_pending());
        assert_eq!(storefront.page().email_input(), "a@b.co");

        tokio::time::advance(Duration::from_millis(1)).await;
        storefront.fire_due_timers();
        assert!(!storefront.is_subscription_pending());
        assert_eq!(storefront.page().subscribe_button(), SubscribeButton::Ready);
        assert_eq!(storefront.page().email_input(), "");
        let last = storefront.page().last_notification().unwrap();
        assert_eq!(last.severity, Severity::Success);
        assert!(last.message.starts_with("Thank you for subscribing!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_is_ignored() {
        let mut storefront = storefront();
        storefront.subscribe("a@b.co");
        storefront.subscribe("c@d.co");
        assert_eq!(storefront.pending_timers(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        storefront.fire_due_timers();
        let confirmations = storefront
            .page()
            .notification_messages()
            .into_iter()
            .filter(|m| m.starts_with("Thank you"))
            .count();
        assert_eq!(confirmations, 1);
    }
}
