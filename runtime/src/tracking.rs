//! Tracking-authorization adapters.

use async_trait::async_trait;
use consentui_core::tracking::{TrackingAuthorizer, TrackingStatus};
use std::time::Duration;

/// Authorizer for platforms with no tracking-consent concept.
///
/// Both the prompt and the status read resolve to `Authorized`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl TrackingAuthorizer for Unsupported {
    async fn request_authorization(&self) -> TrackingStatus {
        TrackingStatus::Authorized
    }

    fn current_status(&self) -> TrackingStatus {
        TrackingStatus::Authorized
    }
}

/// Defers the tracking prompt so it is not raised before the host UI is active.
///
/// Only `request_authorization` is delayed; status reads pass straight through.
#[derive(Debug, Clone)]
pub struct Deferred<A> {
    inner: A,
    delay: Duration,
}

impl<A> Deferred<A> {
    pub fn new(inner: A, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<A> TrackingAuthorizer for Deferred<A>
where
    A: TrackingAuthorizer,
{
    async fn request_authorization(&self) -> TrackingStatus {
        if !self.delay.is_zero() {
            tracing::trace!(delay = ?self.delay, "Deferring tracking prompt");
            tokio::time::sleep(self.delay).await;
        }
        self.inner.request_authorization().await
    }

    fn current_status(&self) -> TrackingStatus {
        self.inner.current_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentui_test::FixedTracking;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_unsupported_is_authorized() {
        assert_eq!(
            Unsupported.request_authorization().await,
            TrackingStatus::Authorized
        );
        assert_eq!(Unsupported.current_status(), TrackingStatus::Authorized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_waits_before_prompting() {
        let inner = FixedTracking::new(TrackingStatus::Denied);
        let deferred = Deferred::new(inner.clone(), Duration::from_millis(500));

        let started = Instant::now();
        let status = deferred.request_authorization().await;

        assert_eq!(status, TrackingStatus::Denied);
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(inner.requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_status_read_is_immediate() {
        let inner = FixedTracking::new(TrackingStatus::Restricted);
        let deferred = Deferred::new(inner.clone(), Duration::from_secs(5));

        assert_eq!(deferred.current_status(), TrackingStatus::Restricted);
        assert_eq!(inner.requests(), 0);
    }
}
