use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Platform tracking-authorization status (App Tracking Transparency and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Authorized,
    Denied,
    Restricted,
    NotDetermined,
}

impl TrackingStatus {
    pub const ALL: [TrackingStatus; 4] = [
        TrackingStatus::Authorized,
        TrackingStatus::Denied,
        TrackingStatus::Restricted,
        TrackingStatus::NotDetermined,
    ];

    /// Only an explicit authorization permits cross-app tracking.
    pub fn allows_tracking(&self) -> bool {
        matches!(self, TrackingStatus::Authorized)
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrackingStatus::Authorized => "authorized",
            TrackingStatus::Denied => "denied",
            TrackingStatus::Restricted => "restricted",
            TrackingStatus::NotDetermined => "not determined",
        };
        f.write_str(label)
    }
}

/// The platform privacy subsystem.
///
/// `request_authorization` may prompt the user and must resolve exactly once.
/// Platforms without a tracking-consent concept resolve to
/// [`TrackingStatus::Authorized`].
#[async_trait]
pub trait TrackingAuthorizer: Send + Sync {
    async fn request_authorization(&self) -> TrackingStatus;

    /// Reads the current status without prompting.
    fn current_status(&self) -> TrackingStatus;
}

#[async_trait]
impl<A> TrackingAuthorizer for Arc<A>
where
    A: TrackingAuthorizer + ?Sized,
{
    async fn request_authorization(&self) -> TrackingStatus {
        (**self).request_authorization().await
    }

    fn current_status(&self) -> TrackingStatus {
        (**self).current_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_authorized_allows_tracking() {
        let allowed: Vec<_> = TrackingStatus::ALL
            .into_iter()
            .filter(TrackingStatus::allows_tracking)
            .collect();
        assert_eq!(allowed, vec![TrackingStatus::Authorized]);
    }

    #[test]
    fn test_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&TrackingStatus::NotDetermined).unwrap(),
            "\"not_determined\""
        );
        let parsed: TrackingStatus = serde_json::from_str("\"restricted\"").unwrap();
        assert_eq!(parsed, TrackingStatus::Restricted);
    }
}
