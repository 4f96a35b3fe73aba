use crate::presenter::UserChoice;
use crate::tracking::TrackingStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The single terminal result of one consent flow.
///
/// Every variant carries the tracking status observed at the end of the flow.
/// It is optional only so that records written without one still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConsentOutcome {
    /// EEA user pressed Allow.
    Accepted {
        #[serde(default)]
        tracking: Option<TrackingStatus>,
    },
    /// EEA user pressed Decline.
    Declined {
        #[serde(default)]
        tracking: Option<TrackingStatus>,
    },
    /// The user is outside the EEA; the dialog choice, if any, has no legal weight.
    NotRequired {
        #[serde(default)]
        tracking: Option<TrackingStatus>,
    },
}

/// Flat discriminant of [`ConsentOutcome`], handy for `match`-free comparisons and FFI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Accepted,
    Declined,
    NotRequired,
}

impl ConsentOutcome {
    /// Region overrides the literal button: outside the EEA the result is
    /// always `NotRequired`, even when a dialog was shown.
    pub fn compose(is_eea: bool, choice: Option<UserChoice>, tracking: TrackingStatus) -> Self {
        let tracking = Some(tracking);
        match (is_eea, choice) {
            (true, Some(UserChoice::Accepted)) => ConsentOutcome::Accepted { tracking },
            (true, Some(UserChoice::Declined)) => ConsentOutcome::Declined { tracking },
            // An EEA flow always presents; a missing choice can only mean the gate was skipped.
            (true, None) | (false, _) => ConsentOutcome::NotRequired { tracking },
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            ConsentOutcome::Accepted { .. } => OutcomeKind::Accepted,
            ConsentOutcome::Declined { .. } => OutcomeKind::Declined,
            ConsentOutcome::NotRequired { .. } => OutcomeKind::NotRequired,
        }
    }

    pub fn tracking_status(&self) -> Option<TrackingStatus> {
        match self {
            ConsentOutcome::Accepted { tracking }
            | ConsentOutcome::Declined { tracking }
            | ConsentOutcome::NotRequired { tracking } => *tracking,
        }
    }

    /// `true` only for an explicit EEA acceptance.
    pub fn is_consent_granted(&self) -> bool {
        matches!(self, ConsentOutcome::Accepted { .. })
    }
}

impl fmt::Display for ConsentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind() {
            OutcomeKind::Accepted => "accepted",
            OutcomeKind::Declined => "declined",
            OutcomeKind::NotRequired => "not required",
        };
        match self.tracking_status() {
            Some(status) => write!(f, "{label} (tracking: {status})"),
            None => f.write_str(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_eea_respects_choice() {
        let accepted =
            ConsentOutcome::compose(true, Some(UserChoice::Accepted), TrackingStatus::Denied);
        let declined =
            ConsentOutcome::compose(true, Some(UserChoice::Declined), TrackingStatus::Denied);

        assert_eq!(accepted.kind(), OutcomeKind::Accepted);
        assert_eq!(declined.kind(), OutcomeKind::Declined);
        assert!(accepted.is_consent_granted());
        assert!(!declined.is_consent_granted());
    }

    #[test]
    fn test_compose_outside_eea_ignores_choice() {
        for choice in [
            Some(UserChoice::Accepted),
            Some(UserChoice::Declined),
            None,
        ] {
            let outcome = ConsentOutcome::compose(false, choice, TrackingStatus::Restricted);
            assert_eq!(
                outcome,
                ConsentOutcome::NotRequired {
                    tracking: Some(TrackingStatus::Restricted)
                }
            );
        }
    }

    #[test]
    fn test_tracking_is_attached_unchanged() {
        for status in TrackingStatus::ALL {
            for (is_eea, choice) in [
                (true, Some(UserChoice::Accepted)),
                (true, Some(UserChoice::Declined)),
                (false, None),
            ] {
                let outcome = ConsentOutcome::compose(is_eea, choice, status);
                assert_eq!(outcome.tracking_status(), Some(status));
            }
        }
    }

    #[test]
    fn test_serde_shape() {
        let outcome = ConsentOutcome::Declined {
            tracking: Some(TrackingStatus::NotDetermined),
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"result": "declined", "tracking": "not_determined"})
        );

        let legacy: ConsentOutcome = serde_json::from_str(r#"{"result":"not_required"}"#).unwrap();
        assert_eq!(legacy, ConsentOutcome::NotRequired { tracking: None });
        assert_eq!(legacy.to_string(), "not required");
    }
}
