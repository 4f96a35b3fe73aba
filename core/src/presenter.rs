//! The consent dialog contract.
//!
//! Rendering belongs to the embedding platform. The core only needs a
//! binary answer per presentation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The button the user pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChoice {
    Accepted,
    Declined,
}

impl UserChoice {
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            UserChoice::Accepted
        } else {
            UserChoice::Declined
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, UserChoice::Accepted)
    }
}

/// Opaque presentation context supplied by the embedder: a window, an
/// activity, a screen. Presentations are de-duplicated per host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Dialog copy. Treated as opaque text and handed to the presenter unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentPrompt {
    pub title: String,
    pub message: String,
    pub allow_label: String,
    pub decline_label: String,
}

impl ConsentPrompt {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        allow_label: impl Into<String>,
        decline_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            allow_label: allow_label.into(),
            decline_label: decline_label.into(),
        }
    }
}

impl Default for ConsentPrompt {
    fn default() -> Self {
        Self::new(
            "Your privacy matters",
            "We use data to personalize ads and measure app performance. \
             You can change your choice at any time in Settings.",
            "Allow",
            "Decline",
        )
    }
}

/// Shows a non-dismissible Allow/Decline modal.
///
/// Implementations must resolve exactly once per call and must not offer an
/// outside-tap or back/escape dismissal.
#[async_trait]
pub trait ConsentPresenter: Send + Sync {
    async fn present(&self, host: &HostId, prompt: &ConsentPrompt) -> UserChoice;
}

#[async_trait]
impl<P> ConsentPresenter for Arc<P>
where
    P: ConsentPresenter + ?Sized,
{
    async fn present(&self, host: &HostId, prompt: &ConsentPrompt) -> UserChoice {
        (**self).present(host, prompt).await
    }
}
