//! ConsentUI facade crate.
//!
//! Re-exports the core model and the async runtime behind a single entry point.
//! Hosts implement [`ConsentPresenter`] and, where the platform has one,
//! [`TrackingAuthorizer`]; everything else has a default.
//!
//! ```no_run
//! use consentui::prelude::*;
//!
//! # async fn show(presenter: impl ConsentPresenter + 'static) {
//! let controller = ConsentFlowController::builder(presenter).build();
//! let outcome = controller
//!     .request_consent_if_needed(&HostId::new("main-window"))
//!     .await;
//! if outcome.is_consent_granted() {
//!     // enable personalised features
//! }
//! # }
//! ```

pub use consentui_core as core;
#[cfg(feature = "observe")]
pub use consentui_observe as observe;
pub use consentui_runtime as runtime;

pub use consentui_core::{
    ConsentConfig, ConsentOutcome, ConsentPresenter, ConsentPrompt, HostId, TrackingAuthorizer,
    TrackingStatus, UserChoice, is_eea_region,
};
pub use consentui_runtime::{ConsentFlowController, ConsentFlowControllerBuilder};

pub mod prelude {
    pub use consentui_core::prelude::*;
    pub use consentui_runtime::prelude::*;
}
