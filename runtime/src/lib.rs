//! # ConsentUI Runtime
//!
//! The async side of the SDK: the `Axon` flow executor, the consent flow
//! steps, presentation de-duplication, tracking adapters, and the
//! [`ConsentFlowController`] that ties them together.

pub mod axon;
pub mod controller;
pub mod events;
pub mod nodes;
pub mod presenter;
pub mod tracking;

pub use axon::Axon;
pub use controller::{ConsentFlowController, ConsentFlowControllerBuilder};
pub use events::{EntryFlow, FlowEvent, FlowPhase};
pub use presenter::CoalescingPresenter;
pub use tracking::{Deferred, Unsupported};

pub mod prelude {
    pub use crate::axon::Axon;
    pub use crate::controller::{ConsentFlowController, ConsentFlowControllerBuilder};
    pub use crate::events::{EntryFlow, FlowEvent, FlowPhase};
    pub use crate::presenter::CoalescingPresenter;
    pub use crate::tracking::{Deferred, Unsupported};
}
