//! # ConsentUI Core
//!
//! Platform-agnostic pieces of the consent SDK: the EEA region gate, the
//! consent outcome model, the contracts the platform collaborators fulfil
//! (region source, dialog presenter, tracking authorizer), and the typed flow
//! primitives the runtime builds the consent pipeline from.

pub mod bus;
pub mod config;
pub mod consent;
pub mod error;
pub mod outcome;
pub mod presenter;
pub mod region;
pub mod schematic;
pub mod timeline;
pub mod tracking;
pub mod transition;

pub use bus::Bus;
pub use config::ConsentConfig;
pub use consent::{ConsentOutcome, OutcomeKind};
pub use error::{ConfigError, RegionError};
pub use outcome::Outcome;
pub use presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
pub use region::{
    EEA_REGIONS, FixedRegion, PosixLocaleSource, RegionCode, RegionResolver, RegionSource,
    is_eea_region,
};
pub use schematic::Schematic;
pub use timeline::{Timeline, TimelineEvent};
pub use tracking::{TrackingAuthorizer, TrackingStatus};
pub use transition::Transition;

pub mod prelude {
    pub use crate::bus::Bus;
    pub use crate::config::ConsentConfig;
    pub use crate::consent::{ConsentOutcome, OutcomeKind};
    pub use crate::outcome::Outcome;
    pub use crate::presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
    pub use crate::region::{FixedRegion, RegionCode, RegionResolver, RegionSource};
    pub use crate::schematic::{NodeKind, Schematic};
    pub use crate::tracking::{TrackingAuthorizer, TrackingStatus};
    pub use crate::transition::Transition;
}
