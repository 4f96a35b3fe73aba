//! The four steps of a consent flow and the typed states between them.
//!
//! `ConsentRequest -> RegionResolved -> ChoiceMade -> TrackingResolved -> ConsentOutcome`

use crate::events::{EntryFlow, FlowEvent, FlowPhase, publish};
use crate::presenter::CoalescingPresenter;
use async_trait::async_trait;
use consentui_core::bus::Bus;
use consentui_core::consent::ConsentOutcome;
use consentui_core::outcome::Outcome;
use consentui_core::presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
use consentui_core::region::{RegionCode, RegionResolver};
use consentui_core::tracking::{TrackingAuthorizer, TrackingStatus};
use consentui_core::transition::Transition;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;

pub const SKIP_PRESENTATION: &str = "skip_presentation";

/// Collaborators shared by every flow of one controller.
pub struct FlowResources {
    pub region: RegionResolver,
    pub presenter: CoalescingPresenter<dyn ConsentPresenter>,
    pub authorizer: Arc<dyn TrackingAuthorizer>,
    pub prompt: ConsentPrompt,
    pub events: broadcast::Sender<FlowEvent>,
}

#[derive(Debug, Clone)]
pub struct ConsentRequest {
    pub entry: EntryFlow,
    pub host: HostId,
}

#[derive(Debug, Clone)]
pub struct RegionResolved {
    pub host: HostId,
    pub region: Option<RegionCode>,
    pub is_eea: bool,
    pub present: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChoiceMade {
    pub is_eea: bool,
    pub choice: Option<UserChoice>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackingResolved {
    pub is_eea: bool,
    pub choice: Option<UserChoice>,
    pub tracking: TrackingStatus,
}

/// Decides EEA membership and whether the dialog is shown.
///
/// An unresolvable region counts as EEA.
pub struct ResolveRegion;

#[async_trait]
impl Transition<ConsentRequest, RegionResolved> for ResolveRegion {
    type Error = Infallible;
    type Resources = FlowResources;

    fn label(&self) -> Option<String> {
        Some("ResolveRegion".into())
    }

    async fn run(
        &self,
        request: ConsentRequest,
        resources: &FlowResources,
        bus: &mut Bus,
    ) -> Outcome<RegionResolved, Infallible> {
        publish(&resources.events, bus, FlowPhase::AwaitingRegion);

        let region = resources.region.current_region();
        let is_eea = region.is_none_or(|code| code.is_eea());
        let present = match request.entry {
            EntryFlow::Unconditional => true,
            EntryFlow::RegionGated => is_eea,
        };
        tracing::debug!(
            region = region.as_ref().map(RegionCode::as_str).unwrap_or("unknown"),
            is_eea,
            present,
            "Region resolved"
        );

        Outcome::Next(RegionResolved {
            host: request.host,
            region,
            is_eea,
            present,
        })
    }
}

/// Shows the dialog, unless the gated flow found the user outside the EEA.
pub struct PresentIfRequired;

#[async_trait]
impl Transition<RegionResolved, ChoiceMade> for PresentIfRequired {
    type Error = Infallible;
    type Resources = FlowResources;

    fn label(&self) -> Option<String> {
        Some("PresentIfRequired".into())
    }

    async fn run(
        &self,
        resolved: RegionResolved,
        resources: &FlowResources,
        bus: &mut Bus,
    ) -> Outcome<ChoiceMade, Infallible> {
        if !resolved.present {
            return Outcome::branch(
                SKIP_PRESENTATION,
                ChoiceMade {
                    is_eea: resolved.is_eea,
                    choice: None,
                },
            );
        }

        publish(&resources.events, bus, FlowPhase::AwaitingUserChoice);
        let choice = resources
            .presenter
            .present(&resolved.host, &resources.prompt)
            .await;
        tracing::debug!(host = %resolved.host, ?choice, "User answered consent dialog");

        Outcome::Next(ChoiceMade {
            is_eea: resolved.is_eea,
            choice: Some(choice),
        })
    }
}

/// Requests tracking authorization. Runs on every path, whatever the choice.
pub struct RequestTracking;

#[async_trait]
impl Transition<ChoiceMade, TrackingResolved> for RequestTracking {
    type Error = Infallible;
    type Resources = FlowResources;

    fn label(&self) -> Option<String> {
        Some("RequestTracking".into())
    }

    async fn run(
        &self,
        made: ChoiceMade,
        resources: &FlowResources,
        bus: &mut Bus,
    ) -> Outcome<TrackingResolved, Infallible> {
        publish(&resources.events, bus, FlowPhase::AwaitingTrackingStatus);
        let tracking = resources.authorizer.request_authorization().await;
        tracing::debug!(%tracking, "Tracking authorization resolved");

        Outcome::Next(TrackingResolved {
            is_eea: made.is_eea,
            choice: made.choice,
            tracking,
        })
    }
}

pub struct ComposeOutcome;

#[async_trait]
impl Transition<TrackingResolved, ConsentOutcome> for ComposeOutcome {
    type Error = Infallible;
    type Resources = FlowResources;

    fn label(&self) -> Option<String> {
        Some("ComposeOutcome".into())
    }

    async fn run(
        &self,
        resolved: TrackingResolved,
        _resources: &FlowResources,
        _bus: &mut Bus,
    ) -> Outcome<ConsentOutcome, Infallible> {
        Outcome::Next(ConsentOutcome::compose(
            resolved.is_eea,
            resolved.choice,
            resolved.tracking,
        ))
    }
}
