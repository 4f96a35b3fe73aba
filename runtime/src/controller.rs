//! # ConsentFlowController
//!
//! Orchestrates region resolution, the consent dialog and the tracking prompt
//! into one of two entry flows, producing exactly one [`ConsentOutcome`] per
//! invocation.
//!
//! | Entry point                  | Dialog             | Tracking | Outcome                                   |
//! |------------------------------|--------------------|----------|-------------------------------------------|
//! | `request_consent`            | always             | always   | EEA: Accepted/Declined, else NotRequired  |
//! | `request_consent_if_needed`  | EEA (or unknown)   | always   | same as above; non-EEA skips the dialog   |
//!
//! There is no cancellation and no timeout: a flow resolves once the
//! presenter and the authorizer have answered.

use crate::axon::Axon;
use crate::events::{EVENT_CAPACITY, EntryFlow, FlowContext, FlowEvent, FlowPhase, publish};
use crate::nodes::{
    ComposeOutcome, ConsentRequest, FlowResources, PresentIfRequired, RequestTracking,
    ResolveRegion,
};
use crate::presenter::CoalescingPresenter;
use crate::tracking::{Deferred, Unsupported};
use consentui_core::bus::Bus;
use consentui_core::config::ConsentConfig;
use consentui_core::consent::ConsentOutcome;
use consentui_core::presenter::{ConsentPresenter, ConsentPrompt, HostId};
use consentui_core::region::{PosixLocaleSource, RegionResolver, RegionSource};
use consentui_core::schematic::Schematic;
use consentui_core::timeline::Timeline;
use consentui_core::tracking::{TrackingAuthorizer, TrackingStatus};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

type ConsentAxon = Axon<ConsentRequest, ConsentOutcome, Infallible, FlowResources>;

fn consent_axon() -> ConsentAxon {
    Axon::new("ConsentFlow")
        .then(ResolveRegion)
        .then(PresentIfRequired)
        .then(RequestTracking)
        .then(ComposeOutcome)
        .describe("Region gate, consent dialog, tracking authorization")
}

pub struct ConsentFlowController {
    resources: FlowResources,
    axon: ConsentAxon,
}

impl ConsentFlowController {
    pub fn builder(presenter: impl ConsentPresenter + 'static) -> ConsentFlowControllerBuilder {
        ConsentFlowControllerBuilder::new(Arc::new(presenter))
    }

    /// Region override, tracking delay and dialog copy from `config`; the
    /// authorizer is wrapped in [`Deferred`] with the configured delay.
    pub fn from_config(
        config: &ConsentConfig,
        presenter: Arc<dyn ConsentPresenter>,
        authorizer: impl TrackingAuthorizer + 'static,
    ) -> Self {
        ConsentFlowControllerBuilder::new(presenter)
            .region_source_arc(config.region_source())
            .authorizer(Deferred::new(authorizer, config.tracking_delay()))
            .prompt(config.prompt.clone())
            .build()
    }

    /// Always presents the dialog. Outside the EEA the result is still `NotRequired`.
    pub async fn request_consent(&self, host: &HostId) -> ConsentOutcome {
        self.run(EntryFlow::Unconditional, host).await
    }

    /// Presents the dialog only when consent is required; tracking is requested either way.
    pub async fn request_consent_if_needed(&self, host: &HostId) -> ConsentOutcome {
        self.run(EntryFlow::RegionGated, host).await
    }

    /// Callback form of [`request_consent`](Self::request_consent), spawned on the current runtime.
    pub fn request_consent_with<F>(self: &Arc<Self>, host: HostId, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(ConsentOutcome) + Send + 'static,
    {
        self.spawn(EntryFlow::Unconditional, host, callback)
    }

    /// Callback form of [`request_consent_if_needed`](Self::request_consent_if_needed).
    pub fn request_consent_if_needed_with<F>(
        self: &Arc<Self>,
        host: HostId,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(ConsentOutcome) + Send + 'static,
    {
        self.spawn(EntryFlow::RegionGated, host, callback)
    }

    pub fn is_consent_required(&self) -> bool {
        self.resources.region.is_consent_required()
    }

    pub fn current_tracking_status(&self) -> TrackingStatus {
        self.resources.authorizer.current_status()
    }

    pub fn schematic(&self) -> &Schematic {
        self.axon.schematic()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.resources.events.subscribe()
    }

    fn spawn<F>(self: &Arc<Self>, entry: EntryFlow, host: HostId, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(ConsentOutcome) + Send + 'static,
    {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = controller.run(entry, &host).await;
            callback(outcome);
        })
    }

    async fn run(&self, entry: EntryFlow, host: &HostId) -> ConsentOutcome {
        let flow_id = Uuid::new_v4();
        let mut bus = Bus::new();
        bus.insert(FlowContext {
            flow_id,
            host: host.clone(),
            entry,
        });
        publish(&self.resources.events, &bus, FlowPhase::Idle);

        let request = ConsentRequest {
            entry,
            host: host.clone(),
        };
        let outcome = match self
            .axon
            .execute(request, &self.resources, &mut bus)
            .await
            .into_result()
        {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        };

        if let Some(timeline) = bus.get::<Timeline>() {
            tracing::debug!(
                flow = %flow_id,
                visited = ?timeline.visited(),
                branches = ?timeline.branches(),
                "Consent flow timeline"
            );
        }
        tracing::info!(flow = %flow_id, %host, ?entry, %outcome, "Consent flow resolved");
        publish(&self.resources.events, &bus, FlowPhase::Resolved(outcome));
        outcome
    }
}

impl std::fmt::Debug for ConsentFlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentFlowController")
            .field("flow", &self.axon.schematic.name)
            .finish_non_exhaustive()
    }
}

/// Wires collaborators into a [`ConsentFlowController`].
///
/// Defaults: region from the POSIX locale, the [`Unsupported`] authorizer,
/// and the default English prompt.
pub struct ConsentFlowControllerBuilder {
    presenter: Arc<dyn ConsentPresenter>,
    region_source: Arc<dyn RegionSource>,
    authorizer: Arc<dyn TrackingAuthorizer>,
    prompt: ConsentPrompt,
}

impl ConsentFlowControllerBuilder {
    pub fn new(presenter: Arc<dyn ConsentPresenter>) -> Self {
        Self {
            presenter,
            region_source: Arc::new(PosixLocaleSource),
            authorizer: Arc::new(Unsupported),
            prompt: ConsentPrompt::default(),
        }
    }

    pub fn region_source(self, source: impl RegionSource + 'static) -> Self {
        self.region_source_arc(Arc::new(source))
    }

    pub fn region_source_arc(mut self, source: Arc<dyn RegionSource>) -> Self {
        self.region_source = source;
        self
    }

    pub fn authorizer(mut self, authorizer: impl TrackingAuthorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    pub fn prompt(mut self, prompt: ConsentPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn build(self) -> ConsentFlowController {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConsentFlowController {
            resources: FlowResources {
                region: RegionResolver::from_arc(self.region_source),
                presenter: CoalescingPresenter::new(self.presenter),
                authorizer: self.authorizer,
                prompt: self.prompt,
                events,
            },
            axon: consent_axon(),
        }
    }
}
