//! Flow events - the plain event stream a UI layer binds to.

use consentui_core::bus::Bus;
use consentui_core::consent::ConsentOutcome;
use consentui_core::presenter::HostId;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const EVENT_CAPACITY: usize = 64;

/// Which of the two entry points started a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFlow {
    /// Always presents the dialog.
    Unconditional,
    /// Presents only inside the EEA.
    RegionGated,
}

/// Controller state of one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "snake_case")]
pub enum FlowPhase {
    Idle,
    AwaitingRegion,
    AwaitingUserChoice,
    AwaitingTrackingStatus,
    Resolved(ConsentOutcome),
}

impl FlowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowPhase::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEvent {
    pub flow_id: Uuid,
    pub host: HostId,
    pub entry: EntryFlow,
    pub phase: FlowPhase,
}

/// Identity of the running flow, kept on its `Bus`.
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub flow_id: Uuid,
    pub host: HostId,
    pub entry: EntryFlow,
}

/// Announce a phase change for the flow on `bus`. Having no subscribers is fine.
pub(crate) fn publish(events: &broadcast::Sender<FlowEvent>, bus: &Bus, phase: FlowPhase) {
    let Some(context) = bus.get::<FlowContext>() else {
        return;
    };
    tracing::trace!(flow = %context.flow_id, ?phase, "Flow phase");
    let _ = events.send(FlowEvent {
        flow_id: context.flow_id,
        host: context.host.clone(),
        entry: context.entry,
        phase,
    });
}
