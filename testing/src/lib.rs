//! Test doubles for consent flows.
//!
//! Every fake is cheap to clone; clones share their counters so a test can
//! hand one clone to the controller and inspect the other.

use async_trait::async_trait;
use consentui_core::consent::ConsentOutcome;
use consentui_core::presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
use consentui_core::region::RegionSource;
use consentui_core::tracking::{TrackingAuthorizer, TrackingStatus};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, oneshot};

/// A region source whose value can be changed mid-test.
#[derive(Debug, Clone, Default)]
pub struct SwitchableRegion {
    current: Arc<Mutex<Option<String>>>,
    reads: Arc<AtomicUsize>,
}

impl SwitchableRegion {
    pub fn new(code: Option<&str>) -> Self {
        let region = Self::default();
        region.set(code);
        region
    }

    pub fn set(&self, code: Option<&str>) {
        *self.current.lock() = code.map(str::to_string);
    }

    /// How many times the platform was asked.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RegionSource for SwitchableRegion {
    fn current_region(&self) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.current.lock().clone()
    }
}

/// Answers every presentation immediately with a fixed choice.
#[derive(Debug, Clone)]
pub struct ScriptedPresenter {
    choice: UserChoice,
    shown: Arc<Mutex<Vec<(HostId, ConsentPrompt)>>>,
}

impl ScriptedPresenter {
    pub fn new(choice: UserChoice) -> Self {
        Self {
            choice,
            shown: Arc::default(),
        }
    }

    pub fn accepting() -> Self {
        Self::new(UserChoice::Accepted)
    }

    pub fn declining() -> Self {
        Self::new(UserChoice::Declined)
    }

    pub fn shown(&self) -> usize {
        self.shown.lock().len()
    }

    /// Hosts and prompts of every presentation, in order.
    pub fn presentations(&self) -> Vec<(HostId, ConsentPrompt)> {
        self.shown.lock().clone()
    }
}

#[async_trait]
impl ConsentPresenter for ScriptedPresenter {
    async fn present(&self, host: &HostId, prompt: &ConsentPrompt) -> UserChoice {
        self.shown.lock().push((host.clone(), prompt.clone()));
        self.choice
    }
}

/// Holds every presentation open until the test calls [`respond`](Self::respond).
///
/// Answers are delivered in presentation order.
#[derive(Debug, Default)]
pub struct GatedPresenter {
    shown: AtomicUsize,
    shown_changed: Notify,
    pending: Mutex<VecDeque<oneshot::Sender<UserChoice>>>,
}

impl GatedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn reset_shown(&self) {
        self.shown.store(0, Ordering::SeqCst);
    }

    /// Resolves once at least `count` dialogs have been opened.
    pub async fn wait_until_shown(&self, count: usize) {
        loop {
            let changed = self.shown_changed.notified();
            if self.shown() >= count {
                return;
            }
            changed.await;
        }
    }

    /// Answer the oldest open dialog. Returns `false` if none was open.
    pub fn respond(&self, choice: UserChoice) -> bool {
        let sender = self.pending.lock().pop_front();
        match sender {
            Some(sender) => sender.send(choice).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl ConsentPresenter for GatedPresenter {
    async fn present(&self, _host: &HostId, _prompt: &ConsentPrompt) -> UserChoice {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push_back(tx);
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.shown_changed.notify_waiters();
        // A dropped gate means the test is tearing down.
        rx.await.unwrap_or(UserChoice::Declined)
    }
}

/// Resolves every tracking request with the same status.
#[derive(Debug, Clone)]
pub struct FixedTracking {
    status: TrackingStatus,
    requests: Arc<AtomicUsize>,
}

impl FixedTracking {
    pub fn new(status: TrackingStatus) -> Self {
        Self {
            status,
            requests: Arc::default(),
        }
    }

    /// Number of prompting requests (status reads are not counted).
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackingAuthorizer for FixedTracking {
    async fn request_authorization(&self) -> TrackingStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.status
    }

    fn current_status(&self) -> TrackingStatus {
        self.status
    }
}

/// Records every invocation of the result callbacks it hands out.
#[derive(Debug, Clone, Default)]
pub struct CallbackProbe {
    outcomes: Arc<Mutex<Vec<ConsentOutcome>>>,
}

impl CallbackProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(ConsentOutcome) + Send + 'static {
        let outcomes = self.outcomes.clone();
        move |outcome| outcomes.lock().push(outcome)
    }

    pub fn calls(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn outcomes(&self) -> Vec<ConsentOutcome> {
        self.outcomes.lock().clone()
    }
}
