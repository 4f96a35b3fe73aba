//! Presentation de-duplication.
//!
//! At most one consent dialog is open per host. A second request for a host
//! whose dialog is still open joins that dialog and receives the same choice.

use crate::axon::BoxFuture;
use async_trait::async_trait;
use consentui_core::presenter::{ConsentPresenter, ConsentPrompt, HostId, UserChoice};
use futures_util::FutureExt;
use futures_util::future::Shared;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type SharedChoice = Shared<BoxFuture<'static, UserChoice>>;

struct Presentation {
    id: u64,
    choice: SharedChoice,
}

pub struct CoalescingPresenter<P: ?Sized> {
    inner: Arc<P>,
    active: Mutex<HashMap<HostId, Presentation>>,
    next_id: AtomicU64,
}

impl<P> CoalescingPresenter<P>
where
    P: ConsentPresenter + ?Sized + 'static,
{
    pub fn new(inner: Arc<P>) -> Self {
        Self {
            inner,
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Hosts with a dialog currently open.
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_presenting(&self, host: &HostId) -> bool {
        self.active.lock().contains_key(host)
    }

    /// Returns the open presentation for `host`, opening one if needed.
    /// The flag is `true` when an existing presentation was joined.
    fn attach(&self, host: &HostId, prompt: &ConsentPrompt) -> (u64, SharedChoice, bool) {
        let mut active = self.active.lock();
        if let Some(existing) = active.get(host) {
            return (existing.id, existing.choice.clone(), true);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.clone();
        let owned_host = host.clone();
        let prompt = prompt.clone();
        let presentation: BoxFuture<'static, UserChoice> =
            Box::pin(async move { inner.present(&owned_host, &prompt).await });
        let choice = presentation.shared();

        active.insert(
            host.clone(),
            Presentation {
                id,
                choice: choice.clone(),
            },
        );
        (id, choice, false)
    }
}

#[async_trait]
impl<P> ConsentPresenter for CoalescingPresenter<P>
where
    P: ConsentPresenter + ?Sized + 'static,
{
    async fn present(&self, host: &HostId, prompt: &ConsentPrompt) -> UserChoice {
        let (id, choice, joined) = self.attach(host, prompt);
        if joined {
            tracing::warn!(%host, "Consent dialog already open; joining it");
        } else {
            tracing::debug!(%host, "Opening consent dialog");
        }

        let choice = choice.await;

        let mut active = self.active.lock();
        if active.get(host).is_some_and(|current| current.id == id) {
            active.remove(host);
        }
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentui_test::GatedPresenter;

    #[tokio::test]
    async fn test_concurrent_requests_share_one_dialog() {
        let gate = Arc::new(GatedPresenter::new());
        let presenter = CoalescingPresenter::new(gate.clone());
        let host = HostId::new("main-window");
        let prompt = ConsentPrompt::default();

        let first = presenter.present(&host, &prompt);
        let second = presenter.present(&host, &prompt);
        let release = async {
            gate.wait_until_shown(1).await;
            assert!(presenter.is_presenting(&host));
            gate.respond(UserChoice::Accepted);
        };

        let (a, b, ()) = tokio::join!(first, second, release);
        assert_eq!(a, UserChoice::Accepted);
        assert_eq!(b, UserChoice::Accepted);
        assert_eq!(gate.shown(), 1);
        assert_eq!(presenter.active_count(), 0);
    }

    #[tokio::test]
    async fn test_hosts_are_independent() {
        let gate = Arc::new(GatedPresenter::new());
        let presenter = CoalescingPresenter::new(gate.clone());
        let prompt = ConsentPrompt::default();

        let (left_host, right_host) = (HostId::new("left"), HostId::new("right"));

        let left = presenter.present(&left_host, &prompt);
        let right = presenter.present(&right_host, &prompt);
        let release = async {
            gate.wait_until_shown(2).await;
            gate.respond(UserChoice::Declined);
            gate.respond(UserChoice::Accepted);
        };

        let (a, b, ()) = tokio::join!(left, right, release);
        assert_eq!(gate.shown(), 2);
        let mut choices = vec![a, b];
        choices.sort_by_key(|c| c.is_accepted());
        assert_eq!(choices, vec![UserChoice::Declined, UserChoice::Accepted]);
    }

    #[tokio::test]
    async fn test_completed_dialog_frees_the_host() {
        let gate = Arc::new(GatedPresenter::new());
        let presenter = CoalescingPresenter::new(gate.clone());
        let host = HostId::new("main-window");
        let prompt = ConsentPrompt::default();

        for expected in [UserChoice::Declined, UserChoice::Accepted] {
            let ask = presenter.present(&host, &prompt);
            let release = async {
                gate.wait_until_shown(1).await;
                gate.respond(expected);
            };
            let (choice, ()) = tokio::join!(ask, release);
            assert_eq!(choice, expected);
            gate.reset_shown();
        }
        assert_eq!(presenter.active_count(), 0);
    }
}
