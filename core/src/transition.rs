use crate::bus::Bus;
use crate::outcome::Outcome;
use async_trait::async_trait;

/// The contract for one typed step of a flow.
///
/// `Transition` converts state `From` into `Outcome<To, Error>`. Long-lived
/// collaborators arrive through `Resources`; per-invocation values live on the
/// [`Bus`].
#[async_trait]
pub trait Transition<From, To>: Send + Sync + 'static
where
    From: Send + 'static,
    To: Send + 'static,
{
    type Error: Send + 'static;

    type Resources: Send + Sync + 'static;

    /// Human-readable step name for schematics and timelines.
    fn label(&self) -> Option<String> {
        None
    }

    async fn run(
        &self,
        state: From,
        resources: &Self::Resources,
        bus: &mut Bus,
    ) -> Outcome<To, Self::Error>;
}
