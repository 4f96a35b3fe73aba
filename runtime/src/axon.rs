//! # Axon: Executable Flow
//!
//! The `Axon` is the runtime execution path of a typed flow: a chain of
//! [`Transition`]s where each step's output type is the next step's input.
//!
//! * **Axon flows, Schematic shows**: the Axon executes; its `Schematic`
//!   describes the same chain statically.
//! * **Builder pattern**: `Axon::new("Label").then(StepA).then(StepB)`.
//! * **Timeline**: every execution records node entries, exits and branches
//!   on the flow's `Bus`.

use consentui_core::bus::Bus;
use consentui_core::outcome::Outcome;
use consentui_core::schematic::{Edge, Node, NodeKind, Schematic};
use consentui_core::timeline::{Timeline, TimelineEvent};
use consentui_core::transition::Transition;
use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executor for a whole chain: takes the flow input, the shared resources and
/// the per-flow Bus.
pub type Executor<In, Out, E, R> =
    Arc<dyn for<'a> Fn(In, &'a R, &'a mut Bus) -> BoxFuture<'a, Outcome<Out, E>> + Send + Sync>;

fn executor<In, Out, E, R, F>(f: F) -> Executor<In, Out, E, R>
where
    F: for<'a> Fn(In, &'a R, &'a mut Bus) -> BoxFuture<'a, Outcome<Out, E>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Helper to extract a readable type name from a type.
fn type_name_of<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.split("::").last().unwrap_or(base).to_string()
}

/// The Axon builder and runtime. Reusable and cheap to clone.
pub struct Axon<In, Out, E, R> {
    pub schematic: Schematic,
    executor: Executor<In, Out, E, R>,
}

impl<In, Out, E, R> Clone for Axon<In, Out, E, R> {
    fn clone(&self) -> Self {
        Self {
            schematic: self.schematic.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<In, E, R> Axon<In, In, E, R>
where
    In: Send + 'static,
    E: Send + 'static,
    R: Send + Sync + 'static,
{
    /// Start a new flow. This creates an identity Axon (`In -> In`).
    pub fn new(label: &str) -> Self {
        let node = Node {
            id: uuid::Uuid::new_v4().to_string(),
            kind: NodeKind::Ingress,
            label: label.to_string(),
            input_type: "void".to_string(),
            output_type: type_name_of::<In>(),
        };

        let mut schematic = Schematic::new(label);
        schematic.nodes.push(node);

        let executor = executor(|input: In, _resources: &R, _bus: &mut Bus| {
            Box::pin(std::future::ready(Outcome::Next(input))) as BoxFuture<'_, _>
        });

        Self {
            schematic,
            executor,
        }
    }
}

impl<In, Out, E, R> Axon<In, Out, E, R>
where
    In: Send + 'static,
    Out: Send + 'static,
    E: Send + 'static,
    R: Send + Sync + 'static,
{
    /// Chain a transition. `Next` and `Branch` hand the state on; `Fault`
    /// short-circuits the rest of the chain.
    pub fn then<Next, Trans>(self, transition: Trans) -> Axon<In, Next, E, R>
    where
        Next: Send + 'static,
        Trans: Transition<Out, Next, Error = E, Resources = R>,
    {
        let label = transition
            .label()
            .unwrap_or_else(|| type_name_of::<Trans>());

        let Axon {
            mut schematic,
            executor: prev_executor,
        } = self;

        let node_id = uuid::Uuid::new_v4().to_string();
        let last_node_id = schematic
            .nodes
            .last()
            .map(|n| n.id.clone())
            .unwrap_or_default();

        schematic.nodes.push(Node {
            id: node_id.clone(),
            kind: NodeKind::Atom,
            label: label.clone(),
            input_type: type_name_of::<Out>(),
            output_type: type_name_of::<Next>(),
        });
        schematic.edges.push(Edge {
            from: last_node_id,
            to: node_id.clone(),
            label: Some("Next".to_string()),
        });

        let transition = Arc::new(transition);
        let next_executor = executor(move |input: In, resources: &R, bus: &mut Bus| {
            let prev = prev_executor.clone();
            let trans = transition.clone();
            let node_id = node_id.clone();
            let label = label.clone();

            Box::pin(async move {
                let state = match prev(input, resources, &mut *bus).await {
                    Outcome::Next(t) | Outcome::Branch(_, t) => t,
                    Outcome::Fault(e) => return Outcome::Fault(e),
                };

                record(
                    bus,
                    TimelineEvent::NodeEnter {
                        node_id: node_id.clone(),
                        node_label: label.clone(),
                        at: chrono::Utc::now(),
                    },
                );
                tracing::debug!(node = %label, "Entering node");
                let started = Instant::now();

                let result = trans.run(state, resources, &mut *bus).await;

                let duration = started.elapsed();
                if let Outcome::Branch(branch_id, _) = &result {
                    tracing::debug!(node = %label, branch = %branch_id, "Branch taken");
                    record(
                        bus,
                        TimelineEvent::BranchTaken {
                            node_id: node_id.clone(),
                            branch_id: branch_id.clone(),
                            at: chrono::Utc::now(),
                        },
                    );
                }
                if result.is_fault() {
                    tracing::warn!(node = %label, ?duration, "Node faulted, skipping the rest");
                } else {
                    tracing::debug!(
                        node = %label,
                        outcome = result.kind_label(),
                        ?duration,
                        "Node completed"
                    );
                }
                record(
                    bus,
                    TimelineEvent::NodeExit {
                        node_id,
                        outcome_type: result.kind_label().to_string(),
                        duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                        at: chrono::Utc::now(),
                    },
                );
                result
            }) as BoxFuture<'_, _>
        });

        Axon {
            schematic,
            executor: next_executor,
        }
    }

    /// Attach a description to the schematic.
    pub fn describe(self, description: impl Into<String>) -> Self {
        let Axon {
            schematic,
            executor,
        } = self;
        Axon {
            schematic: schematic.with_description(description),
            executor,
        }
    }

    /// Execute the flow. A `Timeline` is placed on the bus if none is present.
    pub async fn execute(&self, input: In, resources: &R, bus: &mut Bus) -> Outcome<Out, E> {
        if !bus.contains::<Timeline>() {
            bus.insert(Timeline::new());
        }
        let label = self.schematic.name.clone();
        (self.executor)(input, resources, bus)
            .instrument(tracing::info_span!("Flow", consentui.flow = %label))
            .await
    }

    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }
}

fn record(bus: &mut Bus, event: TimelineEvent) {
    if let Some(timeline) = bus.get_mut::<Timeline>() {
        timeline.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Limit(u32);

    struct Double;

    #[async_trait]
    impl Transition<u32, u32> for Double {
        type Error = String;
        type Resources = Limit;

        async fn run(&self, n: u32, limit: &Limit, _bus: &mut Bus) -> Outcome<u32, String> {
            if n * 2 > limit.0 {
                Outcome::Fault(format!("{} exceeds {}", n * 2, limit.0))
            } else if n == 0 {
                Outcome::branch("zero", n)
            } else {
                Outcome::Next(n * 2)
            }
        }
    }

    struct Render;

    #[async_trait]
    impl Transition<u32, String> for Render {
        type Error = String;
        type Resources = Limit;

        fn label(&self) -> Option<String> {
            Some("Render".into())
        }

        async fn run(&self, n: u32, _limit: &Limit, _bus: &mut Bus) -> Outcome<String, String> {
            Outcome::Next(format!("#{n}"))
        }
    }

    fn pipeline() -> Axon<u32, String, String, Limit> {
        Axon::new("Numbers").then(Double).then(Double).then(Render)
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let mut bus = Bus::new();
        let out = pipeline().execute(3, &Limit(100), &mut bus).await;
        assert_eq!(out, Outcome::Next("#12".to_string()));

        let timeline = bus.get::<Timeline>().unwrap();
        assert_eq!(timeline.visited(), vec!["Double", "Double", "Render"]);
        assert!(timeline.branches().is_empty());
    }

    #[tokio::test]
    async fn test_branch_continues_and_is_recorded() {
        let mut bus = Bus::new();
        let out = pipeline().execute(0, &Limit(100), &mut bus).await;
        assert_eq!(out, Outcome::Next("#0".to_string()));

        let timeline = bus.get::<Timeline>().unwrap();
        assert_eq!(timeline.branches(), vec!["zero", "zero"]);
    }

    #[tokio::test]
    async fn test_fault_short_circuits() {
        let mut bus = Bus::new();
        let out = pipeline().execute(30, &Limit(100), &mut bus).await;
        assert!(out.is_fault());
        assert_eq!(out, Outcome::Fault("120 exceeds 100".to_string()));

        // The render step never ran.
        let timeline = bus.get::<Timeline>().unwrap();
        assert_eq!(timeline.visited(), vec!["Double", "Double"]);
    }

    #[test]
    fn test_schematic_shape() {
        let schematic = pipeline().describe("doubling").schematic;
        assert_eq!(schematic.labels(), vec!["Numbers", "Double", "Double", "Render"]);
        assert_eq!(schematic.edges.len(), 3);
        assert_eq!(schematic.nodes[0].kind, NodeKind::Ingress);
        assert_eq!(schematic.nodes[3].input_type, "u32");
        assert_eq!(schematic.nodes[3].output_type, "String");
        assert_eq!(schematic.description.as_deref(), Some("doubling"));
        for (edge, pair) in schematic.edges.iter().zip(schematic.nodes.windows(2)) {
            assert_eq!(edge.from, pair[0].id);
            assert_eq!(edge.to, pair[1].id);
        }
    }
}
