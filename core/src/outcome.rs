use serde::{Deserialize, Serialize};

pub type BranchId = String;

/// The explicit result of one step of a flow.
///
/// `Outcome` is control flow as data: a step either hands its state to the
/// next step, hands it on while naming the route it took, or faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<T, E> {
    /// Proceed to the next step.
    Next(T),

    /// Proceed with `T`, recording that the named route was taken
    /// (e.g. a skipped presentation).
    Branch(BranchId, T),

    /// Stop the flow.
    Fault(E),
}

impl<T, E> Outcome<T, E> {
    pub fn next(state: T) -> Self {
        Outcome::Next(state)
    }

    pub fn branch(id: impl Into<BranchId>, state: T) -> Self {
        Outcome::Branch(id.into(), state)
    }

    pub fn fault(error: E) -> Self {
        Outcome::Fault(error)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> Outcome<U, E> {
        match self {
            Outcome::Next(t) => Outcome::Next(op(t)),
            Outcome::Branch(id, t) => Outcome::Branch(id, op(t)),
            Outcome::Fault(e) => Outcome::Fault(e),
        }
    }

    /// Name used in timelines and logs.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Outcome::Next(_) => "Next",
            Outcome::Branch(..) => "Branch",
            Outcome::Fault(_) => "Fault",
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Outcome::Fault(_))
    }

    /// Collapse into a `Result`, dropping any branch id.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Next(t) | Outcome::Branch(_, t) => Ok(t),
            Outcome::Fault(e) => Err(e),
        }
    }
}
