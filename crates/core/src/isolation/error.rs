use derive_more::From;

use crate::graph::error::{Exhaustion, InvariantViolation, MalformedGraph};
use crate::isolation::IsolationLevel;

/// Error returned when a check cannot reach a verdict.
///
/// A violated isolation level is not an error; it is reported as
/// [`Verdict::Violated`](crate::isolation::verdict::Verdict::Violated).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Error<T> {
    /// The graph could not be built (duplicate vertex, dangling edge).
    Malformed(MalformedGraph<T>),
    /// Cycle enumeration in the component anchored at `anchor` ran out of
    /// budget or was cancelled. The caller may retry with a larger budget or
    /// treat the level as inconclusive.
    ResourceExhausted {
        level: IsolationLevel,
        anchor: T,
        reason: Exhaustion,
    },
    /// The SCC partition was inconsistent. Indicates a bug.
    InternalInvariant(InvariantViolation),
}
