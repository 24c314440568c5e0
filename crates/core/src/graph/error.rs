use crate::graph::label::DependencyLabel;

/// A graph construction that would break the vertex/edge invariants.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedGraph<T> {
    /// The vertex id is already present.
    DuplicateVertex { vertex: T },
    /// An endpoint of the edge was never added as a vertex.
    DanglingEdge {
        source: T,
        target: T,
        label: DependencyLabel,
        missing: T,
    },
}

/// Why a cycle enumeration stopped before running to completion.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exhaustion {
    /// More edge expansions than the configured limit were needed.
    StepLimit { limit: u64 },
    /// The cancellation token was triggered.
    Cancelled,
}

/// Inconsistent output of the SCC partitioner. Indicates a bug.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The components cover fewer vertices than the graph holds.
    IncompletePartition { vertices: usize, covered: usize },
    /// A vertex was assigned to more than one component.
    OverlappingPartition { vertex: usize },
    /// A component handed to the scan has no members.
    EmptyComponent { component: usize },
}
