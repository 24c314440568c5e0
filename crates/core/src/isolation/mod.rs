use core::fmt::{Debug, Display, Formatter};
use core::hash::Hash;

use self::checker::Checker;
use self::error::Error;
use crate::graph::cycle::{Budget, Cycle, EnumerationPolicy};
use crate::graph::dependency::DependencyGraph;
use crate::graph::label::LabelSet;

pub mod checker;
pub mod classifier;
pub mod error;
pub mod verdict;

pub use verdict::{Anomaly, Verdict};

/// Isolation levels, ordered from weakest to strongest.
///
/// Each level forbids a family of cycles in the dependency graph:
/// PL-1 < PL-2 < Parallel Snapshot Isolation < Snapshot Isolation < Serializability.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolationLevel {
    /// PL-1: no cycle of `ww` edges (G0, dirty writes).
    Pl1,
    /// PL-2: no cycle of `ww`/`wr` edges (G1c, circular information flow).
    Pl2,
    /// Parallel Snapshot Isolation: every cycle has at least two `rw` edges.
    ParallelSnapshotIsolation,
    /// Snapshot Isolation: every cycle has two adjacent `rw` edges.
    SnapshotIsolation,
    /// Serializability: no cycle.
    Serializable,
}

impl IsolationLevel {
    pub const ALL: [Self; 5] = [
        Self::Pl1,
        Self::Pl2,
        Self::ParallelSnapshotIsolation,
        Self::SnapshotIsolation,
        Self::Serializable,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pl1 => "pl1",
            Self::Pl2 => "pl2",
            Self::ParallelSnapshotIsolation => "parallel-snapshot-isolation",
            Self::SnapshotIsolation => "snapshot-isolation",
            Self::Serializable => "serializable",
        }
    }

    /// Edges the level's cycle search runs over.
    #[must_use]
    pub const fn labels(self) -> LabelSet {
        match self {
            Self::Pl1 => LabelSet::WRITE_WRITE,
            Self::Pl2 => LabelSet::WRITE_DEPENDENCIES,
            Self::ParallelSnapshotIsolation | Self::SnapshotIsolation | Self::Serializable => {
                LabelSet::ALL
            }
        }
    }

    #[must_use]
    pub const fn policy(self) -> EnumerationPolicy {
        match self {
            Self::ParallelSnapshotIsolation | Self::SnapshotIsolation => {
                EnumerationPolicy::Exhaustive
            }
            Self::Pl1 | Self::Pl2 | Self::Serializable => EnumerationPolicy::ExistenceOnly,
        }
    }

    /// Whether `cycle` is allowed under this level.
    #[must_use]
    pub fn admits(self, cycle: &Cycle) -> bool {
        classifier::admits(self, cycle.labels())
    }
}

impl Display for IsolationLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether `graph` satisfies `level`, without a resource bound.
///
/// # Errors
///
/// Returns [`Error::InternalInvariant`] if the SCC partition is inconsistent.
pub fn check<T>(graph: &DependencyGraph<T>, level: IsolationLevel) -> Result<Verdict<T>, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check_with(graph, level, &Budget::unbounded())
}

/// Check whether `graph` satisfies `level` under `budget`.
///
/// On success returns [`Verdict::Holds`], or [`Verdict::Violated`] with the
/// first forbidden cycle in component order.
///
/// # Errors
///
/// Returns [`Error::ResourceExhausted`] if a component's enumeration exceeds
/// `budget` or is cancelled, and [`Error::InternalInvariant`] if the SCC
/// partition is inconsistent.
pub fn check_with<T>(
    graph: &DependencyGraph<T>,
    level: IsolationLevel,
    budget: &Budget,
) -> Result<Verdict<T>, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    tracing::debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        %level,
        "checking isolation level"
    );

    let verdict = Checker::new(graph, level, budget).run()?;

    tracing::debug!(%level, holds = verdict.holds(), "isolation check finished");
    Ok(verdict)
}

/// `true` iff the graph has no cycle.
///
/// # Errors
///
/// See [`check`].
pub fn check_serializability<T>(graph: &DependencyGraph<T>) -> Result<bool, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check(graph, IsolationLevel::Serializable).map(|verdict| verdict.holds())
}

/// `true` iff every cycle has two adjacent `rw` edges.
///
/// # Errors
///
/// See [`check`].
pub fn check_si<T>(graph: &DependencyGraph<T>) -> Result<bool, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check(graph, IsolationLevel::SnapshotIsolation).map(|verdict| verdict.holds())
}

/// `true` iff every cycle has at least two `rw` edges.
///
/// # Errors
///
/// See [`check`].
pub fn check_psi<T>(graph: &DependencyGraph<T>) -> Result<bool, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check(graph, IsolationLevel::ParallelSnapshotIsolation).map(|verdict| verdict.holds())
}

/// `true` iff no cycle uses only `ww` and `wr` edges.
///
/// # Errors
///
/// See [`check`].
pub fn check_pl2<T>(graph: &DependencyGraph<T>) -> Result<bool, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check(graph, IsolationLevel::Pl2).map(|verdict| verdict.holds())
}

/// `true` iff no cycle uses only `ww` edges.
///
/// # Errors
///
/// See [`check`].
pub fn check_pl1<T>(graph: &DependencyGraph<T>) -> Result<bool, Error<T>>
where
    T: Hash + Eq + Clone + Debug,
{
    check(graph, IsolationLevel::Pl1).map(|verdict| verdict.holds())
}
