//! Per-cycle anomaly predicates.
//!
//! Each isolation level is characterised by the cycles it admits. The
//! predicates here look only at a cycle's label sequence, read circularly:
//! the closing edge is adjacent to the first one.
//!
//! | Level | Admitted cycles |
//! |---|---|
//! | Serializable | none |
//! | Snapshot Isolation | two adjacent `rw` edges |
//! | Parallel Snapshot Isolation | at least two `rw` edges |
//! | PL-2 | at least one `rw` edge |
//! | PL-1 | at least one non-`ww` edge |
//!
//! PL-2 and PL-1 are checked on the graph projected to `{ww, wr}` and `{ww}`,
//! where every remaining cycle is a violation; the predicates above give the
//! same answer on unprojected cycles.

use crate::graph::label::{DependencyLabel, LabelSet};
use crate::isolation::IsolationLevel;

/// `true` if two consecutive edges, wrapping from the last to the first, are
/// both `rw`. A single edge is never adjacent to itself.
///
/// Without the length guard, `(i + 1) % n` pairs a lone `rw` self-loop with
/// itself. A self-loop has no adjacent pair, so SI rejects it.
#[must_use]
pub fn has_adjacent_anti_dependencies(labels: &[DependencyLabel]) -> bool {
    let n = labels.len();
    n >= 2
        && (0..n).any(|i| labels[i].is_anti_dependency() && labels[(i + 1) % n].is_anti_dependency())
}

#[must_use]
pub fn anti_dependency_count(labels: &[DependencyLabel]) -> usize {
    labels.iter().filter(|label| label.is_anti_dependency()).count()
}

fn leaves(labels: &[DependencyLabel], allowed: LabelSet) -> bool {
    labels.iter().any(|label| !allowed.contains(*label))
}

/// Whether a cycle with these labels is allowed under `level`.
#[must_use]
pub fn admits(level: IsolationLevel, labels: &[DependencyLabel]) -> bool {
    match level {
        IsolationLevel::Serializable => false,
        IsolationLevel::SnapshotIsolation => has_adjacent_anti_dependencies(labels),
        IsolationLevel::ParallelSnapshotIsolation => anti_dependency_count(labels) >= 2,
        IsolationLevel::Pl2 => leaves(labels, LabelSet::WRITE_DEPENDENCIES),
        IsolationLevel::Pl1 => leaves(labels, LabelSet::WRITE_WRITE),
    }
}
