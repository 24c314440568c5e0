//! Isolation-anomaly detection over transaction dependency graphs.
//!
//! `isocheck_core` decides whether a recorded dependency graph -- vertices are
//! transactions, edges are labelled `ww` (write-write), `wr` (write-read) or
//! `rw` (read-write anti-dependency) -- is admitted by a given isolation level.
//! Each level is characterised by the cycle shapes it forbids:
//!
//! 1. **PL-1** -- no cycle made only of `ww` edges.
//! 2. **PL-2** -- no cycle made only of `ww` and `wr` edges.
//! 3. **Parallel Snapshot Isolation** -- every cycle carries at least two `rw`
//!    edges.
//! 4. **Snapshot Isolation** -- every cycle carries two *adjacent* `rw` edges.
//! 5. **Serializability** -- no cycle at all.
//!
//! # Pipeline
//!
//! ```text
//! records -> DependencyGraph -> partition (Tarjan SCC, trivial components pruned)
//!     -> per component: find_cycle (existence) | CycleEnumerator (exhaustive)
//!     -> IsolationLevel::admits -> Verdict
//! ```
//!
//! The SCC pre-partition confines the exponential part of the work (cycle
//! enumeration) to each non-trivial component independently.
//!
//! # Entry point
//!
//! [`check()`] takes a frozen [`DependencyGraph`] and an [`IsolationLevel`] and
//! returns a [`Verdict`]: either [`Verdict::Holds`] or
//! [`Verdict::Violated`] with the offending cycle.
//!
//! ```rust,ignore
//! use isocheck_core::{check, DependencyGraph, DependencyLabel, IsolationLevel};
//!
//! let mut graph = DependencyGraph::default();
//! graph.add_vertex("t1")?;
//! graph.add_vertex("t2")?;
//! graph.add_edge(&"t1", &"t2", DependencyLabel::ReadWrite)?;
//! graph.add_edge(&"t2", &"t1", DependencyLabel::ReadWrite)?;
//!
//! assert!(check(&graph, IsolationLevel::SnapshotIsolation)?.holds());
//! assert!(!check(&graph, IsolationLevel::Serializable)?.holds());
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on labels,
//!   import records, verdicts and errors.
//! - **`schemars`** -- enables `JsonSchema` derives on the import records.
//!
//! This crate is `no_std` compatible (requires `alloc`).

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod graph;
pub mod isolation;

pub use graph::dependency::DependencyGraph;
pub use graph::label::{DependencyLabel, LabelSet};
pub use graph::records::load_graph;
pub use isolation::{
    check, check_pl1, check_pl2, check_psi, check_serializability, check_si, check_with,
    IsolationLevel, Verdict,
};
