//! Strongly connected components of a dependency graph.
//!
//! A cycle never leaves the strongly connected component it starts in, so the
//! checkers first split the graph into components and only search for cycles
//! inside the non-trivial ones: components with at least two vertices, or a
//! single vertex with a self-loop. On dependency graphs recorded from real
//! executions most components are trivial, which keeps the exponential cycle
//! enumeration confined to small subgraphs.
//!
//! # Algorithm
//!
//! Tarjan's algorithm, run with an explicit call stack so that long
//! dependency chains cannot overflow the native stack:
//!
//! 1. Visit members in ascending index order; every unvisited member roots a
//!    new depth-first search.
//! 2. Each visited vertex gets a discovery index and a low-link, and is pushed
//!    on the component stack.
//! 3. Successors are explored one edge at a time. A back edge to a vertex still
//!    on the component stack lowers the current low-link.
//! 4. When a vertex finishes with `low_link == index`, everything above it on
//!    the component stack forms one component.
//!
//! Runs in O(V + E) over the edges visible through the view. The output
//! order is made independent of the discovery order by sorting members
//! within each component and components by their minimum member.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::graph::dependency::{DependencyGraph, VertexIndex};
use crate::graph::error::InvariantViolation;
use crate::graph::label::LabelSet;
use crate::graph::subgraph::SubgraphView;

/// A strongly connected component, members sorted by index.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    members: Vec<VertexIndex>,
    self_loop: bool,
}

impl Component {
    #[must_use]
    pub fn members(&self) -> &[VertexIndex] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The smallest member, used as the component's anchor.
    #[must_use]
    pub fn min_vertex(&self) -> Option<VertexIndex> {
        self.members.first().copied()
    }

    /// A single vertex without an admitted self-loop. Such a component holds
    /// no cycle.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.members.len() < 2 && !self.self_loop
    }
}

/// The non-trivial components of a graph under a label filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Non-trivial components, ordered by minimum member.
    pub components: Vec<Component>,
    /// Number of trivial components dropped.
    pub pruned: usize,
}

const UNVISITED: usize = usize::MAX;

/// Computes every strongly connected component of `view`.
///
/// Components are ordered by their minimum member and each component's
/// members are sorted.
#[must_use]
pub fn strongly_connected_components<T>(view: &SubgraphView<'_, T>) -> Vec<Component>
where
    T: Hash + Eq + Clone + Debug,
{
    let graph = view.graph();
    let members = view.members();
    let n = members.len();

    // all per-vertex state is indexed by member position in the view
    let mut index = vec![UNVISITED; n];
    let mut low_link = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    // (vertex, position of the next outgoing edge to examine)
    let mut call_stack: Vec<(usize, usize)> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        low_link[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call_stack.push((root, 0));

        while let Some(&(v, cursor)) = call_stack.last() {
            let edges = graph.out_edges(members[v]);
            let mut cursor = cursor;
            let mut child = None;

            while cursor < edges.len() {
                let edge = edges[cursor];
                cursor += 1;
                if !view.labels().contains(edge.label) {
                    continue;
                }
                let Some(w) = view.position(edge.target) else {
                    continue;
                };
                if index[w] == UNVISITED {
                    child = Some(w);
                    break;
                }
                if on_stack[w] {
                    low_link[v] = low_link[v].min(index[w]);
                }
            }

            if let Some(top) = call_stack.last_mut() {
                top.1 = cursor;
            }

            if let Some(w) = child {
                index[w] = next_index;
                low_link[w] = next_index;
                next_index += 1;
                stack.push(w);
                on_stack[w] = true;
                call_stack.push((w, 0));
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                low_link[parent] = low_link[parent].min(low_link[v]);
            }

            if low_link[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(members[w]);
                    if w == v {
                        break;
                    }
                }
                component.sort_unstable();
                let self_loop =
                    component.len() == 1 && graph.has_self_loop(members[v], view.labels());
                components.push(Component {
                    members: component,
                    self_loop,
                });
            }
        }
    }

    components.sort_unstable_by_key(Component::min_vertex);
    components
}

/// Partitions the whole graph under `labels` and drops trivial components.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] if the computed components do not cover
/// every vertex exactly once.
pub fn partition<T>(
    graph: &DependencyGraph<T>,
    labels: LabelSet,
) -> Result<Partition, InvariantViolation>
where
    T: Hash + Eq + Clone + Debug,
{
    let view = SubgraphView::whole(graph, labels);
    let all = strongly_connected_components(&view);

    let mut seen = vec![false; graph.vertex_count()];
    let mut covered = 0usize;
    for member in all.iter().flat_map(Component::members) {
        if core::mem::replace(&mut seen[member.0], true) {
            return Err(InvariantViolation::OverlappingPartition { vertex: member.0 });
        }
        covered += 1;
    }
    if covered != graph.vertex_count() {
        return Err(InvariantViolation::IncompletePartition {
            vertices: graph.vertex_count(),
            covered,
        });
    }

    let total = all.len();
    let components: Vec<Component> = all.into_iter().filter(|c| !c.is_trivial()).collect();
    let pruned = total - components.len();

    tracing::debug!(
        vertices = graph.vertex_count(),
        %labels,
        components = components.len(),
        pruned,
        "scc partition"
    );

    Ok(Partition { components, pruned })
}
