use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::graph::dependency::{DependencyGraph, Edge, VertexIndex};
use crate::graph::label::LabelSet;
use crate::graph::scc::Component;

/// A read-only projection of a [`DependencyGraph`] onto a vertex subset and a
/// label filter.
///
/// An edge is visible through the view iff its label is in the filter and its
/// target is a member. Members are kept sorted by index, and per-vertex
/// scratch state of a search is indexed by [`SubgraphView::position`], so a
/// view over one component costs memory in the component's size only.
#[derive(Debug, Clone)]
pub struct SubgraphView<'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    graph: &'g DependencyGraph<T>,
    members: Vec<VertexIndex>,
    // members == every index of the graph
    whole: bool,
    labels: LabelSet,
}

impl<'g, T> SubgraphView<'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Every vertex of `graph`, edges restricted to `labels`.
    #[must_use]
    pub fn whole(graph: &'g DependencyGraph<T>, labels: LabelSet) -> Self {
        Self {
            graph,
            members: graph.indices().collect(),
            whole: true,
            labels: labels.normalized(),
        }
    }

    /// The given vertices of `graph`, edges restricted to `labels`.
    ///
    /// Indices that do not belong to `graph` are ignored.
    pub fn restricted<I>(graph: &'g DependencyGraph<T>, members: I, labels: LabelSet) -> Self
    where
        I: IntoIterator<Item = VertexIndex>,
    {
        let n = graph.vertex_count();
        let mut members: Vec<VertexIndex> =
            members.into_iter().filter(|idx| idx.0 < n).collect();
        members.sort_unstable();
        members.dedup();
        Self {
            graph,
            whole: members.len() == n,
            members,
            labels: labels.normalized(),
        }
    }

    #[must_use]
    pub fn of_component(
        graph: &'g DependencyGraph<T>,
        component: &Component,
        labels: LabelSet,
    ) -> Self {
        Self::restricted(graph, component.members().iter().copied(), labels)
    }

    #[must_use]
    pub const fn graph(&self) -> &'g DependencyGraph<T> {
        self.graph
    }

    #[must_use]
    pub fn members(&self) -> &[VertexIndex] {
        &self.members
    }

    #[must_use]
    pub const fn labels(&self) -> LabelSet {
        self.labels
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of `idx` among the members, in `0..self.len()`.
    #[must_use]
    pub fn position(&self, idx: VertexIndex) -> Option<usize> {
        if self.whole {
            (idx.0 < self.members.len()).then_some(idx.0)
        } else {
            self.members.binary_search(&idx).ok()
        }
    }

    #[must_use]
    pub fn contains(&self, idx: VertexIndex) -> bool {
        self.position(idx).is_some()
    }

    /// Whether an outgoing edge of a member is visible through the view.
    #[must_use]
    pub fn admits(&self, edge: &Edge) -> bool {
        self.labels.contains(edge.label) && self.contains(edge.target)
    }

    /// Visible outgoing edges of `idx`.
    pub fn successors(&self, idx: VertexIndex) -> impl Iterator<Item = &Edge> + '_ {
        let edges: &[Edge] = if self.contains(idx) {
            self.graph.out_edges(idx)
        } else {
            &[]
        };
        edges.iter().filter(move |edge| self.admits(edge))
    }
}
