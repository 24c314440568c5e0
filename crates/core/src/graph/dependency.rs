use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::graph::error::MalformedGraph;
use crate::graph::label::{DependencyLabel, LabelSet};

/// Dense position of a vertex in its [`DependencyGraph`], assigned in
/// insertion order.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexIndex(pub usize);

impl VertexIndex {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An outgoing labelled edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub target: VertexIndex,
    pub label: DependencyLabel,
}

/// Per-label edge totals.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LabelCounts {
    pub ww: usize,
    pub wr: usize,
    pub rw: usize,
}

/// Directed labelled multigraph of transactions.
///
/// Vertices are kept in insertion order and every edge endpoint must already
/// be a vertex. Edges between the same pair with different labels are
/// distinct; re-adding an existing `(source, target, label)` triple is a
/// no-op. A duplicate vertex id is rejected.
///
/// Once built, the graph is only read: checks borrow it immutably, so one
/// graph can be shared across threads checking different levels.
#[derive(Debug, Clone)]
pub struct DependencyGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    vertices: Vec<T>,
    index: HashMap<T, VertexIndex>,
    adjacency: Vec<Vec<Edge>>,
    edge_set: HashSet<(VertexIndex, Edge)>,
}

impl<T> Default for DependencyGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edge_set: HashSet::new(),
        }
    }
}

impl<T> DependencyGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Adds a vertex and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGraph::DuplicateVertex`] if `vertex` is already present.
    pub fn add_vertex(&mut self, vertex: T) -> Result<VertexIndex, MalformedGraph<T>> {
        if self.index.contains_key(&vertex) {
            return Err(MalformedGraph::DuplicateVertex { vertex });
        }
        let idx = VertexIndex(self.vertices.len());
        self.index.insert(vertex.clone(), idx);
        self.vertices.push(vertex);
        self.adjacency.push(Vec::new());
        Ok(idx)
    }

    /// Adds the edge `source --label--> target`.
    ///
    /// Returns `false` if the same labelled edge was already present.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGraph::DanglingEdge`] if either endpoint is unknown.
    pub fn add_edge(
        &mut self,
        source: &T,
        target: &T,
        label: DependencyLabel,
    ) -> Result<bool, MalformedGraph<T>> {
        let dangling = |missing: &T| MalformedGraph::DanglingEdge {
            source: source.clone(),
            target: target.clone(),
            label,
            missing: missing.clone(),
        };
        let src = *self.index.get(source).ok_or_else(|| dangling(source))?;
        let dst = *self.index.get(target).ok_or_else(|| dangling(target))?;
        let edge = Edge { target: dst, label };
        if !self.edge_set.insert((src, edge)) {
            return Ok(false);
        }
        self.adjacency[src.0].push(edge);
        Ok(true)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct labelled edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.index.contains_key(vertex)
    }

    #[must_use]
    pub fn index_of(&self, vertex: &T) -> Option<VertexIndex> {
        self.index.get(vertex).copied()
    }

    #[must_use]
    pub fn vertex(&self, idx: VertexIndex) -> Option<&T> {
        self.vertices.get(idx.0)
    }

    /// Vertex ids in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> {
        self.vertices.iter()
    }

    pub fn indices(&self) -> impl Iterator<Item = VertexIndex> {
        (0..self.vertices.len()).map(VertexIndex)
    }

    /// Outgoing edges of `idx` in insertion order, unfiltered.
    #[must_use]
    pub fn out_edges(&self, idx: VertexIndex) -> &[Edge] {
        self.adjacency.get(idx.0).map_or(&[][..], Vec::as_slice)
    }

    /// Outgoing `(target, label)` pairs of `vertex` whose label is in `labels`,
    /// in insertion order. An empty `labels` set admits every label; an
    /// unknown vertex has no neighbors.
    pub fn neighbors<'a>(
        &'a self,
        vertex: &T,
        labels: LabelSet,
    ) -> impl Iterator<Item = (&'a T, DependencyLabel)> + 'a {
        let edges = self
            .index
            .get(vertex)
            .map_or(&[][..], |&idx| self.out_edges(idx));
        edges
            .iter()
            .filter(move |edge| labels.contains(edge.label))
            .map(move |edge| (&self.vertices[edge.target.0], edge.label))
    }

    /// Every edge as `(source, target, label)`, grouped by source.
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T, DependencyLabel)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(move |(src, edges)| {
                edges.iter().map(move |edge| {
                    (
                        &self.vertices[src],
                        &self.vertices[edge.target.0],
                        edge.label,
                    )
                })
            })
    }

    #[must_use]
    pub fn has_edge(&self, source: &T, target: &T, label: DependencyLabel) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&src), Some(&dst)) => self
                .edge_set
                .contains(&(src, Edge { target: dst, label })),
            _ => false,
        }
    }

    /// Returns `true` if `idx` has an edge to itself with a label in `labels`.
    #[must_use]
    pub fn has_self_loop(&self, idx: VertexIndex, labels: LabelSet) -> bool {
        self.out_edges(idx)
            .iter()
            .any(|edge| edge.target == idx && labels.contains(edge.label))
    }

    #[must_use]
    pub fn label_counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for edges in &self.adjacency {
            for edge in edges {
                match edge.label {
                    DependencyLabel::WriteWrite => counts.ww += 1,
                    DependencyLabel::WriteRead => counts.wr += 1,
                    DependencyLabel::ReadWrite => counts.rw += 1,
                }
            }
        }
        counts
    }

    /// Resolves an index produced by this graph.
    pub(crate) fn id(&self, idx: VertexIndex) -> &T {
        &self.vertices[idx.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::label::DependencyLabel::{ReadWrite, WriteRead, WriteWrite};

    fn triangle() -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::default();
        for v in ["a", "b", "c"] {
            graph.add_vertex(v).unwrap();
        }
        graph.add_edge(&"a", &"b", WriteWrite).unwrap();
        graph.add_edge(&"b", &"c", WriteRead).unwrap();
        graph.add_edge(&"c", &"a", ReadWrite).unwrap();
        graph
    }

    #[test]
    fn test_counts() {
        let graph = triangle();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.label_counts(),
            LabelCounts {
                ww: 1,
                wr: 1,
                rw: 1
            }
        );
    }

    #[test]
    fn test_duplicate_vertex() {
        let mut graph = triangle();
        assert_eq!(
            graph.add_vertex("b"),
            Err(MalformedGraph::DuplicateVertex { vertex: "b" })
        );
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn test_dangling_edge() {
        let mut graph = triangle();
        assert_eq!(
            graph.add_edge(&"a", &"z", WriteWrite),
            Err(MalformedGraph::DanglingEdge {
                source: "a",
                target: "z",
                label: WriteWrite,
                missing: "z",
            })
        );
        assert!(matches!(
            graph.add_edge(&"y", &"a", WriteWrite),
            Err(MalformedGraph::DanglingEdge { missing: "y", .. })
        ));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_same_label_edge_is_deduplicated() {
        let mut graph = triangle();
        assert_eq!(graph.add_edge(&"a", &"b", WriteWrite), Ok(false));
        assert_eq!(graph.edge_count(), 3);

        assert_eq!(graph.add_edge(&"a", &"b", ReadWrite), Ok(true));
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_edge(&"a", &"b", WriteWrite));
        assert!(graph.has_edge(&"a", &"b", ReadWrite));
        assert!(!graph.has_edge(&"a", &"b", WriteRead));
    }

    #[test]
    fn test_neighbors_filter() {
        let mut graph = triangle();
        graph.add_edge(&"a", &"c", WriteRead).unwrap();
        graph.add_edge(&"a", &"b", ReadWrite).unwrap();

        let all: Vec<_> = graph.neighbors(&"a", LabelSet::ALL).collect();
        assert_eq!(
            all,
            vec![(&"b", WriteWrite), (&"c", WriteRead), (&"b", ReadWrite)]
        );

        let unfiltered: Vec<_> = graph.neighbors(&"a", LabelSet::EMPTY).collect();
        assert_eq!(unfiltered, all);

        let ww: Vec<_> = graph.neighbors(&"a", LabelSet::WRITE_WRITE).collect();
        assert_eq!(ww, vec![(&"b", WriteWrite)]);

        assert_eq!(graph.neighbors(&"missing", LabelSet::ALL).count(), 0);
    }

    #[test]
    fn test_self_loop() {
        let mut graph = triangle();
        graph.add_edge(&"b", &"b", ReadWrite).unwrap();
        let b = graph.index_of(&"b").unwrap();
        assert!(graph.has_self_loop(b, LabelSet::ALL));
        assert!(!graph.has_self_loop(b, LabelSet::WRITE_DEPENDENCIES));
    }

    #[test]
    fn test_edges_in_insertion_order() {
        let graph = triangle();
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(
            edges,
            vec![
                (&"a", &"b", WriteWrite),
                (&"b", &"c", WriteRead),
                (&"c", &"a", ReadWrite),
            ]
        );
    }
}
