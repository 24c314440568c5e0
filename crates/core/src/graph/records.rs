//! Import records and the `LoadGraph` boundary.
//!
//! The record shapes follow the document-store export the dependency graphs
//! are recorded in: vertices carry an `_id`, edges carry `_from`, `_to` and a
//! `type` label. Any other key in the input (`_key`, `_rev`, event ids, ...)
//! is ignored.

use alloc::string::String;
use alloc::vec::Vec;

use crate::graph::dependency::DependencyGraph;
use crate::graph::error::MalformedGraph;
use crate::graph::label::DependencyLabel;

/// One transaction.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexRecord {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: String,
}

/// One labelled dependency between two transactions.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    #[cfg_attr(feature = "serde", serde(rename = "_from"))]
    pub from: String,
    #[cfg_attr(feature = "serde", serde(rename = "_to"))]
    pub to: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub label: DependencyLabel,
}

impl VertexRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl EdgeRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: DependencyLabel) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label,
        }
    }
}

/// Vertex and edge records of one recorded execution.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDocument {
    #[cfg_attr(feature = "serde", serde(default))]
    pub vertices: Vec<VertexRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// Builds the graph described by the document.
    ///
    /// # Errors
    ///
    /// See [`load_graph`].
    pub fn to_graph(&self) -> Result<DependencyGraph<String>, MalformedGraph<String>> {
        load_graph(self.vertices.iter().cloned(), self.edges.iter().cloned())
    }

    /// Exports `graph` as records, vertices and edges in insertion order.
    #[must_use]
    pub fn from_graph(graph: &DependencyGraph<String>) -> Self {
        Self {
            vertices: graph.vertices().cloned().map(VertexRecord::new).collect(),
            edges: graph
                .edges()
                .map(|(from, to, label)| EdgeRecord::new(from.clone(), to.clone(), label))
                .collect(),
        }
    }
}

/// Builds a frozen [`DependencyGraph`] from vertex and edge records.
///
/// All vertices are added first, in order, then all edges. Repeated
/// same-label edges collapse into one.
///
/// # Errors
///
/// Returns [`MalformedGraph::DuplicateVertex`] for a repeated vertex id and
/// [`MalformedGraph::DanglingEdge`] for an edge whose endpoint is not a
/// vertex.
pub fn load_graph<V, E>(
    vertices: V,
    edges: E,
) -> Result<DependencyGraph<String>, MalformedGraph<String>>
where
    V: IntoIterator<Item = VertexRecord>,
    E: IntoIterator<Item = EdgeRecord>,
{
    let mut graph = DependencyGraph::default();
    for vertex in vertices {
        graph.add_vertex(vertex.id)?;
    }
    let mut duplicates = 0usize;
    for edge in edges {
        if !graph.add_edge(&edge.from, &edge.to, edge.label)? {
            duplicates += 1;
        }
    }
    tracing::debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        duplicates,
        "loaded dependency graph"
    );
    Ok(graph)
}
