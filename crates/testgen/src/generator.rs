use std::collections::HashSet;

use chrono::{DateTime, Duration, Local};
use isocheck_core::graph::records::{EdgeRecord, GraphDocument, VertexRecord};
use isocheck_core::DependencyLabel;
use rand::distr::{Distribution, Uniform};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Deserialize, Serialize, TypedBuilder)]
pub struct GraphParams {
    #[builder(default)]
    pub id: u64,
    pub n_vertex: u64,
    pub n_edge: u64,
    #[builder(default = 1)]
    pub ww_weight: u32,
    #[builder(default = 1)]
    pub wr_weight: u32,
    #[builder(default = 1)]
    pub rw_weight: u32,
}

impl GraphParams {
    /// Relative label weights in [`DependencyLabel::ALL`] order. All-zero
    /// weights fall back to a uniform choice.
    #[must_use]
    pub const fn weights(&self) -> [u32; 3] {
        if self.ww_weight == 0 && self.wr_weight == 0 && self.rw_weight == 0 {
            [1, 1, 1]
        } else {
            [self.ww_weight, self.wr_weight, self.rw_weight]
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GeneratedGraph {
    params: GraphParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    data: GraphDocument,
}

impl GeneratedGraph {
    #[must_use]
    pub const fn new(
        params: GraphParams,
        info: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
        data: GraphDocument,
    ) -> Self {
        Self {
            params,
            info,
            start,
            end,
            data,
        }
    }

    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub const fn get_data(&self) -> &GraphDocument {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> GraphDocument {
        self.data
    }

    #[must_use]
    pub const fn get_params(&self) -> &GraphParams {
        &self.params
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Vertex id of the `i`-th generated transaction.
#[must_use]
pub fn vertex_id(i: u64) -> String {
    format!("t{i}")
}

/// Generate a graph with `n_vertex` transactions and up to `n_edge` distinct
/// labelled edges.
///
/// Endpoints are drawn uniformly and never coincide, so the graph has no
/// self-loops. Labels are drawn according to [`GraphParams::weights`]; a label
/// with weight zero never appears. When `n_edge` exceeds the number of
/// distinct edges the weights allow, every such edge is emitted.
#[must_use]
pub fn generate_single_graph(params: &GraphParams) -> GraphDocument {
    let vertices: Vec<VertexRecord> = (0..params.n_vertex)
        .map(|i| VertexRecord::new(vertex_id(i)))
        .collect();

    let weights = params.weights();
    let enabled = weights.iter().filter(|&&w| w > 0).count() as u64;
    let capacity = params
        .n_vertex
        .saturating_mul(params.n_vertex.saturating_sub(1))
        .saturating_mul(enabled);
    let target = params.n_edge.min(capacity);

    let (Ok(vertex_range), Ok(label_range)) = (
        Uniform::new(0, params.n_vertex),
        Uniform::new(0, weights.iter().sum::<u32>()),
    ) else {
        return GraphDocument {
            vertices,
            edges: Vec::new(),
        };
    };

    let mut random_generator = rand::rng();
    let mut seen: HashSet<(u64, u64, DependencyLabel)> = HashSet::new();
    let mut edges = Vec::new();

    while (edges.len() as u64) < target {
        let from = vertex_range.sample(&mut random_generator);
        let to = vertex_range.sample(&mut random_generator);
        if from == to {
            continue;
        }
        let label = pick_label(weights, label_range.sample(&mut random_generator));
        if seen.insert((from, to, label)) {
            edges.push(EdgeRecord::new(vertex_id(from), vertex_id(to), label));
        }
    }

    GraphDocument { vertices, edges }
}

/// Maps `roll` in `0..sum(weights)` to the label whose weight interval
/// contains it.
fn pick_label(weights: [u32; 3], mut roll: u32) -> DependencyLabel {
    for (label, weight) in DependencyLabel::ALL.into_iter().zip(weights) {
        if roll < weight {
            return label;
        }
        roll -= weight;
    }
    DependencyLabel::ReadWrite
}

#[must_use]
pub fn generate_mult_graphs(n_graph: u64, params: &GraphParams) -> Vec<GeneratedGraph> {
    (0..n_graph)
        .into_par_iter()
        .map(|i_graph| {
            let start_time = Local::now();
            let graph = generate_single_graph(params);
            let end_time = Local::now();
            GeneratedGraph {
                params: GraphParams {
                    id: i_graph,
                    ..params.clone()
                },
                info: "generated".to_string(),
                start: start_time,
                end: end_time,
                data: graph,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_graph_loads() {
        let params = GraphParams::builder().n_vertex(20).n_edge(60).build();
        let document = generate_single_graph(&params);
        assert_eq!(document.vertices.len(), 20);
        assert_eq!(document.edges.len(), 60);

        let graph = document.to_graph().unwrap();
        assert_eq!(graph.edge_count(), 60);
        assert!(document.edges.iter().all(|edge| edge.from != edge.to));
    }

    #[test]
    fn test_zero_weight_label_never_appears() {
        let params = GraphParams::builder()
            .n_vertex(10)
            .n_edge(50)
            .rw_weight(0)
            .build();
        let document = generate_single_graph(&params);
        assert!(document
            .edges
            .iter()
            .all(|edge| edge.label != DependencyLabel::ReadWrite));
    }

    #[test]
    fn test_edge_count_is_capped() {
        let params = GraphParams::builder()
            .n_vertex(3)
            .n_edge(1_000)
            .ww_weight(1)
            .wr_weight(0)
            .rw_weight(0)
            .build();
        // 3 * 2 ordered pairs, one label
        assert_eq!(generate_single_graph(&params).edges.len(), 6);
    }

    #[test]
    fn test_degenerate_sizes() {
        for n_vertex in [0, 1] {
            let params = GraphParams::builder().n_vertex(n_vertex).n_edge(10).build();
            let document = generate_single_graph(&params);
            assert_eq!(document.vertices.len() as u64, n_vertex);
            assert!(document.edges.is_empty());
        }
    }

    #[test]
    fn test_mult_graphs_are_numbered() {
        let params = GraphParams::builder().n_vertex(5).n_edge(8).build();
        let graphs = generate_mult_graphs(4, &params);
        let mut ids: Vec<u64> = graphs.iter().map(GeneratedGraph::get_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(graphs.iter().all(|g| g.get_params().n_edge == 8));
    }

    #[test]
    fn test_pick_label() {
        let weights = [2, 0, 1];
        assert_eq!(pick_label(weights, 0), DependencyLabel::WriteWrite);
        assert_eq!(pick_label(weights, 1), DependencyLabel::WriteWrite);
        assert_eq!(pick_label(weights, 2), DependencyLabel::ReadWrite);
    }
}
