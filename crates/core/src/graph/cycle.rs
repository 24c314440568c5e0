//! Elementary cycles inside a subgraph view.
//!
//! Two search policies share the [`Cycle`] type:
//!
//! - [`find_cycle`] answers "is there at least one cycle" with a
//!   breadth-first search and returns the shortest cycle through the smallest
//!   member it can close a cycle on. Linear in the size of the view.
//! - [`CycleEnumerator`] lists every elementary cycle. It is a backtracking
//!   depth-first search over an explicit stack, anchored in turn at each
//!   member in ascending index order. From anchor `s` it only steps onto
//!   members with a larger index than `s`, so each cycle is reported exactly
//!   once, rotated to start at its smallest vertex. Parallel edges with
//!   different labels give distinct cycles.
//!
//! Enumeration is exponential in the worst case. A [`Budget`] bounds the
//! number of edge expansions and carries an optional [`CancellationToken`];
//! running out ends the enumeration with an [`Exhaustion`].

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use core::sync::atomic::{AtomicBool, Ordering};

use typed_builder::TypedBuilder;

use crate::graph::dependency::{DependencyGraph, VertexIndex};
use crate::graph::error::Exhaustion;
use crate::graph::label::DependencyLabel;
use crate::graph::subgraph::SubgraphView;

/// An elementary cycle: `vertices[i] --labels[i]--> vertices[(i + 1) % len]`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    vertices: Vec<VertexIndex>,
    labels: Vec<DependencyLabel>,
}

impl Cycle {
    #[must_use]
    pub fn vertices(&self) -> &[VertexIndex] {
        &self.vertices
    }

    /// Labels in walk order, the closing edge last.
    #[must_use]
    pub fn labels(&self) -> &[DependencyLabel] {
        &self.labels
    }

    /// Number of edges. A self-loop has length 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn anchor(&self) -> Option<VertexIndex> {
        self.vertices.first().copied()
    }

    /// Edges as `(source, label, target)`, the closing edge last.
    pub fn edges(&self) -> impl Iterator<Item = (VertexIndex, DependencyLabel, VertexIndex)> + '_ {
        let n = self.vertices.len();
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, &label)| (self.vertices[i], label, self.vertices[(i + 1) % n]))
    }

    /// Vertex ids of the cycle in `graph`.
    pub fn ids<'a, 'g: 'a, T>(
        &'a self,
        graph: &'g DependencyGraph<T>,
    ) -> impl Iterator<Item = &'g T> + 'a
    where
        T: Hash + Eq + Clone + Debug,
    {
        self.vertices.iter().filter_map(move |&v| graph.vertex(v))
    }
}

/// How much of the cycle space a check has to see.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnumerationPolicy {
    /// Stop at the first cycle; its presence is the anomaly.
    ExistenceOnly,
    /// Visit every elementary cycle; each one is judged on its own.
    Exhaustive,
}

/// Shared flag that stops a running enumeration at its next edge expansion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Resource bounds for one component's enumeration. The default is unbounded.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct Budget {
    /// Maximum number of edge expansions per component.
    #[builder(default, setter(strip_option))]
    pub max_steps: Option<u64>,
    #[builder(default, setter(strip_option))]
    pub cancellation: Option<CancellationToken>,
}

impl Budget {
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Lazy, exhaustive enumeration of the elementary cycles of a view.
///
/// Yields `Ok(cycle)` for every cycle and, if the budget runs out, one final
/// `Err(exhaustion)` after which it is fused.
#[derive(Debug)]
pub struct CycleEnumerator<'v, 'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    view: &'v SubgraphView<'g, T>,
    budget: Budget,
    steps: u64,
    next_start: usize,
    path: Vec<VertexIndex>,
    labels: Vec<DependencyLabel>,
    // per path position: next outgoing edge to try
    cursors: Vec<usize>,
    // indexed by member position in the view
    on_path: Vec<bool>,
    done: bool,
}

impl<'v, 'g, T> CycleEnumerator<'v, 'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    #[must_use]
    pub fn new(view: &'v SubgraphView<'g, T>, budget: &Budget) -> Self {
        Self {
            view,
            budget: budget.clone(),
            steps: 0,
            next_start: 0,
            path: Vec::new(),
            labels: Vec::new(),
            cursors: Vec::new(),
            on_path: vec![false; view.len()],
            done: false,
        }
    }

    /// Edge expansions performed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    fn charge(&mut self) -> Result<(), Exhaustion> {
        self.steps += 1;
        if let Some(limit) = self.budget.max_steps {
            if self.steps > limit {
                return Err(Exhaustion::StepLimit { limit });
            }
        }
        if self
            .budget
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(Exhaustion::Cancelled);
        }
        Ok(())
    }

    fn push(&mut self, v: VertexIndex) {
        self.path.push(v);
        self.cursors.push(0);
        self.mark(v, true);
    }

    fn mark(&mut self, v: VertexIndex, on_path: bool) {
        if let Some(position) = self.view.position(v) {
            self.on_path[position] = on_path;
        }
    }

    fn is_on_path(&self, v: VertexIndex) -> bool {
        self.view
            .position(v)
            .is_some_and(|position| self.on_path[position])
    }
}

impl<T> Iterator for CycleEnumerator<'_, '_, T>
where
    T: Hash + Eq + Clone + Debug,
{
    type Item = Result<Cycle, Exhaustion>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let view = self.view;
        let graph = view.graph();

        'search: loop {
            let Some(&v) = self.path.last() else {
                let Some(&start) = view.members().get(self.next_start) else {
                    self.done = true;
                    return None;
                };
                self.push(start);
                continue;
            };
            let start = self.path[0];
            let depth = self.path.len() - 1;
            let edges = graph.out_edges(v);
            let mut cursor = self.cursors[depth];

            while cursor < edges.len() {
                let edge = edges[cursor];
                cursor += 1;
                if !view.admits(&edge) {
                    continue;
                }
                if let Err(reason) = self.charge() {
                    self.done = true;
                    return Some(Err(reason));
                }
                if edge.target == start {
                    self.cursors[depth] = cursor;
                    let mut labels = self.labels.clone();
                    labels.push(edge.label);
                    tracing::trace!(
                        anchor = start.0,
                        length = labels.len(),
                        steps = self.steps,
                        "cycle"
                    );
                    return Some(Ok(Cycle {
                        vertices: self.path.clone(),
                        labels,
                    }));
                }
                if edge.target < start || self.is_on_path(edge.target) {
                    continue;
                }
                self.cursors[depth] = cursor;
                self.labels.push(edge.label);
                self.push(edge.target);
                continue 'search;
            }

            // every edge of `v` explored: backtrack
            self.path.pop();
            self.cursors.pop();
            self.mark(v, false);
            if depth == 0 {
                self.next_start += 1;
            } else {
                self.labels.pop();
            }
        }
    }
}

impl<T> core::iter::FusedIterator for CycleEnumerator<'_, '_, T> where
    T: Hash + Eq + Clone + Debug
{
}

/// Shortest cycle through `anchor` within `view`, if any.
#[must_use]
pub fn find_cycle_through<T>(view: &SubgraphView<'_, T>, anchor: VertexIndex) -> Option<Cycle>
where
    T: Hash + Eq + Clone + Debug,
{
    if !view.contains(anchor) {
        return None;
    }
    if let Some(edge) = view.successors(anchor).find(|edge| edge.target == anchor) {
        return Some(Cycle {
            vertices: vec![anchor],
            labels: vec![edge.label],
        });
    }

    // indexed by member position in the view
    let mut parent: Vec<Option<(VertexIndex, DependencyLabel)>> = vec![None; view.len()];
    let mut visited = vec![false; view.len()];
    let mut queue = VecDeque::new();
    if let Some(position) = view.position(anchor) {
        visited[position] = true;
    }
    queue.push_back(anchor);

    while let Some(v) = queue.pop_front() {
        for edge in view.successors(v) {
            if edge.target == anchor {
                let mut vertices = vec![v];
                let mut labels = vec![edge.label];
                let mut current = v;
                while let Some((prev, label)) =
                    view.position(current).and_then(|position| parent[position])
                {
                    vertices.push(prev);
                    labels.push(label);
                    current = prev;
                }
                vertices.reverse();
                labels.reverse();
                return Some(Cycle { vertices, labels });
            }
            let Some(position) = view.position(edge.target) else {
                continue;
            };
            if !visited[position] {
                visited[position] = true;
                parent[position] = Some((v, edge.label));
                queue.push_back(edge.target);
            }
        }
    }
    None
}

/// First cycle found in `view`, trying members in ascending order.
///
/// On a view of one strongly connected component the first member always
/// succeeds.
#[must_use]
pub fn find_cycle<T>(view: &SubgraphView<'_, T>) -> Option<Cycle>
where
    T: Hash + Eq + Clone + Debug,
{
    view.members()
        .iter()
        .find_map(|&anchor| find_cycle_through(view, anchor))
}

#[cfg(test)]
mod tests {
    use hashbrown::HashSet;

    use super::*;
    use crate::graph::label::DependencyLabel::{ReadWrite, WriteRead, WriteWrite};
    use crate::graph::label::LabelSet;

    fn build(n: u32, edges: &[(u32, u32, DependencyLabel)]) -> DependencyGraph<u32> {
        let mut graph = DependencyGraph::default();
        for v in 0..n {
            graph.add_vertex(v).unwrap();
        }
        for (a, b, label) in edges {
            graph.add_edge(a, b, *label).unwrap();
        }
        graph
    }

    fn complete(n: u32) -> DependencyGraph<u32> {
        let mut edges = Vec::new();
        for a in 0..n {
            for b in 0..n {
                if a != b {
                    edges.push((a, b, WriteWrite));
                }
            }
        }
        build(n, &edges)
    }

    fn all_cycles(view: &SubgraphView<'_, u32>) -> Vec<Cycle> {
        CycleEnumerator::new(view, &Budget::unbounded())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn assert_well_formed(graph: &DependencyGraph<u32>, cycle: &Cycle) {
        let distinct: HashSet<_> = cycle.vertices().iter().collect();
        assert_eq!(distinct.len(), cycle.vertices().len());
        assert_eq!(cycle.vertices().len(), cycle.labels().len());
        assert_eq!(cycle.anchor(), cycle.vertices().iter().min().copied());
        for (a, label, b) in cycle.edges() {
            let (from, to) = (graph.vertex(a).unwrap(), graph.vertex(b).unwrap());
            assert!(graph.has_edge(from, to, label));
        }
    }

    #[test]
    fn test_complete_graph_cycle_counts() {
        // sum over k of C(n, k) * (k - 1)!
        for (n, expected) in [(2, 1), (3, 5), (4, 20), (5, 84)] {
            let graph = complete(n);
            let view = SubgraphView::whole(&graph, LabelSet::ALL);
            let cycles = all_cycles(&view);
            assert_eq!(cycles.len(), expected, "K{n}");

            let distinct: HashSet<_> = cycles.iter().cloned().collect();
            assert_eq!(distinct.len(), cycles.len());
            for cycle in &cycles {
                assert_well_formed(&graph, cycle);
            }
        }
    }

    #[test]
    fn test_parallel_edges_are_distinct_cycles() {
        let graph = build(
            2,
            &[(0, 1, WriteWrite), (0, 1, ReadWrite), (1, 0, ReadWrite)],
        );
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let labels: Vec<Vec<DependencyLabel>> = all_cycles(&view)
            .iter()
            .map(|c| c.labels().to_vec())
            .collect();
        assert_eq!(
            labels,
            vec![vec![WriteWrite, ReadWrite], vec![ReadWrite, ReadWrite]]
        );

        let ww_view = SubgraphView::whole(&graph, LabelSet::WRITE_DEPENDENCIES);
        assert!(all_cycles(&ww_view).is_empty());
    }

    #[test]
    fn test_self_loop_has_length_one() {
        let graph = build(2, &[(1, 1, WriteRead), (0, 1, WriteWrite)]);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let cycles = all_cycles(&view);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].vertices(), &[VertexIndex(1)]);
        assert_eq!(cycles[0].labels(), &[WriteRead]);

        assert_eq!(find_cycle(&view), Some(cycles[0].clone()));
    }

    #[test]
    fn test_acyclic_view_has_no_cycles() {
        let graph = build(4, &[(0, 1, WriteWrite), (1, 2, ReadWrite), (0, 3, WriteRead)]);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        assert!(all_cycles(&view).is_empty());
        assert_eq!(find_cycle(&view), None);
    }

    #[test]
    fn test_find_cycle_is_shortest() {
        // 0 -> 1 -> 2 -> 3 -> 0 and the chord 1 -> 0
        let graph = build(
            4,
            &[
                (0, 1, WriteWrite),
                (1, 2, WriteWrite),
                (2, 3, WriteRead),
                (3, 0, ReadWrite),
                (1, 0, WriteRead),
            ],
        );
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let cycle = find_cycle(&view).unwrap();
        assert_eq!(cycle.vertices(), &[VertexIndex(0), VertexIndex(1)]);
        assert_eq!(cycle.labels(), &[WriteWrite, WriteRead]);

        let ww = SubgraphView::whole(&graph, LabelSet::WRITE_WRITE);
        assert_eq!(find_cycle(&ww), None);
    }

    #[test]
    fn test_find_cycle_label_alignment() {
        let graph = build(
            3,
            &[(0, 1, WriteWrite), (1, 2, WriteRead), (2, 0, ReadWrite)],
        );
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let cycle = find_cycle(&view).unwrap();
        assert_well_formed(&graph, &cycle);
        assert_eq!(cycle.labels(), &[WriteWrite, WriteRead, ReadWrite]);
    }

    #[test]
    fn test_step_limit() {
        let graph = complete(6);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let budget = Budget::builder().max_steps(10).build();
        let mut enumerator = CycleEnumerator::new(&view, &budget);

        let results: Vec<_> = enumerator.by_ref().collect();
        assert_eq!(
            results.last(),
            Some(&Err(Exhaustion::StepLimit { limit: 10 }))
        );
        assert!(results[..results.len() - 1].iter().all(Result::is_ok));
        assert_eq!(enumerator.next(), None);
    }

    #[test]
    fn test_cancellation() {
        let graph = complete(4);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let token = CancellationToken::new();
        let budget = Budget::builder().cancellation(token.clone()).build();
        let mut enumerator = CycleEnumerator::new(&view, &budget);

        assert!(matches!(enumerator.next(), Some(Ok(_))));
        token.cancel();
        assert_eq!(enumerator.next(), Some(Err(Exhaustion::Cancelled)));
        assert_eq!(enumerator.next(), None);
    }

    #[test]
    fn test_enumeration_restarts_fresh() {
        let graph = complete(3);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let first = all_cycles(&view);
        let second = all_cycles(&view);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_outlive_the_cycle() {
        let graph = build(3, &[(1, 2, ReadWrite), (2, 1, WriteWrite)]);
        let view = SubgraphView::whole(&graph, LabelSet::ALL);
        let ids: Vec<&u32> = {
            let cycle = find_cycle(&view).unwrap();
            cycle.ids(&graph).collect()
        };
        assert_eq!(ids, vec![&1, &2]);
    }

    #[test]
    fn test_component_view_searches_locally() {
        // two disjoint 2-cycles far apart in index space
        let graph = build(
            1_000,
            &[
                (3, 998, ReadWrite),
                (998, 3, ReadWrite),
                (500, 999, WriteWrite),
                (999, 500, ReadWrite),
            ],
        );
        let view = SubgraphView::restricted(
            &graph,
            [VertexIndex(500), VertexIndex(999)],
            LabelSet::ALL,
        );
        let cycles = all_cycles(&view);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].vertices(), &[VertexIndex(500), VertexIndex(999)]);
        assert_eq!(find_cycle(&view), Some(cycles[0].clone()));

        let other = SubgraphView::restricted(
            &graph,
            [VertexIndex(998), VertexIndex(3)],
            LabelSet::ALL,
        );
        assert_eq!(
            find_cycle(&other).map(|c| c.labels().to_vec()),
            Some(vec![ReadWrite, ReadWrite])
        );
    }
}
