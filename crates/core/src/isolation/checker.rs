//! The check driver.
//!
//! A [`Checker`] walks a small state machine:
//!
//! ```text
//! Idle -> Partitioning -> Scanning { 0 } -> Scanning { 1 } -> ... -> Done(verdict)
//!                 \                 \
//!                  +-> Failed(error) +-> Failed(error)
//! ```
//!
//! `Partitioning` computes the strongly connected components of the graph
//! projected to the level's labels and keeps the non-trivial ones.
//! `Scanning { i }` searches component `i`:
//!
//! - existence-only levels (Serializable, PL-2, PL-1) look for one cycle;
//!   finding it ends the check with [`Verdict::Violated`].
//! - exhaustive levels (SI, PSI) enumerate every cycle and stop at the first
//!   one the level does not admit.
//!
//! A component without a forbidden cycle moves the scan to the next one;
//! after the last component the check ends with [`Verdict::Holds`].
//! Components are visited in order of their smallest vertex.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::graph::cycle::{find_cycle, Budget, CycleEnumerator, EnumerationPolicy};
use crate::graph::dependency::DependencyGraph;
use crate::graph::error::InvariantViolation;
use crate::graph::scc::{partition, Component};
use crate::graph::subgraph::SubgraphView;
use crate::isolation::error::Error;
use crate::isolation::verdict::{Anomaly, Verdict};
use crate::isolation::IsolationLevel;

/// Where a [`Checker`] is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckState<T> {
    Idle,
    Partitioning,
    Scanning { component: usize },
    Done(Verdict<T>),
    Failed(Error<T>),
}

impl<T> CheckState<T> {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

/// Checks one isolation level against one frozen graph.
#[derive(Debug)]
pub struct Checker<'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    graph: &'g DependencyGraph<T>,
    level: IsolationLevel,
    budget: Budget,
    components: Vec<Component>,
    state: CheckState<T>,
}

impl<'g, T> Checker<'g, T>
where
    T: Hash + Eq + Clone + Debug,
{
    #[must_use]
    pub fn new(graph: &'g DependencyGraph<T>, level: IsolationLevel, budget: &Budget) -> Self {
        Self {
            graph,
            level,
            budget: budget.clone(),
            components: Vec::new(),
            state: CheckState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CheckState<T> {
        &self.state
    }

    /// Non-trivial components found while partitioning.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Performs one transition. Terminal states do not change.
    pub fn step(&mut self) -> &CheckState<T> {
        let next = match self.state {
            CheckState::Idle => CheckState::Partitioning,
            CheckState::Partitioning => self.partition(),
            CheckState::Scanning { component } => self.scan(component),
            CheckState::Done(_) | CheckState::Failed(_) => return &self.state,
        };
        self.state = next;
        &self.state
    }

    /// Steps until a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the error of the [`CheckState::Failed`] state.
    pub fn run(mut self) -> Result<Verdict<T>, Error<T>> {
        while !self.state.is_terminal() {
            self.step();
        }
        match self.state {
            CheckState::Done(verdict) => Ok(verdict),
            CheckState::Failed(error) => Err(error),
            state => unreachable!("checker stopped in {state:?}"),
        }
    }

    fn partition(&mut self) -> CheckState<T> {
        match partition(self.graph, self.level.labels()) {
            Err(violation) => CheckState::Failed(violation.into()),
            Ok(partition) => {
                self.components = partition.components;
                if self.components.is_empty() {
                    CheckState::Done(Verdict::Holds)
                } else {
                    CheckState::Scanning { component: 0 }
                }
            }
        }
    }

    fn scan(&self, index: usize) -> CheckState<T> {
        let component = &self.components[index];
        let view = SubgraphView::of_component(self.graph, component, self.level.labels());

        tracing::trace!(
            level = %self.level,
            component = index,
            size = component.len(),
            "scanning component"
        );

        let outcome = match self.level.policy() {
            EnumerationPolicy::ExistenceOnly => find_cycle(&view)
                .filter(|cycle| !self.level.admits(cycle))
                .map(Ok),
            EnumerationPolicy::Exhaustive => CycleEnumerator::new(&view, &self.budget)
                .find(|result| result.as_ref().map_or(true, |cycle| !self.level.admits(cycle))),
        };

        match outcome {
            Some(Ok(cycle)) => {
                tracing::debug!(
                    level = %self.level,
                    component = index,
                    length = cycle.len(),
                    "forbidden cycle found"
                );
                CheckState::Done(Verdict::Violated(Anomaly::new(
                    self.level,
                    &cycle,
                    self.graph,
                )))
            }
            Some(Err(reason)) => {
                tracing::debug!(
                    level = %self.level,
                    component = index,
                    ?reason,
                    "enumeration stopped"
                );
                let anchor = component.min_vertex().and_then(|v| self.graph.vertex(v));
                anchor.map_or_else(
                    || {
                        let violation = InvariantViolation::EmptyComponent { component: index };
                        CheckState::Failed(violation.into())
                    },
                    |anchor| {
                        CheckState::Failed(Error::ResourceExhausted {
                            level: self.level,
                            anchor: anchor.clone(),
                            reason,
                        })
                    },
                )
            }
            None if index + 1 < self.components.len() => CheckState::Scanning {
                component: index + 1,
            },
            None => CheckState::Done(Verdict::Holds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::error::Exhaustion;
    use crate::graph::label::DependencyLabel::{ReadWrite, WriteRead, WriteWrite};

    fn two_components() -> DependencyGraph<&'static str> {
        // {a, b}: rw/rw, fine under SI. {c, d}: ww/rw, forbidden under SI.
        let mut graph = DependencyGraph::default();
        for v in ["a", "b", "c", "d", "e"] {
            graph.add_vertex(v).unwrap();
        }
        graph.add_edge(&"a", &"b", ReadWrite).unwrap();
        graph.add_edge(&"b", &"a", ReadWrite).unwrap();
        graph.add_edge(&"b", &"c", WriteRead).unwrap();
        graph.add_edge(&"c", &"d", WriteWrite).unwrap();
        graph.add_edge(&"d", &"c", ReadWrite).unwrap();
        graph
    }

    #[test]
    fn test_state_sequence() {
        let graph = two_components();
        let mut checker = Checker::new(&graph, IsolationLevel::SnapshotIsolation, &Budget::default());
        assert_eq!(checker.state(), &CheckState::Idle);
        assert_eq!(checker.step(), &CheckState::Partitioning);
        assert_eq!(checker.step(), &CheckState::Scanning { component: 0 });
        assert_eq!(checker.components().len(), 2);
        assert_eq!(checker.step(), &CheckState::Scanning { component: 1 });

        let CheckState::Done(Verdict::Violated(anomaly)) = checker.step().clone() else {
            panic!("expected a violation");
        };
        assert_eq!(anomaly.vertices, vec!["c", "d"]);
        assert_eq!(anomaly.labels, vec![WriteWrite, ReadWrite]);

        let terminal = checker.state().clone();
        assert_eq!(checker.step(), &terminal);
    }

    #[test]
    fn test_no_components_is_done_after_partitioning() {
        let graph = two_components();
        let mut checker = Checker::new(&graph, IsolationLevel::Pl1, &Budget::default());
        checker.step();
        assert_eq!(checker.step(), &CheckState::Done(Verdict::Holds));
    }

    #[test]
    fn test_existence_short_circuits_on_first_component() {
        let graph = two_components();
        let mut checker = Checker::new(&graph, IsolationLevel::Serializable, &Budget::default());
        checker.step();
        checker.step();
        let CheckState::Done(Verdict::Violated(anomaly)) = checker.step().clone() else {
            panic!("expected a violation");
        };
        assert_eq!(anomaly.vertices, vec!["a", "b"]);
    }

    #[test]
    fn test_budget_failure_names_component() {
        let graph = two_components();
        let budget = Budget::builder().max_steps(0).build();
        let result = Checker::new(&graph, IsolationLevel::ParallelSnapshotIsolation, &budget).run();
        assert_eq!(
            result,
            Err(Error::ResourceExhausted {
                level: IsolationLevel::ParallelSnapshotIsolation,
                anchor: "a",
                reason: Exhaustion::StepLimit { limit: 0 },
            })
        );
    }
}
