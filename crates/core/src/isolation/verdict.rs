use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Result};
use core::hash::Hash;

use crate::graph::cycle::Cycle;
use crate::graph::dependency::DependencyGraph;
use crate::graph::label::DependencyLabel;
use crate::isolation::IsolationLevel;

/// A cycle that the isolation level forbids.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly<T> {
    pub level: IsolationLevel,
    /// Vertex ids in walk order, starting at the cycle's smallest vertex.
    pub vertices: Vec<T>,
    /// `labels[i]` labels the edge leaving `vertices[i]`.
    pub labels: Vec<DependencyLabel>,
}

impl<T> Anomaly<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub(crate) fn new(level: IsolationLevel, cycle: &Cycle, graph: &DependencyGraph<T>) -> Self {
        Self {
            level,
            vertices: cycle.vertices().iter().map(|&v| graph.id(v).clone()).collect(),
            labels: cycle.labels().to_vec(),
        }
    }
}

impl<T> Anomaly<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Renders the cycle as `a -ww-> b -rw-> a`.
impl<T> Display for Anomaly<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (vertex, label) in self.vertices.iter().zip(&self.labels) {
            write!(f, "{vertex} -{label}-> ")?;
        }
        self.vertices
            .first()
            .map_or(Ok(()), |first| write!(f, "{first}"))
    }
}

/// Outcome of checking one isolation level.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    /// No forbidden cycle exists.
    Holds,
    /// The first forbidden cycle found.
    Violated(Anomaly<T>),
}

impl<T> Verdict<T> {
    #[must_use]
    pub const fn holds(&self) -> bool {
        matches!(self, Self::Holds)
    }

    #[must_use]
    pub const fn anomaly(&self) -> Option<&Anomaly<T>> {
        match self {
            Self::Holds => None,
            Self::Violated(anomaly) => Some(anomaly),
        }
    }
}
