pub mod cycle;
pub mod dependency;
pub mod error;
pub mod label;
pub mod records;
pub mod scc;
pub mod subgraph;
