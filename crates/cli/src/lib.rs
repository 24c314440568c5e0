//! isocheck CLI -- generate dependency graphs and check them against
//! isolation levels.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use isocheck_core::IsolationLevel;

#[derive(Debug, Parser)]
#[command(
    name = "isocheck",
    about = "Isolation-anomaly detection over transaction dependency graphs"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate random dependency graphs
    Generate(GenerateArgs),
    /// Check dependency graphs against isolation levels
    Verify(VerifyArgs),
    /// Print vertex and edge totals of dependency graphs
    Stats(StatsArgs),
    /// Print the JSON Schema for the graph input format to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of graphs to generate
    #[arg(long)]
    pub n_graph: u64,
    /// Number of vertices (transactions) per graph
    #[arg(long)]
    pub n_vertex: u64,
    /// Number of distinct edges per graph
    #[arg(long)]
    pub n_edge: u64,
    /// Relative weight of `ww` edges
    #[arg(long, default_value_t = 1)]
    pub ww_weight: u32,
    /// Relative weight of `wr` edges
    #[arg(long, default_value_t = 1)]
    pub wr_weight: u32,
    /// Relative weight of `rw` edges
    #[arg(long, default_value_t = 1)]
    pub rw_weight: u32,
    /// Output directory for generated graph files
    #[arg(long)]
    pub output_dir: PathBuf,
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Graph JSON files, or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Isolation level to check; repeat for several (default: all)
    #[arg(long = "level")]
    pub levels: Vec<LevelArg>,
    /// Edge expansions allowed per component during cycle enumeration
    #[arg(long)]
    pub max_steps: Option<u64>,
    /// Print the offending cycle on FAIL
    #[arg(long)]
    pub verbose: bool,
    /// Output results as JSON (one object per file)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Graph JSON files, or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LevelArg {
    Pl1,
    Pl2,
    ParallelSnapshotIsolation,
    SnapshotIsolation,
    Serializable,
}

impl From<LevelArg> for IsolationLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Pl1 => Self::Pl1,
            LevelArg::Pl2 => Self::Pl2,
            LevelArg::ParallelSnapshotIsolation => Self::ParallelSnapshotIsolation,
            LevelArg::SnapshotIsolation => Self::SnapshotIsolation,
            LevelArg::Serializable => Self::Serializable,
        }
    }
}

/// The levels to check, weakest first and without repeats. No selection
/// means every level.
#[must_use]
pub fn selected_levels(levels: &[LevelArg]) -> Vec<IsolationLevel> {
    if levels.is_empty() {
        return IsolationLevel::ALL.to_vec();
    }
    let mut selected: Vec<IsolationLevel> = levels.iter().copied().map(Into::into).collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}
