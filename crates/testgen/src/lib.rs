//! Random dependency graphs for exercising the isolation checkers.

pub mod generator;
