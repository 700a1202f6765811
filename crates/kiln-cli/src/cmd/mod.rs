pub mod completions;
pub mod dump;
pub mod graph;
pub mod plan;
