//! Graph containers that implement PositionedGraph.

pub mod graph;
pub mod observed;

pub use graph::Graph;
pub use observed::{Frame, ObservedGraph, Snapshot};
