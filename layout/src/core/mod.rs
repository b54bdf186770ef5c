//! A module contain the interfaces, utilities and data-structures that are shared by the other
//! modules.

pub mod geometry;
pub mod graph;
pub mod utils;
