//! The force model of the spring layout: the force functions, their
//! configuration, and the computation of the forces on every node.

pub mod config;
pub mod function;
pub mod model;

pub use config::{ForceConfig, Forces};
pub use function::ForceFunction;
pub use model::ForceModel;
