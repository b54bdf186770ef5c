//! The error types that the library reports.

/// Reasons for rejecting the text of a force expression. Positions are
/// 0-based character offsets into the source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("the expression is empty")]
    Empty,
    #[error("unexpected character at position {0}")]
    UnexpectedChar(usize),
    #[error("malformed number at position {0}")]
    BadNumber(usize),
    #[error("unbalanced parenthesis at position {0}")]
    Unbalanced(usize),
    #[error("missing operand at position {0}")]
    MissingOperand(usize),
    #[error("missing operator at position {0}")]
    MissingOperator(usize),
}

/// Reasons for refusing to start a layout with some configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must not be negative (got {value})")]
    NegativeExtent { name: &'static str, value: f64 },
    #[error("no repulsive force function was configured")]
    MissingRepulsiveForce,
    #[error("no attractive force function was configured")]
    MissingAttractiveForce,
    #[error("the cooling factor must be greater than 1 (got {0})")]
    CoolingFactor(f64),
    #[error("{name} is out of range (got {value})")]
    Temperature { name: &'static str, value: f64 },
}

/// Reasons for a layout run to be refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("a layout is already running on this calculator")]
    AlreadyRunning,
    #[error("edge {edge} refers to node {node}, but the graph has {nodes} nodes")]
    InvalidEdge {
        edge: usize,
        node: usize,
        nodes: usize,
    },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
