// Typed errors for values that come from outside the pipeline
// (query strings, CLI flags, config files).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Unknown measure: {0} (expected export, import or trade balance)")]
    UnknownMeasure(String),

    #[error("Unknown direction: {0} (expected export or import)")]
    UnknownDirection(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid query parameter {name}: {reason}")]
    InvalidQuery { name: String, reason: String },
}
