//! Error types for frenet_planner

use std::fmt;

/// Main error type for the planner
#[derive(Debug)]
pub enum PlannerError {
    /// Invalid configuration or input (bad Setting, too few waypoints, ...)
    InvalidParameter(String),
    /// Numerical computation failed (matrix inversion, etc.)
    NumericalError(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PlannerError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
