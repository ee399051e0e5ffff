//! Common types and error definitions for frenet_planner
//!
//! This module provides the foundational building blocks shared by the
//! reference curve, the candidate lattice, and the planner itself.

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
