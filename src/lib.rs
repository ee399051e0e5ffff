//! frenet_planner - Frenet-frame optimal trajectory planning
//!
//! This crate computes, once per control cycle, a single dynamically and
//! kinematically feasible trajectory for a vehicle following a reference
//! lane, using lazy coordinate-descent search over a lattice of candidate
//! end states and separating-axis collision checking against predicted
//! obstacle motion.

// Core modules
pub mod common;

// Planner modules
pub mod polynomial;
pub mod spline;
pub mod frenet;
pub mod lattice;
pub mod collision;
pub mod planner;

// Re-export common types for convenience
pub use common::{Lane, Obstacle, Point2D, Pose2D};
pub use common::{PlannerError, PlannerResult};
pub use frenet::{FrenetState, FrenetTrajectory};
pub use planner::{FrenetOptimalPlanner, Setting};
pub use spline::{ReferenceCourse, ReferenceCurve};
