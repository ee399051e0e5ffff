//! Common types used throughout frenet_planner

use std::f64::consts::PI;

use nalgebra::Vector2;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Normalize an angle to (-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Reference lane described by an ordered sequence of waypoints
#[derive(Debug, Clone)]
pub struct Lane {
    pub points: Vec<Point2D>,
}

impl Lane {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        assert_eq!(x.len(), y.len());
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

impl Default for Lane {
    fn default() -> Self {
        Self::new()
    }
}

/// Detected obstacle with pose, velocity and bounding-box footprint
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub pose: Pose2D,
    /// Linear velocity [m/s]; its magnitude is used as the predicted speed
    pub velocity: Vector2<f64>,
    /// Bounding box length along the obstacle heading [m]
    pub length: f64,
    /// Bounding box width across the obstacle heading [m]
    pub width: f64,
}

impl Obstacle {
    pub fn new(pose: Pose2D, velocity: Vector2<f64>, length: f64, width: f64) -> Self {
        Self { pose, velocity, length, width }
    }

    /// A non-moving obstacle
    pub fn stationary(pose: Pose2D, length: f64, width: f64) -> Self {
        Self::new(pose, Vector2::zeros(), length, width)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}
