// Separating-axis collision checking and obstacle motion prediction

use nalgebra::Vector2;

use crate::common::{Obstacle, Point2D};

/// Oriented rectangle as four corners in winding order
pub type Rectangle = [Point2D; 4];

/// Predicted obstacle motion: fixed-stride pose/speed series over the
/// planning horizon, extrapolated at constant speed and heading.
#[derive(Debug, Clone)]
pub struct ObstaclePrediction {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub v: Vec<f64>,
}

/// Extrapolate every obstacle over `horizon` seconds with stride `tick`.
pub fn predict_obstacle_paths(obstacles: &[Obstacle], horizon: f64, tick: f64) -> Vec<ObstaclePrediction> {
    let mut predictions = Vec::with_capacity(obstacles.len());

    for obstacle in obstacles {
        let yaw = obstacle.pose.yaw;
        let v = obstacle.speed();

        let mut prediction = ObstaclePrediction {
            x: vec![obstacle.pose.x],
            y: vec![obstacle.pose.y],
            yaw: vec![yaw],
            v: vec![v],
        };

        let steps = (horizon / tick) as usize;
        for i in 0..steps {
            prediction.x.push(prediction.x[i] + v * tick * yaw.cos());
            prediction.y.push(prediction.y[i] + v * tick * yaw.sin());
            prediction.yaw.push(yaw);
            prediction.v.push(v);
        }

        predictions.push(prediction);
    }

    predictions
}

/// Separating-axis overlap test between oriented rectangles
#[derive(Debug, Clone, Copy, Default)]
pub struct SatCollisionChecker;

impl SatCollisionChecker {
    pub fn new() -> Self {
        SatCollisionChecker
    }

    /// Build an oriented rectangle around (center_x, center_y), heading
    /// `yaw`, inflated on each side by the longitudinal/lateral margins.
    pub fn construct_rectangle(
        &self,
        center_x: f64,
        center_y: f64,
        yaw: f64,
        length: f64,
        width: f64,
        margin_lon: f64,
        margin_lat: f64,
    ) -> Rectangle {
        let half_l = length / 2.0 + margin_lon;
        let half_w = width / 2.0 + margin_lat;
        let (sin_yaw, cos_yaw) = yaw.sin_cos();

        let corner = |dx: f64, dy: f64| {
            Point2D::new(
                center_x + dx * cos_yaw - dy * sin_yaw,
                center_y + dx * sin_yaw + dy * cos_yaw,
            )
        };

        [
            corner(half_l, half_w),
            corner(half_l, -half_w),
            corner(-half_l, -half_w),
            corner(-half_l, half_w),
        ]
    }

    /// True if the rectangles overlap. Tests the two edge normals of each
    /// rectangle; a gap along any axis means no collision.
    pub fn check_collision(&self, rect_a: &Rectangle, rect_b: &Rectangle) -> bool {
        for axis in Self::axes(rect_a).iter().chain(Self::axes(rect_b).iter()) {
            let (min_a, max_a) = Self::project(rect_a, axis);
            let (min_b, max_b) = Self::project(rect_b, axis);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
        true
    }

    fn axes(rect: &Rectangle) -> [Vector2<f64>; 2] {
        let edge_0 = rect[1].to_vector() - rect[0].to_vector();
        let edge_1 = rect[3].to_vector() - rect[0].to_vector();
        [
            Vector2::new(-edge_0[1], edge_0[0]),
            Vector2::new(-edge_1[1], edge_1[0]),
        ]
    }

    fn project(rect: &Rectangle, axis: &Vector2<f64>) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for corner in rect {
            let p = corner.to_vector().dot(axis);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_overlapping_rectangles_collide() {
        let checker = SatCollisionChecker::new();
        let a = checker.construct_rectangle(0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        let b = checker.construct_rectangle(1.5, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        assert!(checker.check_collision(&a, &b));
    }

    #[test]
    fn test_distant_rectangles_do_not_collide() {
        let checker = SatCollisionChecker::new();
        let a = checker.construct_rectangle(0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        let b = checker.construct_rectangle(10.0, 0.0, 0.3, 2.0, 2.0, 0.0, 0.0);
        assert!(!checker.check_collision(&a, &b));
    }

    #[test]
    fn test_rotated_near_miss_is_separated() {
        // bounding boxes overlap near the corner, the rectangles do not
        let checker = SatCollisionChecker::new();
        let a = checker.construct_rectangle(0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        let b = checker.construct_rectangle(1.9, 1.9, FRAC_PI_4, 2.0, 2.0, 0.0, 0.0);
        assert!(!checker.check_collision(&a, &b));
    }

    #[test]
    fn test_collision_check_is_symmetric() {
        let checker = SatCollisionChecker::new();
        let a = checker.construct_rectangle(0.0, 0.0, 0.4, 4.5, 1.8, 0.0, 0.0);
        for (bx, byaw) in [(1.0, 0.9), (4.0, 0.2), (8.0, 1.3)] {
            let b = checker.construct_rectangle(bx, 0.5, byaw, 3.0, 2.0, 0.3, 0.3);
            assert_eq!(
                checker.check_collision(&a, &b),
                checker.check_collision(&b, &a)
            );
        }
    }

    #[test]
    fn test_margin_inflates_footprint() {
        let checker = SatCollisionChecker::new();
        let a = checker.construct_rectangle(0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        let b_tight = checker.construct_rectangle(2.5, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        let b_inflated = checker.construct_rectangle(2.5, 0.0, 0.0, 2.0, 2.0, 0.6, 0.0);
        assert!(!checker.check_collision(&a, &b_tight));
        assert!(checker.check_collision(&a, &b_inflated));
    }

    #[test]
    fn test_stationary_obstacle_prediction_holds_pose() {
        let obstacle = Obstacle::stationary(Pose2D::new(3.0, -1.0, 0.5), 4.0, 2.0);
        let predictions = predict_obstacle_paths(&[obstacle], 5.0, 0.1);
        assert_eq!(predictions.len(), 1);
        let p = &predictions[0];
        assert_eq!(p.x.len(), 51);
        assert!(p.x.iter().all(|&x| (x - 3.0).abs() < 1e-12));
        assert!(p.y.iter().all(|&y| (y + 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_moving_obstacle_prediction_is_linear() {
        let obstacle = Obstacle::new(
            Pose2D::new(0.0, 0.0, 0.0),
            nalgebra::Vector2::new(2.0, 0.0),
            4.0,
            2.0,
        );
        let predictions = predict_obstacle_paths(&[obstacle], 4.0, 0.2);
        let p = &predictions[0];
        let last = p.x.len() - 1;
        // 2 m/s for 4 s
        assert!((p.x[last] - 8.0).abs() < 1e-9);
        assert!(p.y[last].abs() < 1e-12);
    }
}
