// Cubic spline reference curve
//
// Two natural cubic splines x(s), y(s) over the cumulative chord length of
// the lane waypoints. Evaluation outside [0, s_max] clamps to the nearest
// endpoint.

extern crate nalgebra as na;

use crate::common::{Lane, PlannerError, PlannerResult, Point2D};

/// Natural cubic spline through (x, y) samples of a single axis
#[derive(Debug, Clone)]
struct CubicSpline1D {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline1D {
    fn new(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        let nx = x.len();
        let mut h: Vec<f64> = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            h.push(x[i + 1] - x[i]);
        }

        let a = y.to_vec();
        let a_mat = Self::calc_a(&h);
        let b_mat = Self::calc_b(&h, &a);

        let a_mat_inv = a_mat.try_inverse().ok_or_else(|| {
            PlannerError::NumericalError("singular spline system".to_string())
        })?;
        let c_na = a_mat_inv * b_mat;
        let c: Vec<f64> = c_na.iter().cloned().collect();

        let mut b: Vec<f64> = Vec::with_capacity(nx - 1);
        let mut d: Vec<f64> = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(CubicSpline1D { x: x.to_vec(), a, b, c, d })
    }

    fn calc(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    fn calc_d(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    fn calc_dd(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }

    /// Largest segment index i with x[i] <= t, clamped to a valid segment
    fn search_index(&self, t: f64) -> usize {
        let mut low = 0;
        let mut high = self.x.len() - 1;
        while high - low > 1 {
            let mid = (low + high) / 2;
            if self.x[mid] <= t {
                low = mid;
            } else {
                high = mid;
            }
        }
        low
    }

    fn calc_a(h: &[f64]) -> na::DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = na::DMatrix::from_diagonal_element(nx, nx, 0.0);
        a[(0, 0)] = 1.0;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.0;
        a[(nx - 1, nx - 2)] = 0.0;
        a[(nx - 1, nx - 1)] = 1.0;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> na::DVector<f64> {
        let nx = h.len() + 1;
        let mut b = na::DVector::zeros(nx);
        for i in 0..nx - 2 {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }
}

/// Reference course sampled from the curve at a fixed arclength step
#[derive(Debug, Clone, Default)]
pub struct ReferenceCourse {
    pub s: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub curvature: Vec<f64>,
}

/// 2D cubic spline parameterized by arclength
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    pub s: Vec<f64>,
    sx: CubicSpline1D,
    sy: CubicSpline1D,
}

impl ReferenceCurve {
    pub fn new(lane: &Lane) -> PlannerResult<Self> {
        if lane.len() < 2 {
            return Err(PlannerError::InvalidParameter(
                "reference lane needs at least 2 waypoints".to_string(),
            ));
        }

        let x = lane.x_coords();
        let y = lane.y_coords();

        // Cumulative chord length as the spline parameter
        let mut s = vec![0.0];
        for i in 1..x.len() {
            let ds = ((x[i] - x[i - 1]).powi(2) + (y[i] - y[i - 1]).powi(2)).sqrt();
            if ds <= 0.0 {
                return Err(PlannerError::InvalidParameter(
                    "consecutive waypoints must be distinct".to_string(),
                ));
            }
            s.push(s[i - 1] + ds);
        }

        let sx = CubicSpline1D::new(&s, &x)?;
        let sy = CubicSpline1D::new(&s, &y)?;

        Ok(ReferenceCurve { s, sx, sy })
    }

    /// Total arclength of the curve
    pub fn max_s(&self) -> f64 {
        *self.s.last().unwrap_or(&0.0)
    }

    // Out-of-range queries are clamped to the endpoints; the curve never
    // extrapolates.
    fn clamp_s(&self, s: f64) -> f64 {
        s.max(0.0).min(self.max_s())
    }

    pub fn calc_position(&self, s: f64) -> Point2D {
        let s = self.clamp_s(s);
        Point2D::new(self.sx.calc(s), self.sy.calc(s))
    }

    pub fn calc_yaw(&self, s: f64) -> f64 {
        let s = self.clamp_s(s);
        let dx = self.sx.calc_d(s);
        let dy = self.sy.calc_d(s);
        dy.atan2(dx)
    }

    pub fn calc_curvature(&self, s: f64) -> f64 {
        let s = self.clamp_s(s);
        let dx = self.sx.calc_d(s);
        let ddx = self.sx.calc_dd(s);
        let dy = self.sy.calc_d(s);
        let ddy = self.sy.calc_dd(s);
        (ddy * dx - ddx * dy) / (dx.powi(2) + dy.powi(2)).powf(1.5)
    }

    /// Sample the whole curve every `ds` meters of arclength
    pub fn sample_course(&self, ds: f64) -> ReferenceCourse {
        let mut course = ReferenceCourse::default();
        let mut s = 0.0;
        while s < self.max_s() {
            let p = self.calc_position(s);
            course.s.push(s);
            course.x.push(p.x);
            course.y.push(p.y);
            course.yaw.push(self.calc_yaw(s));
            course.curvature.push(self.calc_curvature(s));
            s += ds;
        }
        course
    }
}
