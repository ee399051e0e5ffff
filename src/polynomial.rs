// Boundary-value polynomials for Frenet trajectory synthesis
//
// The lateral motion uses a quintic polynomial (position, velocity and
// acceleration constrained at both ends), the longitudinal motion a quartic
// polynomial (end position left free, only its derivatives constrained).

/// Quintic polynomial for lateral trajectory generation
#[derive(Debug, Clone)]
pub struct QuinticPolynomial {
    a0: f64,
    a1: f64,
    a2: f64,
    a3: f64,
    a4: f64,
    a5: f64,
}

impl QuinticPolynomial {
    /// Solve the six boundary constraints (xs, vxs, axs) at t = 0 and
    /// (xe, vxe, axe) at t = time.
    ///
    /// The duration must be strictly positive; this is a construction
    /// precondition, not a recoverable condition.
    pub fn new(xs: f64, vxs: f64, axs: f64, xe: f64, vxe: f64, axe: f64, time: f64) -> Self {
        assert!(time > 0.0, "polynomial duration must be positive");

        let a0 = xs;
        let a1 = vxs;
        let a2 = axs / 2.0;

        let t2 = time * time;
        let t3 = t2 * time;
        let t4 = t3 * time;
        let t5 = t4 * time;

        // Solve for a3, a4, a5
        let a = nalgebra::Matrix3::new(
            t3, t4, t5,
            3.0 * t2, 4.0 * t3, 5.0 * t4,
            6.0 * time, 12.0 * t2, 20.0 * t3,
        );

        let b = nalgebra::Vector3::new(
            xe - a0 - a1 * time - a2 * t2,
            vxe - a1 - 2.0 * a2 * time,
            axe - 2.0 * a2,
        );

        let x = a.try_inverse().map(|inv| inv * b).unwrap_or(nalgebra::Vector3::zeros());

        QuinticPolynomial {
            a0,
            a1,
            a2,
            a3: x[0],
            a4: x[1],
            a5: x[2],
        }
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0 + self.a1 * t + self.a2 * t.powi(2) + self.a3 * t.powi(3) + self.a4 * t.powi(4) + self.a5 * t.powi(5)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1 + 2.0 * self.a2 * t + 3.0 * self.a3 * t.powi(2) + 4.0 * self.a4 * t.powi(3) + 5.0 * self.a5 * t.powi(4)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t + 12.0 * self.a4 * t.powi(2) + 20.0 * self.a5 * t.powi(3)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t + 60.0 * self.a5 * t.powi(2)
    }
}

/// Quartic polynomial for longitudinal velocity keeping
#[derive(Debug, Clone)]
pub struct QuarticPolynomial {
    a0: f64,
    a1: f64,
    a2: f64,
    a3: f64,
    a4: f64,
}

impl QuarticPolynomial {
    /// Solve the five boundary constraints (xs, vxs, axs) at t = 0 and
    /// (vxe, axe) at t = time. The end position is unconstrained.
    pub fn new(xs: f64, vxs: f64, axs: f64, vxe: f64, axe: f64, time: f64) -> Self {
        assert!(time > 0.0, "polynomial duration must be positive");

        let a0 = xs;
        let a1 = vxs;
        let a2 = axs / 2.0;

        let t2 = time * time;
        let t3 = t2 * time;

        // Solve for a3, a4
        let a = nalgebra::Matrix2::new(
            3.0 * t2, 4.0 * t3,
            6.0 * time, 12.0 * t2,
        );

        let b = nalgebra::Vector2::new(
            vxe - a1 - 2.0 * a2 * time,
            axe - 2.0 * a2,
        );

        let x = a.try_inverse().map(|inv| inv * b).unwrap_or(nalgebra::Vector2::zeros());

        QuarticPolynomial {
            a0,
            a1,
            a2,
            a3: x[0],
            a4: x[1],
        }
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0 + self.a1 * t + self.a2 * t.powi(2) + self.a3 * t.powi(3) + self.a4 * t.powi(4)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1 + 2.0 * self.a2 * t + 3.0 * self.a3 * t.powi(2) + 4.0 * self.a4 * t.powi(3)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t + 12.0 * self.a4 * t.powi(2)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t
    }
}
