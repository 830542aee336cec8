//! Natural cubic spline interpolation.
//!
//! Second derivatives are solved once at construction (tridiagonal system,
//! Thomas algorithm) with zero curvature at both end knots. Two knots give a
//! straight line.

use crate::error::{Error, Result};

/// Natural cubic spline through strictly increasing knots.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl CubicSpline {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let name = "spline";
        if xs.len() != ys.len() {
            return Err(Error::LengthMismatch {
                name: name.to_string(),
                energies: xs.len(),
                values: ys.len(),
            });
        }
        let n = xs.len();
        if n < 2 {
            return Err(Error::InsufficientPoints {
                name: name.to_string(),
                got: n,
            });
        }
        if let Some(i) = xs.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(Error::NotAscending {
                name: name.to_string(),
                index: i + 1,
            });
        }

        let mut m = vec![0.0; n];
        if n > 2 {
            let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
            // Forward sweep over interior knots 1..n-1.
            let interior = n - 2;
            let mut c_prime = vec![0.0; interior];
            let mut d_prime = vec![0.0; interior];
            for k in 0..interior {
                let i = k + 1;
                let a = h[i - 1];
                let b = 2.0 * (h[i - 1] + h[i]);
                let c = h[i];
                let d = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
                if k == 0 {
                    c_prime[k] = c / b;
                    d_prime[k] = d / b;
                } else {
                    let denom = b - a * c_prime[k - 1];
                    c_prime[k] = c / denom;
                    d_prime[k] = (d - a * d_prime[k - 1]) / denom;
                }
            }
            for k in (0..interior).rev() {
                let next = if k + 1 < interior { m[k + 2] } else { 0.0 };
                m[k + 1] = d_prime[k] - c_prime[k] * next;
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.xs[0]
    }

    pub fn x_max(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    /// Spline value at `x`. Outside the knot range the end polynomials are
    /// extended; callers that must not extrapolate clamp `x` first.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.xs.len() - 1;
        let hi = self.xs.partition_point(|&k| k <= x).clamp(1, last);
        let lo = hi - 1;
        let (x0, x1) = (self.xs[lo], self.xs[hi]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;
        self.m[lo] * a * a * a / (6.0 * h)
            + self.m[hi] * b * b * b / (6.0 * h)
            + (self.ys[lo] / h - self.m[lo] * h / 6.0) * a
            + (self.ys[hi] / h - self.m[hi] * h / 6.0) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_knots() {
        let xs = [1.0, 1.5, 2.3, 3.0, 4.2];
        let ys = [0.1, 0.35, 0.2, 0.5, 0.05];
        let s = CubicSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(&ys) {
            assert!((s.eval(x) - y).abs() < 1e-12, "x={x}");
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let s = CubicSpline::new(&[1.0, 3.0], &[0.0, 1.0]).unwrap();
        assert!((s.eval(2.0) - 0.5).abs() < 1e-12);
        assert!((s.eval(1.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_reproduces_straight_line_exactly() {
        let xs = [0.0, 0.7, 1.1, 2.5, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let s = CubicSpline::new(&xs, &ys).unwrap();
        for x in [0.1, 0.9, 1.8, 3.3] {
            assert!((s.eval(x) - (2.0 * x + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_natural_boundary_curvature() {
        // Symmetric bump: the natural spline is symmetric too.
        let s = CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!((s.eval(0.5) - s.eval(1.5)).abs() < 1e-12);
        // M1 = -3 for this data, giving 0.6875 at the quarter points.
        assert!((s.eval(0.5) - 0.6875).abs() < 1e-12);
    }

    #[test]
    fn test_range() {
        let s = CubicSpline::new(&[1.5, 2.0, 3.5], &[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(s.x_min(), 1.5);
        assert_eq!(s.x_max(), 3.5);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(CubicSpline::new(&[1.0], &[1.0]).is_err());
        assert!(CubicSpline::new(&[1.0, 0.5], &[1.0, 2.0]).is_err());
        assert!(CubicSpline::new(&[1.0, 2.0], &[1.0]).is_err());
    }
}
