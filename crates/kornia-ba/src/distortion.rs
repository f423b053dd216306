//! Forward lens distortion models applied to normalized image coordinates.

use serde::{Deserialize, Serialize};

use crate::Scalar;

/// A forward distortion model `(x_u, y_u) -> (x_d, y_d)` on normalized coordinates.
pub trait Distortion<T: Scalar> {
    /// Distort a normalized point.
    fn distort(&self, normalized: [T; 2]) -> [T; 2];
}

/// Squared distance of a normalized point to the optical center.
pub fn squared_radius<T: Scalar>(normalized: &[T; 2]) -> T {
    normalized[0] * normalized[0] + normalized[1] * normalized[1]
}

/// Identity distortion used by the plain pinhole model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoDistortion;

impl<T: Scalar> Distortion<T> for NoDistortion {
    fn distort(&self, normalized: [T; 2]) -> [T; 2] {
        normalized
    }
}

/// Radial distortion with a single coefficient.
///
/// `x_d = x_u · (1 + k1·r²)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialK1<T = f64> {
    /// The first radial distortion coefficient
    pub k1: T,
}

impl<T: Scalar> RadialK1<T> {
    /// Creates the distortion from its coefficient.
    pub fn new(k1: T) -> Self {
        Self { k1 }
    }

    /// Radial scale factor `1 + k1·r²` for a squared radius `r²`.
    pub fn scale(&self, r2: T) -> T {
        T::from(1.0_f64) + self.k1 * r2
    }
}

impl<T: Scalar> Distortion<T> for RadialK1<T> {
    fn distort(&self, normalized: [T; 2]) -> [T; 2] {
        let r_coeff = self.scale(squared_radius(&normalized));
        [normalized[0] * r_coeff, normalized[1] * r_coeff]
    }
}

/// Radial distortion with three coefficients.
///
/// `x_d = x_u · (1 + k1·r² + k2·r⁴ + k3·r⁶)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialK3<T = f64> {
    /// The first radial distortion coefficient
    pub k1: T,
    /// The second radial distortion coefficient
    pub k2: T,
    /// The third radial distortion coefficient
    pub k3: T,
}

impl<T: Scalar> RadialK3<T> {
    /// Creates the distortion from its coefficients.
    pub fn new(k1: T, k2: T, k3: T) -> Self {
        Self { k1, k2, k3 }
    }

    /// Radial scale factor `1 + k1·r² + k2·r⁴ + k3·r⁶` for a squared radius `r²`.
    pub fn scale(&self, r2: T) -> T {
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        T::from(1.0_f64) + self.k1 * r2 + self.k2 * r4 + self.k3 * r6
    }
}

impl<T: Scalar> Distortion<T> for RadialK3<T> {
    fn distort(&self, normalized: [T; 2]) -> [T; 2] {
        let r_coeff = self.scale(squared_radius(&normalized));
        [normalized[0] * r_coeff, normalized[1] * r_coeff]
    }
}
