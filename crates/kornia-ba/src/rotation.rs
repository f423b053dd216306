//! Angle-axis rotation primitive.
//!
//! The rotation is parameterized by a 3-vector `ω` whose direction is the rotation axis and
//! whose norm is the rotation angle in radians. Points are rotated with Rodrigues' formula.

use crate::Scalar;

/// Squared angle below which the first-order approximation `p + ω × p` is used.
///
/// Near zero the closed form divides by `θ`, so the derivatives would not be defined at the
/// identity rotation. The first-order form is exact up to `O(θ²)` and keeps the Jacobian with
/// respect to `ω` correct at `ω = 0`.
const SMALL_ANGLE_SQ: f64 = f64::EPSILON;

/// Dot product of two 3-vectors.
pub fn dot<T: Scalar>(a: &[T; 3], b: &[T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product `a × b` of two 3-vectors.
pub fn cross<T: Scalar>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Rotate a point by an angle-axis vector.
///
/// # Arguments
///
/// * `angle_axis` - The rotation as an angle-axis vector `ω` (radians).
/// * `point` - The point to rotate.
///
/// # Returns
///
/// The rotated point `R(ω) · p`.
///
/// Example:
/// ```
/// use kornia_ba::rotation::angle_axis_rotate_point;
///
/// let half_pi = std::f64::consts::FRAC_PI_2;
/// let p = angle_axis_rotate_point(&[0.0, 0.0, half_pi], &[1.0, 0.0, 0.0]);
/// assert!((p[0] - 0.0).abs() < 1e-12);
/// assert!((p[1] - 1.0).abs() < 1e-12);
/// ```
pub fn angle_axis_rotate_point<T: Scalar>(angle_axis: &[T; 3], point: &[T; 3]) -> [T; 3] {
    let theta2 = dot(angle_axis, angle_axis);

    if theta2.re() > SMALL_ANGLE_SQ {
        let theta = theta2.sqrt();
        let cos_theta = theta.cos();
        let sin_theta = theta.sin();
        let theta_inverse = theta.recip();

        // unit rotation axis
        let w = [
            angle_axis[0] * theta_inverse,
            angle_axis[1] * theta_inverse,
            angle_axis[2] * theta_inverse,
        ];

        let w_cross_pt = cross(&w, point);
        let tmp = dot(&w, point) * (T::from(1.0_f64) - cos_theta);

        [
            point[0] * cos_theta + w_cross_pt[0] * sin_theta + w[0] * tmp,
            point[1] * cos_theta + w_cross_pt[1] * sin_theta + w[1] * tmp,
            point[2] * cos_theta + w_cross_pt[2] * sin_theta + w[2] * tmp,
        ]
    } else {
        let w_cross_pt = cross(angle_axis, point);

        [
            point[0] + w_cross_pt[0],
            point[1] + w_cross_pt[1],
            point[2] + w_cross_pt[2],
        ]
    }
}
