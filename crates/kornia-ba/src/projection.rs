//! Shared projection pipeline: rigid transform followed by the perspective divide.

use crate::pose::Pose;
use crate::Scalar;

/// Number of values in a 3D point parameter block.
pub const POINT_DIM: usize = 3;

/// Reads a 3D point from a flat 3-value block.
pub fn point_from_block<T: Scalar>(block: &[T]) -> [T; 3] {
    debug_assert_eq!(block.len(), POINT_DIM, "point must have 3 params");
    [block[0], block[1], block[2]]
}

/// Transform a camera-frame point from homogeneous to normalized image coordinates.
///
/// The depth is not checked: a zero depth yields non-finite coordinates and a negative depth
/// yields a mirrored projection. Rejecting such points is left to the caller.
pub fn perspective_divide<T: Scalar>(point_cam: &[T; 3]) -> [T; 2] {
    [point_cam[0] / point_cam[2], point_cam[1] / point_cam[2]]
}

/// Project a world point to undistorted normalized image coordinates.
///
/// # Arguments
///
/// * `pose` - The camera pose mapping world points into the camera frame.
/// * `point` - The 3D point in world coordinates.
///
/// # Returns
///
/// The normalized coordinates `(x_u, y_u)` of the point.
pub fn project_point<T: Scalar>(pose: &Pose<T>, point: &[T; 3]) -> [T; 2] {
    perspective_divide(&pose.transform_point(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perspective_divide() {
        let uv = perspective_divide(&[2.0f64, -4.0, 8.0]);
        assert_eq!(uv, [0.25, -0.5]);
    }

    #[test]
    fn test_perspective_divide_zero_depth() {
        let uv = perspective_divide(&[1.0f64, 0.0, 0.0]);
        assert!(uv[0].is_infinite());
        assert!(uv[1].is_nan());
    }

    #[test]
    fn test_perspective_divide_negative_depth_flips() {
        let uv = perspective_divide(&[1.0f64, 2.0, -2.0]);
        assert_eq!(uv, [-0.5, -1.0]);
    }

    #[test]
    fn test_project_point_translation() {
        let pose = Pose::<f64>::new([0.0; 3], [1.0, -1.0, 5.0]);
        let uv = project_point(&pose, &[1.0, 1.0, 5.0]);
        assert_relative_eq!(uv[0], 0.2);
        assert_relative_eq!(uv[1], 0.0);
    }

    #[test]
    fn test_point_from_block() {
        assert_eq!(point_from_block(&[1.0f64, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }
}
