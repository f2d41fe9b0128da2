use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Closest approach two lines may have and still count as intersecting
const LINE_INTERSECTION_TOLERANCE: f32 = 0.01;

/// A world-space position and orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[must_use]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unit vector this pose is facing along
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Rotation about the up axis by the given angle in degrees.
///
/// A positive angle turns the forward axis (`+Z`) toward `+X`.
#[must_use]
pub fn yaw(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

/// Turns a track orientation around so it faces the opposite way along the track.
///
/// The half turn is applied about the rotation's own up axis, so banked or
/// sloped orientations keep their up vector.
#[must_use]
pub fn invert_track_rotation(rotation: Quat) -> Quat {
    rotation * Quat::from_rotation_y(std::f32::consts::PI)
}

/// Smallest angle in degrees between two orientations.
///
/// Returns a value in the range [0, 180]. `q` and `-q` describe the same
/// orientation and compare as equal.
///
/// # Examples
/// ```
/// use track_graph::geometry::{angle_between, yaw};
///
/// let diff = angle_between(yaw(10.0), yaw(40.0));
/// assert!((diff - 30.0).abs() < 1e-3);
/// ```
#[must_use]
pub fn angle_between(a: Quat, b: Quat) -> f32 {
    // atan2 stays accurate near zero where acos of the dot product does not
    let delta = a.normalize().conjugate() * b.normalize();
    (2.0 * delta.xyz().length().atan2(delta.w.abs())).to_degrees()
}

/// Intersection of two 3D lines.
///
/// Returns the intersection point together with the line parameters `s` and `t`
/// such that `point = p1 + s * d1 = p2 + t * d2`. Lines that are parallel or
/// that pass each other without meeting yield `None`.
///
/// # Arguments
/// * `p1` - A point on the first line
/// * `d1` - Direction of the first line
/// * `p2` - A point on the second line
/// * `d2` - Direction of the second line
#[must_use]
pub fn line_line_intersection(p1: Vec3, d1: Vec3, p2: Vec3, d2: Vec3) -> Option<(Vec3, f32, f32)> {
    let between = p2 - p1;
    let cross = d1.cross(d2);
    let cross_sq = cross.length_squared();

    // Parallel or degenerate directions
    if cross_sq < 1e-8 {
        return None;
    }

    // Distance between the two lines along their common normal
    let skew = between.dot(cross).abs() / cross_sq.sqrt();
    if skew > LINE_INTERSECTION_TOLERANCE {
        return None;
    }

    let s = between.cross(d2).dot(cross) / cross_sq;
    let t = between.cross(d1).dot(cross) / cross_sq;
    Some((p1 + d1 * s, s, t))
}

#[cfg(test)]
pub(crate) fn assert_vec_eq(actual: Vec3, expected: Vec3, tolerance: f32) {
    assert!(
        actual.abs_diff_eq(expected, tolerance),
        "expected {expected:?}, got {actual:?} (tolerance {tolerance})"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_turns_forward_toward_positive_x() {
        let forward = yaw(90.0) * Vec3::Z;
        assert_vec_eq(forward, Vec3::X, 1e-6);
    }

    #[test]
    fn test_invert_track_rotation_reverses_forward() {
        let rotation = yaw(30.0);
        let forward = rotation * Vec3::Z;
        let inverted = invert_track_rotation(rotation) * Vec3::Z;
        assert_vec_eq(inverted, -forward, 1e-6);
    }

    #[test]
    fn test_invert_track_rotation_keeps_up() {
        let rotation = Quat::from_rotation_x(0.2) * yaw(45.0);
        let up = rotation * Vec3::Y;
        let inverted_up = invert_track_rotation(rotation) * Vec3::Y;
        assert_vec_eq(inverted_up, up, 1e-5);
    }

    #[test]
    fn test_angle_between_identical_is_zero() {
        assert!(angle_between(yaw(12.0), yaw(12.0)) < 1e-2);
    }

    #[test]
    fn test_angle_between_treats_negated_quaternion_as_equal() {
        let q = yaw(70.0);
        assert!(angle_between(q, -q) < 1e-2);
    }

    #[test]
    fn test_angle_between_half_turn() {
        let diff = angle_between(Quat::IDENTITY, invert_track_rotation(Quat::IDENTITY));
        assert!((diff - 180.0).abs() < 1e-2);
    }

    #[test]
    fn test_line_intersection_crossing() {
        let (point, s, t) = line_line_intersection(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::NEG_X,
        )
        .expect("lines should intersect");

        assert_vec_eq(point, Vec3::new(0.0, 0.0, 10.0), 1e-5);
        assert!((s - 10.0).abs() < 1e-5);
        assert!((t - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_line_intersection_parallel() {
        assert!(line_line_intersection(Vec3::ZERO, Vec3::Z, Vec3::X, Vec3::Z).is_none());
    }

    #[test]
    fn test_line_intersection_skew() {
        let result = line_line_intersection(Vec3::ZERO, Vec3::Z, Vec3::new(5.0, 3.0, 5.0), Vec3::X);
        assert!(result.is_none());
    }

    #[test]
    fn test_pose_forward() {
        let pose = Pose::new(Vec3::ONE, yaw(-90.0));
        assert_vec_eq(pose.forward(), Vec3::NEG_X, 1e-6);
    }
}
