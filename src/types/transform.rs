//! Rigid transforms for scene components.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and XYZ Euler rotation of a component, in world units and radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl Transform {
    pub fn new(position: [f32; 3], rotation: [f32; 3]) -> Self {
        Self { position, rotation }
    }

    /// Rotation as a quaternion (intrinsic X, then Y, then Z).
    pub fn quat(&self) -> Quat {
        euler_quat(self.rotation)
    }

    /// Full model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.quat(), Vec3::from(self.position))
    }

    /// Transform a point from local to world space.
    pub fn apply(&self, point: [f32; 3]) -> [f32; 3] {
        self.matrix().transform_point3(Vec3::from(point)).to_array()
    }

    /// Rotate a direction (normals are unaffected by translation).
    pub fn rotate(&self, dir: [f32; 3]) -> [f32; 3] {
        (self.quat() * Vec3::from(dir)).to_array()
    }
}

/// Quaternion for an XYZ Euler triple.
pub fn euler_quat(rotation: [f32; 3]) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation[0], rotation[1], rotation[2])
}

/// Express a child placed at `local` inside a group rotated by `group_rotation`
/// as a single world transform.
pub fn compose_group(group_rotation: [f32; 3], local: [f32; 3]) -> Transform {
    let rotated = euler_quat(group_rotation) * Vec3::from(local);
    Transform::new(rotated.to_array(), group_rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::default();
        assert!(approx(t.apply([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_y_rotation_then_translation() {
        let t = Transform::new([1.0, 0.0, 0.0], [0.0, FRAC_PI_2, 0.0]);
        // +X rotated a quarter turn about Y points to -Z
        assert!(approx(t.rotate([1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]));
        assert!(approx(t.apply([1.0, 0.0, 0.0]), [1.0, 0.0, -1.0]));
    }

    #[test]
    fn test_compose_group_keeps_rotation() {
        let t = compose_group([0.0, FRAC_PI_2, 0.0], [0.5, -2.1, 0.0]);
        assert_eq!(t.rotation, [0.0, FRAC_PI_2, 0.0]);
        assert!(approx(t.position, [0.0, -2.1, -0.5]));
    }
}
