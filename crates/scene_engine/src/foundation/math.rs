//! Math utilities and types
//!
//! Provides the fundamental math types for the scene core and the validated
//! [`Transform`] used by every scene node.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

use crate::error::{SceneError, SceneResult};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local position, rotation and scale of a node relative to its parent
///
/// Fields are only writable through validating setters, so a `Transform`
/// value always holds finite components and a non-negative scale. A rejected
/// write leaves the previous value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from all three components
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> SceneResult<Self> {
        check_position(&position)?;
        check_rotation(&rotation)?;
        check_scale(&scale)?;
        Ok(Self { position, rotation, scale })
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> SceneResult<Self> {
        Self::new(position, Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
    }

    /// Create a transform from Euler angles in radians (nalgebra roll, pitch, yaw order)
    ///
    /// Each angle is wrapped into (-π, π] before the rotation is built.
    pub fn from_euler(position: Vec3, euler: Vec3, scale: Vec3) -> SceneResult<Self> {
        let rotation = euler_rotation(&euler)?;
        Self::new(position, rotation, scale)
    }

    /// Create a transform from Euler angles in degrees
    pub fn from_euler_degrees(position: Vec3, degrees: Vec3, scale: Vec3) -> SceneResult<Self> {
        Self::from_euler(position, degrees * constants::DEG_TO_RAD, scale)
    }

    /// Position relative to the parent
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation relative to the parent
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Scale factors
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace the position
    pub fn set_position(&mut self, position: Vec3) -> SceneResult<()> {
        check_position(&position)?;
        self.position = position;
        Ok(())
    }

    /// Replace the rotation
    pub fn set_rotation(&mut self, rotation: Quat) -> SceneResult<()> {
        check_rotation(&rotation)?;
        self.rotation = rotation;
        Ok(())
    }

    /// Replace the rotation from Euler angles in radians
    pub fn set_rotation_euler(&mut self, euler: Vec3) -> SceneResult<()> {
        self.rotation = euler_rotation(&euler)?;
        Ok(())
    }

    /// Replace the scale
    pub fn set_scale(&mut self, scale: Vec3) -> SceneResult<()> {
        check_scale(&scale)?;
        self.scale = scale;
        Ok(())
    }

    /// Convert to a transformation matrix (translate, then rotate, then scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Compose this local transform with the parent's world matrix
    ///
    /// `world = parent * T * R * S`. Pure: depends only on `parent` and
    /// `self`. A non-finite parent matrix is rejected so a corrupt pose never
    /// propagates further down the tree.
    pub fn world_matrix(&self, parent: &Mat4) -> SceneResult<Mat4> {
        if !is_finite_matrix(parent) {
            return Err(SceneError::InvalidTransform(
                "parent world matrix contains non-finite values".to_string(),
            ));
        }
        Ok(parent * self.to_matrix())
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// True when every element of the matrix is finite
pub fn is_finite_matrix(matrix: &Mat4) -> bool {
    matrix.iter().all(|value| value.is_finite())
}

/// Translation column of an affine world matrix
pub fn matrix_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

fn check_position(position: &Vec3) -> SceneResult<()> {
    if position.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::InvalidTransform(format!("non-finite position {:?}", position)))
    }
}

fn check_rotation(rotation: &Quat) -> SceneResult<()> {
    if rotation.coords.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::InvalidTransform(format!("non-finite rotation {:?}", rotation)))
    }
}

fn check_scale(scale: &Vec3) -> SceneResult<()> {
    if scale.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(SceneError::InvalidTransform(format!(
            "scale must be finite and non-negative, got {:?}",
            scale
        )))
    }
}

fn euler_rotation(euler: &Vec3) -> SceneResult<Quat> {
    if !euler.iter().all(|v| v.is_finite()) {
        return Err(SceneError::InvalidTransform(format!("non-finite rotation angles {:?}", euler)));
    }
    Ok(Quat::from_euler_angles(
        utils::wrap_angle_signed(euler.x),
        utils::wrap_angle_signed(euler.y),
        utils::wrap_angle_signed(euler.z),
    ))
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Wrap an angle into [0, 2π)
    pub fn wrap_angle(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(constants::TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= constants::TAU { 0.0 } else { wrapped }
    }

    /// Wrap an angle into (-π, π]
    pub fn wrap_angle_signed(angle: f32) -> f32 {
        let wrapped = wrap_angle(angle);
        if wrapped > constants::PI { wrapped - constants::TAU } else { wrapped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::constants::{HALF_PI, PI, TAU};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_matrix() {
        assert_relative_eq!(Transform::identity().to_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_translate_rotate_scale_order() {
        // Scale first, then rotate 90° about Y, then translate
        let transform = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI),
            Vec3::new(2.0, 2.0, 2.0),
        ).unwrap();

        let moved = transform.transform_point(Point3::new(1.0, 0.0, 0.0));

        // (1,0,0) scaled → (2,0,0), rotated about +Y → (0,0,-2), translated → (10,0,-2)
        assert_relative_eq!(moved, Point3::new(10.0, 0.0, -2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_world_matrix_composes_with_parent() {
        let parent = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let child = Transform::from_position(Vec3::new(4.0, 5.0, 6.0)).unwrap();

        let parent_world = parent.world_matrix(&Mat4::identity()).unwrap();
        let child_world = child.world_matrix(&parent_world).unwrap();

        assert_relative_eq!(matrix_translation(&child_world), Vec3::new(5.0, 7.0, 9.0), epsilon = EPSILON);
    }

    #[test]
    fn test_non_finite_construction_rejected() {
        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        let inf = Vec3::new(0.0, f32::INFINITY, 0.0);
        let one = Vec3::new(1.0, 1.0, 1.0);

        assert!(matches!(Transform::from_position(nan), Err(SceneError::InvalidTransform(_))));
        assert!(matches!(Transform::from_euler(Vec3::zeros(), inf, one), Err(SceneError::InvalidTransform(_))));
        assert!(matches!(Transform::from_euler(Vec3::zeros(), Vec3::zeros(), nan), Err(SceneError::InvalidTransform(_))));
        assert!(matches!(
            Transform::from_euler(Vec3::zeros(), Vec3::zeros(), Vec3::new(-1.0, 1.0, 1.0)),
            Err(SceneError::InvalidTransform(_))
        ));
    }

    #[test]
    fn test_rejected_setter_leaves_state_untouched() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let before = transform.clone();

        assert!(transform.set_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_err());
        assert!(transform.set_scale(Vec3::new(1.0, f32::INFINITY, 1.0)).is_err());
        assert!(transform.set_rotation_euler(Vec3::new(0.0, 0.0, f32::NAN)).is_err());

        assert_eq!(transform, before);
    }

    #[test]
    fn test_non_finite_parent_rejected() {
        let mut parent = Mat4::identity();
        parent[(0, 3)] = f32::NAN;
        assert!(Transform::identity().world_matrix(&parent).is_err());
    }

    #[test]
    fn test_euler_angles_are_wrapped() {
        let wrapped = Transform::from_euler(Vec3::zeros(), Vec3::new(0.0, 3.0 * TAU + 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let direct = Transform::from_euler(Vec3::zeros(), Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(wrapped.to_matrix(), direct.to_matrix(), epsilon = 1e-4);
    }

    #[test]
    fn test_degrees_constructor() {
        let from_degrees = Transform::from_euler_degrees(Vec3::zeros(), Vec3::new(-90.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let from_radians = Transform::from_euler(Vec3::zeros(), Vec3::new(-HALF_PI, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(from_degrees.to_matrix(), from_radians.to_matrix(), epsilon = EPSILON);
    }

    #[test]
    fn test_wrap_angle_ranges() {
        assert_relative_eq!(utils::wrap_angle(TAU + 1.0), 1.0, epsilon = EPSILON);
        assert_relative_eq!(utils::wrap_angle(-1.0), TAU - 1.0, epsilon = EPSILON);
        assert!(utils::wrap_angle(-1e-9) < TAU);
        assert_relative_eq!(utils::wrap_angle_signed(PI + 0.5), -PI + 0.5, epsilon = EPSILON);
        assert_relative_eq!(utils::wrap_angle_signed(PI), PI, epsilon = EPSILON);
    }
}
