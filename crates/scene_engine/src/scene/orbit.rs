//! Orbital motion for orbiting scene nodes
//!
//! An orbiting node's local position is not set directly: it is derived each
//! frame from a running orbit angle. The curve is a standard ellipse centred on
//! the parent's origin,
//!
//! ```text
//! a = radius
//! b = radius * sqrt(1 - eccentricity²)
//! p(θ) = Rx(inclination) * (a·cos θ, 0, b·sin θ)
//! ```
//!
//! so eccentricity 0 is a circle in the parent's XZ plane and radius 0 keeps
//! the node on the parent's origin.

use serde::{Deserialize, Serialize};

use crate::error::{validate_timestep, SceneError, SceneResult};
use crate::foundation::math::{constants::TAU, utils, Quat, Transform, Vec3};

/// Shape and speed of an orbit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParameters {
    /// Radians per second; the sign selects the direction of travel
    pub angular_speed: f32,
    /// Semi-major axis, distance from the parent's origin
    pub radius: f32,
    /// 0 for a circle, towards 1 for an increasingly flat ellipse
    pub eccentricity: f32,
    /// Tilt of the orbit plane about the parent's X axis (radians)
    pub inclination: f32,
    /// Turn the node's -Z axis towards the direction of travel
    pub face_direction: bool,
}

impl Default for OrbitParameters {
    fn default() -> Self {
        Self {
            angular_speed: 0.0,
            radius: 0.0,
            eccentricity: 0.0,
            inclination: 0.0,
            face_direction: false,
        }
    }
}

impl OrbitParameters {
    /// Create a flat, non-facing orbit
    pub fn new(angular_speed: f32, radius: f32, eccentricity: f32) -> SceneResult<Self> {
        let params = Self {
            angular_speed,
            radius,
            eccentricity,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Check ranges: finite speed and inclination, radius ≥ 0, eccentricity in [0, 1)
    pub fn validate(&self) -> SceneResult<()> {
        if !self.angular_speed.is_finite() {
            return Err(SceneError::InvalidOrbitParameters(format!(
                "angular speed must be finite, got {}",
                self.angular_speed
            )));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(SceneError::InvalidOrbitParameters(format!(
                "radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        if !(self.eccentricity.is_finite() && (0.0..1.0).contains(&self.eccentricity)) {
            return Err(SceneError::InvalidOrbitParameters(format!(
                "eccentricity must be in [0, 1), got {}",
                self.eccentricity
            )));
        }
        if !self.inclination.is_finite() {
            return Err(SceneError::InvalidOrbitParameters(format!(
                "inclination must be finite, got {}",
                self.inclination
            )));
        }
        Ok(())
    }

    /// Semi-minor axis of the ellipse
    pub fn semi_minor_axis(&self) -> f32 {
        self.radius * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Position on the curve at `angle`, in parent space
    pub fn position_at(&self, angle: f32) -> Vec3 {
        let flat = Vec3::new(
            self.radius * angle.cos(),
            0.0,
            self.semi_minor_axis() * angle.sin(),
        );
        self.plane_rotation() * flat
    }

    /// Direction of travel at `angle` (zero for a degenerate orbit)
    pub fn tangent_at(&self, angle: f32) -> Vec3 {
        let flat = Vec3::new(
            -self.radius * angle.sin(),
            0.0,
            self.semi_minor_axis() * angle.cos(),
        );
        self.plane_rotation() * flat * self.angular_speed.signum()
    }

    /// Normal of the orbit plane
    pub fn plane_normal(&self) -> Vec3 {
        self.plane_rotation() * Vec3::y()
    }

    /// Points along one full revolution, first point repeated at the end
    ///
    /// Used to draw orbit guides.
    pub fn sample_path(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(3);
        (0..=segments)
            .map(|i| self.position_at(TAU * i as f32 / segments as f32))
            .collect()
    }

    fn plane_rotation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), self.inclination)
    }
}

/// Running orbit state: parameters plus the current angle in [0, 2π)
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    params: OrbitParameters,
    angle: f32,
}

impl Orbit {
    /// Create an orbit starting at angle 0
    pub fn new(params: OrbitParameters) -> SceneResult<Self> {
        params.validate()?;
        Ok(Self { params, angle: 0.0 })
    }

    /// Current parameters
    pub fn parameters(&self) -> &OrbitParameters {
        &self.params
    }

    /// Current angle in [0, 2π)
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Replace speed, radius and eccentricity; inclination and facing are kept
    pub fn set_parameters(&mut self, angular_speed: f32, radius: f32, eccentricity: f32) -> SceneResult<()> {
        let params = OrbitParameters {
            angular_speed,
            radius,
            eccentricity,
            ..self.params
        };
        self.replace_parameters(params)
    }

    /// Replace every orbit parameter
    pub fn replace_parameters(&mut self, params: OrbitParameters) -> SceneResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Override the current angle
    pub fn set_angle(&mut self, angle: f32) -> SceneResult<()> {
        if !angle.is_finite() {
            return Err(SceneError::InvalidOrbitParameters(format!("non-finite orbit angle {}", angle)));
        }
        self.angle = utils::wrap_angle(angle);
        Ok(())
    }

    /// Enable or disable facing the direction of travel
    pub fn set_face_direction(&mut self, face_direction: bool) {
        self.params.face_direction = face_direction;
    }

    /// Advance the angle by `angular_speed * dt`, wrapped to [0, 2π)
    ///
    /// A step that overflows leaves the angle untouched.
    pub fn tick(&mut self, dt: f32) -> SceneResult<()> {
        validate_timestep(dt)?;
        let advanced = self.angle + self.params.angular_speed * dt;
        if !advanced.is_finite() {
            return Err(SceneError::InvalidOrbitParameters(format!(
                "orbit angle overflowed: {} rad/s over {}s",
                self.params.angular_speed, dt
            )));
        }
        self.angle = utils::wrap_angle(advanced);
        Ok(())
    }

    /// Position at the current angle, in parent space
    pub fn position(&self) -> Vec3 {
        self.params.position_at(self.angle)
    }

    /// Local transform derived from the current angle
    ///
    /// Only the position comes from the orbit; rotation and scale are taken
    /// from `base`. With facing enabled, the facing rotation is applied on top
    /// of the base rotation.
    pub fn local_transform(&self, base: &Transform) -> SceneResult<Transform> {
        let rotation = if self.params.face_direction {
            self.facing_rotation() * base.rotation()
        } else {
            base.rotation()
        };
        Transform::new(self.position(), rotation, base.scale())
    }

    fn facing_rotation(&self) -> Quat {
        let tangent = self.params.tangent_at(self.angle);
        if tangent.norm_squared() <= f32::EPSILON {
            return Quat::identity();
        }
        // face_towards maps +Z onto the given direction; nodes look down -Z
        Quat::face_towards(&-tangent, &self.params.plane_normal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::{HALF_PI, PI};
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_independent_of_tick_split() {
        let params = OrbitParameters::new(1.3, 5.0, 0.0).unwrap();
        let mut single = Orbit::new(params).unwrap();
        let mut split = Orbit::new(params).unwrap();

        single.tick(10.0).unwrap();
        for _ in 0..10 {
            split.tick(1.0).unwrap();
        }

        let expected = (1.3_f32 * 10.0).rem_euclid(TAU);
        assert_relative_eq!(single.angle(), expected, epsilon = 1e-4);
        assert_relative_eq!(split.angle(), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_negative_speed_wraps_into_range() {
        let mut orbit = Orbit::new(OrbitParameters::new(-2.0, 1.0, 0.0).unwrap()).unwrap();
        orbit.tick(0.25).unwrap();
        assert!(orbit.angle() >= 0.0 && orbit.angle() < TAU);
        assert_relative_eq!(orbit.angle(), TAU - 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_circle_positions() {
        let mut orbit = Orbit::new(OrbitParameters::new(HALF_PI, 2.0, 0.0).unwrap()).unwrap();
        assert_relative_eq!(orbit.position(), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);

        orbit.tick(1.0).unwrap();
        assert_relative_eq!(orbit.position(), Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ellipse_axes() {
        let params = OrbitParameters::new(1.0, 10.0, 0.6).unwrap();
        assert_relative_eq!(params.semi_minor_axis(), 8.0, epsilon = 1e-5);
        assert_relative_eq!(params.position_at(0.0), Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(params.position_at(HALF_PI), Vec3::new(0.0, 0.0, 8.0), epsilon = 1e-4);
        assert_relative_eq!(params.position_at(PI), Vec3::new(-10.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_inclination_tilts_plane() {
        let params = OrbitParameters {
            inclination: HALF_PI,
            ..OrbitParameters::new(1.0, 3.0, 0.0).unwrap()
        };
        // Rotating the XZ plane 90° about X sends +Z to -Y
        assert_relative_eq!(params.position_at(HALF_PI), Vec3::new(0.0, -3.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_radius_is_stationary() {
        let mut orbit = Orbit::new(OrbitParameters::new(3.0, 0.0, 0.5).unwrap()).unwrap();
        orbit.set_face_direction(true);
        for _ in 0..5 {
            orbit.tick(0.7).unwrap();
            let local = orbit.local_transform(&Transform::identity()).unwrap();
            assert_eq!(local.position(), Vec3::zeros());
            assert_relative_eq!(local.rotation(), Quat::identity(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_base_rotation_and_scale_preserved() {
        let base = Transform::from_euler(Vec3::new(9.0, 9.0, 9.0), Vec3::new(0.3, 0.2, 0.1), Vec3::new(2.0, 2.0, 2.0)).unwrap();
        let orbit = Orbit::new(OrbitParameters::new(1.0, 4.0, 0.0).unwrap()).unwrap();
        let local = orbit.local_transform(&base).unwrap();

        assert_relative_eq!(local.position(), Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(local.rotation(), base.rotation());
        assert_eq!(local.scale(), base.scale());
    }

    #[test]
    fn test_facing_points_forward_along_tangent() {
        let mut orbit = Orbit::new(OrbitParameters::new(1.0, 5.0, 0.0).unwrap()).unwrap();
        orbit.set_face_direction(true);
        orbit.set_angle(0.0).unwrap();

        let local = orbit.local_transform(&Transform::identity()).unwrap();
        let forward = local.rotation() * Vec3::new(0.0, 0.0, -1.0);

        // At θ = 0 with positive speed the node moves towards +Z
        assert_relative_eq!(forward, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(OrbitParameters::new(f32::NAN, 1.0, 0.0), Err(SceneError::InvalidOrbitParameters(_))));
        assert!(OrbitParameters::new(f32::INFINITY, 1.0, 0.0).is_err());
        assert!(OrbitParameters::new(1.0, -1.0, 0.0).is_err());
        assert!(OrbitParameters::new(1.0, 1.0, 1.0).is_err());
        assert!(OrbitParameters::new(1.0, 1.0, -0.1).is_err());
    }

    #[test]
    fn test_rejected_updates_leave_state() {
        let mut orbit = Orbit::new(OrbitParameters::new(1.0, 2.0, 0.1).unwrap()).unwrap();
        orbit.tick(0.5).unwrap();
        let before = orbit.clone();

        assert!(orbit.set_parameters(f32::NAN, 2.0, 0.1).is_err());
        assert!(orbit.set_angle(f32::INFINITY).is_err());
        assert!(matches!(orbit.tick(-1.0), Err(SceneError::InvalidTimestep(_))));
        assert!(orbit.tick(f32::NAN).is_err());

        assert_eq!(orbit, before);
    }

    #[test]
    fn test_overflowing_tick_leaves_angle() {
        let mut orbit = Orbit::new(OrbitParameters::new(3e38, 1.0, 0.0).unwrap()).unwrap();
        orbit.tick(1e-38).unwrap();
        let before = orbit.clone();

        assert!(matches!(orbit.tick(10.0), Err(SceneError::InvalidOrbitParameters(_))));
        assert_eq!(orbit, before);
        assert!(orbit.angle().is_finite());
    }

    #[test]
    fn test_sample_path_closes() {
        let params = OrbitParameters::new(0.05, 1000.0, 0.95).unwrap();
        let path = params.sample_path(64);
        assert_eq!(path.len(), 65);
        assert_relative_eq!(path[0], path[64], epsilon = 1e-2);
        assert!(path.iter().all(|p| p.x.abs() <= 1000.0 + 1e-2));
    }
}
