//! # Camera Rig
//!
//! Places the player camera relative to the player position, following the
//! jump integrator's vertical offset. Two modes are supported:
//!
//! - **First person**: eye at head height, nudged slightly forward so the
//!   near plane does not clip the player's own model
//! - **Third person**: eye at head height, pulled back along the view
//!   direction and looking at the player's head
//!
//! The rig only reads the jump offset; it never drives the integrator.

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Mat4, Point3, Vec3};

/// Smallest horizontal extent a view direction may have; `look_at_rh` with
/// `Vec3::y()` as up degenerates for directions closer to vertical
const MIN_HORIZONTAL_EXTENT: f32 = 1e-3;

/// Camera placement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Eye at the player's head
    FirstPerson,
    /// Eye behind the player
    ThirdPerson,
}

/// Tunable rig distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRigConfig {
    /// Starting mode
    pub mode: CameraMode,
    /// Eye height above the player position in first person
    pub first_person_height: f32,
    /// Distance the first-person eye is pushed along the view direction
    pub first_person_nudge: f32,
    /// Eye height above the player position in third person
    pub third_person_height: f32,
    /// Distance the third-person eye is pulled back from the player
    pub follow_distance: f32,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            first_person_height: 2.5,
            first_person_nudge: 0.37,
            third_person_height: 2.7,
            follow_distance: 5.0,
        }
    }
}

impl CameraRigConfig {
    /// Reject non-finite distances and a follow distance that is not positive
    pub fn validate(&self) -> SceneResult<()> {
        let values = [
            self.first_person_height,
            self.first_person_nudge,
            self.third_person_height,
            self.follow_distance,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SceneError::InvalidTransform(format!("non-finite camera rig distance in {:?}", self)));
        }
        if self.follow_distance <= 0.0 {
            return Err(SceneError::InvalidTransform(format!(
                "follow distance must be positive, got {}",
                self.follow_distance
            )));
        }
        Ok(())
    }
}

/// Player camera that follows position, view direction and jump offset
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraRigConfig,
    mode: CameraMode,
    player_position: Vec3,
    forward: Vec3,
}

impl CameraRig {
    /// Create a rig at the origin looking down -Z
    pub fn new(config: CameraRigConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            mode: config.mode,
            config,
            player_position: Vec3::zeros(),
            forward: Vec3::new(0.0, 0.0, -1.0),
        })
    }

    /// Current mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switch mode explicitly
    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    /// Flip between first and third person, returning the new mode
    pub fn toggle_mode(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        };
        log::info!("Camera mode: {:?}", self.mode);
        self.mode
    }

    /// Player position on the ground
    pub fn player_position(&self) -> Vec3 {
        self.player_position
    }

    /// Move the player
    pub fn set_player_position(&mut self, position: Vec3) -> SceneResult<()> {
        if !position.iter().all(|c| c.is_finite()) {
            return Err(SceneError::InvalidTransform(format!("non-finite player position {:?}", position)));
        }
        self.player_position = position;
        Ok(())
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Change the view direction
    ///
    /// The direction is normalized. Zero, non-finite and vertical directions
    /// are rejected since no view matrix can be built for them.
    pub fn set_forward(&mut self, forward: Vec3) -> SceneResult<()> {
        if !forward.iter().all(|c| c.is_finite()) || forward.norm_squared() <= f32::EPSILON {
            return Err(SceneError::InvalidTransform(format!("invalid view direction {:?}", forward)));
        }
        let forward = forward.normalize();
        if forward.cross(&Vec3::y()).norm() < MIN_HORIZONTAL_EXTENT {
            return Err(SceneError::InvalidTransform(format!("vertical view direction {:?}", forward)));
        }
        self.forward = forward;
        Ok(())
    }

    /// Eye position for the current mode, lifted by `jump_offset`
    pub fn eye(&self, jump_offset: f32) -> Vec3 {
        match self.mode {
            CameraMode::FirstPerson => {
                self.head(self.config.first_person_height, jump_offset)
                    + self.forward * self.config.first_person_nudge
            }
            CameraMode::ThirdPerson => {
                self.head(self.config.third_person_height, jump_offset)
                    - self.forward * self.config.follow_distance
            }
        }
    }

    /// Point the eye looks at
    pub fn target(&self, jump_offset: f32) -> Vec3 {
        match self.mode {
            CameraMode::FirstPerson => self.eye(jump_offset) + self.forward,
            CameraMode::ThirdPerson => self.head(self.config.third_person_height, jump_offset),
        }
    }

    /// Right-handed view matrix for the current placement
    pub fn view_matrix(&self, jump_offset: f32) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.eye(jump_offset)),
            &Point3::from(self.target(jump_offset)),
            &Vec3::y(),
        )
    }

    fn head(&self, height: f32, jump_offset: f32) -> Vec3 {
        self.player_position + Vec3::new(0.0, height + jump_offset, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_person_eye() {
        let mut rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        rig.set_player_position(Vec3::new(1.0, 0.0, 2.0)).unwrap();

        assert_relative_eq!(rig.eye(0.0), Vec3::new(1.0, 2.5, 2.0 - 0.37), epsilon = 1e-6);
        assert_relative_eq!(rig.eye(1.5), Vec3::new(1.0, 4.0, 2.0 - 0.37), epsilon = 1e-6);
    }

    #[test]
    fn test_third_person_eye_looks_at_head() {
        let mut rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        rig.set_forward(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(rig.toggle_mode(), CameraMode::ThirdPerson);

        assert_relative_eq!(rig.eye(0.0), Vec3::new(-5.0, 2.7, 0.0), epsilon = 1e-6);
        assert_relative_eq!(rig.target(0.5), Vec3::new(0.0, 3.2, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        rig.toggle_mode();
        assert_eq!(rig.toggle_mode(), CameraMode::FirstPerson);
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        let view = rig.view_matrix(0.0);
        let eye = rig.eye(0.0);

        let mapped = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(mapped.coords, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        assert!(rig.set_forward(Vec3::zeros()).is_err());
        assert!(rig.set_player_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_err());
        assert_eq!(rig.forward(), Vec3::new(0.0, 0.0, -1.0));

        let bad = CameraRigConfig { follow_distance: -1.0, ..Default::default() };
        assert!(CameraRig::new(bad).is_err());
        let zero = CameraRigConfig { follow_distance: 0.0, ..Default::default() };
        assert!(CameraRig::new(zero).is_err());
    }

    #[test]
    fn test_vertical_view_direction_rejected() {
        let mut rig = CameraRig::new(CameraRigConfig::default()).unwrap();
        rig.set_forward(Vec3::new(1.0, 0.0, 0.0)).unwrap();

        for vertical in [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -3.0, 0.0), Vec3::new(1e-6, 1.0, 0.0)] {
            assert!(matches!(rig.set_forward(vertical), Err(SceneError::InvalidTransform(_))));
        }
        assert_eq!(rig.forward(), Vec3::new(1.0, 0.0, 0.0));

        // Steep but not vertical still yields a usable view in both modes
        rig.set_forward(Vec3::new(0.0, 1.0, 0.1)).unwrap();
        for _ in 0..2 {
            let view = rig.view_matrix(0.5);
            assert!(view.iter().all(|value| value.is_finite()));
            rig.toggle_mode();
        }
    }
}
