//! Vertical displacement integrator for jump and fall motion
//!
//! State machine `Grounded → Ascending → Descending → Grounded`. A jump is
//! started by an external trigger and finishes on its own: the offset rises
//! under constant deceleration until the vertical velocity reaches zero, then
//! falls under the same gravity until it is back on the ground level, where it
//! snaps to exactly zero.
//!
//! The motion is evaluated in closed form from the time spent in the current
//! phase instead of being accumulated step by step, so the result does not
//! depend on how the frame deltas are split.

use serde::{Deserialize, Serialize};

use crate::error::{validate_timestep, SceneError, SceneResult};

/// Phase of the jump cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    /// Standing on the ground level, offset is exactly zero
    Grounded,
    /// Rising after a jump request
    Ascending,
    /// Falling back from the apex
    Descending,
}

/// Kinematic constants of a jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Upward velocity at the moment of the jump (units per second)
    pub launch_velocity: f32,
    /// Downward acceleration (units per second squared, positive)
    pub gravity: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            launch_velocity: 8.0,
            gravity: 9.8,
        }
    }
}

impl JumpConfig {
    /// Check that both constants are finite and strictly positive
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.launch_velocity.is_finite() && self.launch_velocity > 0.0) {
            return Err(SceneError::InvalidJumpParameters(format!(
                "launch velocity must be finite and positive, got {}",
                self.launch_velocity
            )));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(SceneError::InvalidJumpParameters(format!(
                "gravity must be finite and positive, got {}",
                self.gravity
            )));
        }
        Ok(())
    }

    /// Seconds from launch to apex
    pub fn apex_time(&self) -> f32 {
        self.launch_velocity / self.gravity
    }

    /// Height of the apex above the ground level
    pub fn apex_height(&self) -> f32 {
        self.launch_velocity * self.launch_velocity / (2.0 * self.gravity)
    }

    /// Total seconds spent airborne
    pub fn airtime(&self) -> f32 {
        2.0 * self.apex_time()
    }
}

/// Produces the scalar height offset of a jumping character over time
#[derive(Debug, Clone)]
pub struct DisplacementIntegrator {
    config: JumpConfig,
    ground_level: f32,
    phase: JumpPhase,
    phase_elapsed: f32,
    offset: f32,
    velocity: f32,
}

impl DisplacementIntegrator {
    /// Create a grounded integrator with the default jump constants
    pub fn new(ground_level: f32) -> SceneResult<Self> {
        Self::with_config(ground_level, JumpConfig::default())
    }

    /// Create a grounded integrator with custom jump constants
    pub fn with_config(ground_level: f32, config: JumpConfig) -> SceneResult<Self> {
        config.validate()?;
        check_ground_level(ground_level)?;
        Ok(Self {
            config,
            ground_level,
            phase: JumpPhase::Grounded,
            phase_elapsed: 0.0,
            offset: 0.0,
            velocity: 0.0,
        })
    }

    /// Start a jump if grounded
    ///
    /// Returns whether a jump started. A request while airborne is ignored:
    /// it neither queues nor extends the current jump.
    pub fn request_jump(&mut self) -> bool {
        if self.phase != JumpPhase::Grounded {
            log::trace!("Jump request ignored while {:?}", self.phase);
            return false;
        }
        self.phase = JumpPhase::Ascending;
        self.phase_elapsed = 0.0;
        self.velocity = self.config.launch_velocity;
        log::debug!("Jump started (apex {:.2} in {:.2}s)", self.config.apex_height(), self.config.apex_time());
        true
    }

    /// Advance the jump by `dt` seconds
    ///
    /// Time left over after the apex or the landing carries into the next
    /// phase within the same call, so there is no discontinuity at phase
    /// boundaries. A rejected `dt` leaves the state untouched.
    pub fn tick(&mut self, dt: f32) -> SceneResult<()> {
        validate_timestep(dt)?;
        self.phase_elapsed += dt;

        if self.phase == JumpPhase::Ascending {
            let apex_time = self.config.apex_time();
            if self.phase_elapsed < apex_time {
                let t = self.phase_elapsed;
                self.offset = self.config.launch_velocity * t - 0.5 * self.config.gravity * t * t;
                self.velocity = self.config.launch_velocity - self.config.gravity * t;
                return Ok(());
            }
            self.phase_elapsed -= apex_time;
            self.phase = JumpPhase::Descending;
            log::trace!("Jump apex reached");
        }

        if self.phase == JumpPhase::Descending {
            let t = self.phase_elapsed;
            let height = self.config.apex_height() - 0.5 * self.config.gravity * t * t;
            if height > 0.0 {
                self.offset = height;
                self.velocity = -self.config.gravity * t;
            } else {
                self.land();
            }
        }

        Ok(())
    }

    /// Current phase
    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    /// Whether a jump is in progress
    pub fn is_airborne(&self) -> bool {
        self.phase != JumpPhase::Grounded
    }

    /// Height above the ground level; zero exactly when grounded
    pub fn current_offset(&self) -> f32 {
        self.offset
    }

    /// Absolute height: ground level plus offset
    pub fn current_height(&self) -> f32 {
        self.ground_level + self.offset
    }

    /// Signed vertical velocity (positive while rising)
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Seconds spent in the current phase
    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    /// Configured ground level
    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }

    /// Move the ground reference; the offset stays relative to it
    pub fn set_ground_level(&mut self, ground_level: f32) -> SceneResult<()> {
        check_ground_level(ground_level)?;
        self.ground_level = ground_level;
        Ok(())
    }

    /// Jump constants in use
    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    fn land(&mut self) {
        self.offset = 0.0;
        self.velocity = 0.0;
        self.phase = JumpPhase::Grounded;
        self.phase_elapsed = 0.0;
        log::debug!("Landed");
    }
}

fn check_ground_level(ground_level: f32) -> SceneResult<()> {
    if ground_level.is_finite() {
        Ok(())
    } else {
        Err(SceneError::InvalidJumpParameters(format!("non-finite ground level {}", ground_level)))
    }
}
