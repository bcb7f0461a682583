//! Core engine implementation
//!
//! Headless frame loop: the engine owns the [`Scene`] and a [`Timer`] and
//! drives an [`Application`] through its lifecycle.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::Application;
use crate::config::Config;
use crate::error::SceneError;
use crate::foundation::time::{TimeSource, Timer};
use crate::scene::Scene;

/// Main engine struct
///
/// The engine coordinates the scene and manages the main loop.
pub struct Engine {
    scene: Scene,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create an engine around an already built scene
    pub fn new(config: EngineConfig, scene: Scene) -> Result<Self, EngineError> {
        config.validate()?;
        let source = match config.fixed_timestep {
            Some(step) => TimeSource::Fixed(step),
            None => TimeSource::Realtime,
        };
        Ok(Self {
            scene,
            timer: Timer::with_source(source),
            config,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let scene = app
            .initialize()
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;
        let mut engine = Self::new(config, scene)?;

        log::info!("Starting main loop...");

        while engine.running {
            let frame_start = Instant::now();
            engine.timer.update();
            let delta_time = engine.timer.delta_time();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            engine.scene.advance(delta_time)?;

            app.render(&engine)
                .map_err(|e| EngineError::ApplicationError(format!("App render: {}", e)))?;

            if engine.run_finished() {
                engine.running = false;
            } else {
                engine.pace(frame_start);
            }
        }

        app.cleanup(&mut engine);

        log::info!(
            "Engine shutdown complete after {} frame(s), {:.2}s simulated",
            engine.scene.frame_count(),
            engine.scene.elapsed()
        );
        Ok(())
    }

    /// Request engine shutdown at the end of the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The scene context
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene context
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Frames started so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn run_finished(&self) -> bool {
        let frames_done = self
            .config
            .max_frames
            .is_some_and(|max| self.timer.frame_count() >= max);
        let time_done = self
            .config
            .run_seconds
            .is_some_and(|limit| self.timer.total_time() >= limit);
        frames_done || time_done
    }

    /// Sleep off the rest of the frame budget
    fn pace(&self, frame_start: Instant) {
        let Some(fps) = self.config.target_fps else {
            return;
        };
        let budget = Duration::from_secs_f32(1.0 / fps as f32);
        if let Some(remaining) = budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame rate cap; `None` runs frames back to back
    pub target_fps: Option<u32>,

    /// Stop after this many seconds of frame time
    pub run_seconds: Option<f32>,

    /// Stop after this many frames
    pub max_frames: Option<u64>,

    /// Constant `dt` per frame instead of wall-clock time
    pub fixed_timestep: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: Some(60),
            run_seconds: None,
            max_frames: None,
            fixed_timestep: None,
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject a zero frame rate, a negative run time and a bad fixed step
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.target_fps == Some(0) {
            return Err(EngineError::ConfigError("target_fps must be positive".to_string()));
        }
        if let Some(seconds) = self.run_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(EngineError::ConfigError(format!("invalid run_seconds {}", seconds)));
            }
        }
        if let Some(step) = self.fixed_timestep {
            if !step.is_finite() || step <= 0.0 {
                return Err(EngineError::ConfigError(format!("invalid fixed_timestep {}", step)));
            }
        }
        Ok(())
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene rejected a frame
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
