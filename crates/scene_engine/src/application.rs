//! Application trait and lifecycle management

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::error::SceneError;
use crate::foundation::math::matrix_translation;
use crate::scene::Scene;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the [`Engine`] loop. Per frame
/// the engine calls `update`, advances the scene, then calls `render`.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the loop starts. Returns the scene the engine
    /// will own for the rest of the run.
    fn initialize(&mut self) -> Result<Scene, AppError>;

    /// Update the application
    ///
    /// Called every frame before the scene advances. Implement input handling
    /// and game logic here (e.g. request a jump).
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Render the application
    ///
    /// Called after the scene has advanced, so world poses are current.
    fn render(&mut self, engine: &Engine) -> Result<(), AppError> {
        for item in engine.scene().render_items() {
            log::trace!("Draw '{}' ({}) at {:?}", item.leaf.name, item.leaf.asset, matrix_translation(&item.world));
        }
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once after the loop exits.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene core error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
