//! # Scene Engine
//!
//! Hierarchical scene core for a small real-time 3D scene.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-backed node tree with top-down world pose composition
//! - **Orbits**: Nodes whose local position follows an elliptical orbit
//! - **Light Registry**: Stable light handles and per-object light affiliation
//! - **Jump Integrator**: Closed-form vertical jump/fall displacement
//! - **Scene Files**: RON/TOML scene descriptions built into a ready scene
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self) -> Result<Scene, AppError> {
//!         let root = Node::new_static("root", Transform::identity());
//!         Ok(Scene::new(root, 0.0)?)
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         engine.scene_mut().request_jump();
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut app = MyApp;
//!     Engine::run(config, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod camera;
pub mod config;
pub mod error;
pub mod foundation;
pub mod lighting;
pub mod physics;
pub mod scene;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineConfig, EngineError};
pub use error::{SceneError, SceneResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        camera::{CameraMode, CameraRig, CameraRigConfig},
        config::{BuiltScene, Config, ConfigError, SceneConfig},
        foundation::math::{Mat4, Quat, Transform, Vec3, Vec4},
        lighting::{Light, LightHandle, LightRegistry},
        physics::{DisplacementIntegrator, JumpConfig, JumpPhase},
        scene::{Material, Node, NodeId, NodeKind, Orbit, OrbitParameters, RenderItem, RenderLeaf, Scene},
        AppError, Application, Engine, EngineConfig, EngineError, SceneError, SceneResult,
    };
}
