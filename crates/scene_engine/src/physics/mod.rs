//! Physics module
//!
//! The scene core only needs a single-axis kinematic helper: the vertical
//! jump/fall displacement consumed by camera and character placement. It is
//! not a rigid-body solver.

pub mod jump;

pub use jump::{DisplacementIntegrator, JumpConfig, JumpPhase};
