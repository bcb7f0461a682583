//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene core:
//! - Math types and the validated node transform
//! - Frame timing
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
