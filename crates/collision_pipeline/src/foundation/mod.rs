//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the pipeline:
//! - Math types (2D vectors and rectangles)
//! - Time management
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
