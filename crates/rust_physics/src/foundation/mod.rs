//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Time management and the fixed simulation clock
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
