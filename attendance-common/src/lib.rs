//! # Attendance Common Library
//!
//! Shared code for the attendance client crates including:
//! - Error types
//! - Configuration loading and cache folder resolution
//! - The static module catalog
//! - Timestamp utilities

pub mod catalog;
pub mod config;
pub mod error;
pub mod time;

pub use catalog::ModuleDescriptor;
pub use error::{Error, Result};
