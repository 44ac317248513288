//! Common utilities module
//!
//! This module contains shared error types and integer helpers used across the image pipeline.

pub mod error;
pub mod utilities;

pub use error::{PipelineError, Result};
pub use utilities::{align_multiple_ceil, align_multiple_floor};
