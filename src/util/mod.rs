//! Utility types and functions shared by every backend.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`is_valid_name`] - Element name rules

mod error;
mod name;

pub use error::*;
pub use name::*;
