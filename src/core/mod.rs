//! Core error and type definitions

pub mod error;
pub mod types;

pub use self::error::{ModelError, Result};
pub use self::types::*;
