//! Type definitions for tokcount

mod error;
mod usage;

pub use error::*;
pub use usage::*;
