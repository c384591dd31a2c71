//! Common types, traits, and error definitions for surface_navigation
//!
//! This module provides the foundational building blocks shared by the
//! mapping, planning, and tracking stages.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
