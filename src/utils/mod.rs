//! Utility modules for surface_navigation

pub mod visualization;

pub use visualization::{Visualizer, PointStyle, colors, field_bands};
