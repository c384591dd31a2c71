// Navigation pipeline facade

pub mod navigator;

pub use navigator::*;
