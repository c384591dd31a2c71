// Path tracking: steering law and goal-tracking controller

pub mod arc_steering;
pub mod motion_controller;

pub use arc_steering::*;
pub use motion_controller::*;
