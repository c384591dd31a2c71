// Path planning over the ground surface

pub mod local_target;
pub mod wavefront;

pub use local_target::*;
pub use wavefront::*;
