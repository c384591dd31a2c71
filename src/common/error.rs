//! Error types for surface_navigation

use thiserror::Error;

/// Main error type for the navigation pipeline
///
/// Every variant except `Io` and `Config` is recoverable at the tick level:
/// the caller skips the current command and tries again on the next tick.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// No ground point to project the goal onto (empty or fully inflated surface)
    #[error("Goal projection error: no ground point available")]
    GoalProjection,
    /// The wavefront could not be seeded from the goal
    #[error("Goal unreachable: wavefront could not be seeded")]
    GoalUnreachable,
    /// No ground point within the lookahead radius of the robot
    #[error("No local target within {radius} m of the robot")]
    NoLocalTarget { radius: f64 },
    /// External pose lookup failed
    #[error("Pose unavailable: {0}")]
    PoseUnavailable(String),
    /// Goal carried non-finite values
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
    /// Plot output failed
    #[error("Visualization error: {0}")]
    Visualization(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NavigationError::NoLocalTarget { radius: 0.4 };
        assert_eq!(format!("{}", err), "No local target within 0.4 m of the robot");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NavigationError = io_err.into();
        assert!(matches!(err, NavigationError::Io(_)));
    }
}
