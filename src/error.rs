//! Error types for the automaton core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutomatonError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Coordinates ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        x: isize,
        y: isize,
        width: usize,
        height: usize,
    },

    #[error("State {state} is not valid for a {states}-state automaton")]
    InvalidState { state: u32, states: u8 },

    #[error("Tally has {actual} entries, expected {expected}")]
    TallyMismatch { expected: usize, actual: usize },
}

impl AutomatonError {
    pub fn config(message: impl Into<String>) -> Self {
        AutomatonError::Configuration(message.into())
    }

    /// True for errors that stop a run from being constructed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AutomatonError::Configuration(_) | AutomatonError::TallyMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AutomatonError::OutOfBounds { x: -1, y: 4, width: 3, height: 3 };
        assert_eq!(err.to_string(), "Coordinates (-1, 4) out of bounds for 3x3 grid");

        let err = AutomatonError::InvalidState { state: 5, states: 2 };
        assert!(err.to_string().contains("2-state"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(AutomatonError::config("bad").is_configuration());
        assert!(AutomatonError::TallyMismatch { expected: 2, actual: 3 }.is_configuration());
        assert!(!AutomatonError::InvalidState { state: 3, states: 2 }.is_configuration());
    }
}
