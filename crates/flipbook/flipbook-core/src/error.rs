//! Error types for the flip engine

use serde::{Deserialize, Serialize};

use crate::state::Direction;

/// Error kinds surfaced by the geometry kernel, page model and engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FlipError {
    /// Inversion requested for a matrix with (near) zero determinant
    #[error("Degenerate transform: determinant {determinant} is not invertible")]
    DegenerateTransform { determinant: f32 },

    /// Flip attempted past either end of the book
    #[error("Cannot flip {direction:?} from spread {index} (book has {spreads} spreads)")]
    OutOfRange {
        index: usize,
        direction: Direction,
        spreads: usize,
    },

    /// Event that does not apply to the current state
    #[error("Invalid transition: {event} while {state}")]
    InvalidTransition { state: String, event: String },

    /// Book initialized without pages
    #[error("Book must contain at least one page")]
    EmptyBook,

    /// Configuration rejected by validation
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// JSON decode failure
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl FlipError {
    /// Runtime conditions the host can shrug off; config mistakes are not.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. } | Self::Parse { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DegenerateTransform { .. } => "geometry",
            Self::OutOfRange { .. } | Self::EmptyBook => "pages",
            Self::InvalidTransition { .. } => "state",
            Self::InvalidConfig { .. } | Self::Parse { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for FlipError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability() {
        assert!(FlipError::DegenerateTransform { determinant: 0.0 }.is_recoverable());
        assert!(FlipError::OutOfRange {
            index: 4,
            direction: Direction::Forward,
            spreads: 5,
        }
        .is_recoverable());
        assert!(FlipError::InvalidTransition {
            state: "idle".into(),
            event: "pointer-move".into(),
        }
        .is_recoverable());
        assert!(!FlipError::InvalidConfig {
            reason: "x".into()
        }
        .is_recoverable());
    }

    #[test]
    fn categories() {
        assert_eq!(
            FlipError::DegenerateTransform { determinant: 0.0 }.category(),
            "geometry"
        );
        assert_eq!(FlipError::EmptyBook.category(), "pages");
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(FlipError::from(err), FlipError::Parse { .. }));
    }

    #[test]
    fn display_mentions_bounds() {
        let e = FlipError::OutOfRange {
            index: 4,
            direction: Direction::Forward,
            spreads: 5,
        };
        assert_eq!(
            e.to_string(),
            "Cannot flip Forward from spread 4 (book has 5 spreads)"
        );
    }
}
