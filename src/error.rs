use std::fmt;

/// Result type for Vigil operations
pub type Result<T> = std::result::Result<T, VigilError>;

/// Main error type for the Vigil library
#[derive(Debug, Clone, PartialEq)]
pub enum VigilError {
    /// A state or parameter array had the wrong shape
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid configuration value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action index outside the environment's action set
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// A training routine was called out of order
    TrainingError(String),

    /// IO errors (config and report files)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),
}

impl fmt::Display for VigilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VigilError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            VigilError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            VigilError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            VigilError::TrainingError(msg) => write!(f, "Training error: {}", msg),
            VigilError::Io(msg) => write!(f, "IO error: {}", msg),
            VigilError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for VigilError {}

impl From<std::io::Error> for VigilError {
    fn from(err: std::io::Error) -> Self {
        VigilError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VigilError {
    fn from(err: serde_json::Error) -> Self {
        VigilError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl VigilError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        VigilError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        VigilError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check that an action index lies in `[0, action_dim)`
    pub fn check_action(action: usize, action_dim: usize) -> Result<()> {
        if action < action_dim {
            Ok(())
        } else {
            Err(VigilError::InvalidAction { action, max_actions: action_dim })
        }
    }

    /// Check that an array has the expected length
    pub fn check_dim(expected: usize, actual: usize, what: &str) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(VigilError::dimension_mismatch(
                format!("{} of length {}", what, expected),
                format!("length {}", actual),
            ))
        }
    }
}
