//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// None of these reach a conversation turn: the engine folds every failure
/// into user-visible text before it leaves the application layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Tool '{tool}' is missing path parameter '{parameter}'")]
    MissingPathParameter { tool: String, parameter: String },

    /// A path value that would leave its own segment (`/`, `?`, `#`, `..`)
    #[error("Tool '{tool}' cannot use '{value}' as path parameter '{parameter}'")]
    InvalidPathParameter {
        tool: String,
        parameter: String,
        value: String,
    },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl DomainError {
    /// Check if this error was caused by a name the model invented
    pub fn is_unknown_name(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownOperation(_) | DomainError::UnknownAgent(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_parameter_display() {
        let error = DomainError::MissingPathParameter {
            tool: "delete_repository".to_string(),
            parameter: "repository_name".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Tool 'delete_repository' is missing path parameter 'repository_name'"
        );
    }

    #[test]
    fn test_invalid_path_parameter_display() {
        let error = DomainError::InvalidPathParameter {
            tool: "delete_repository".to_string(),
            parameter: "repository_name".to_string(),
            value: "../x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Tool 'delete_repository' cannot use '../x' as path parameter 'repository_name'"
        );
    }

    #[test]
    fn test_is_unknown_name_check() {
        assert!(DomainError::UnknownOperation("x".to_string()).is_unknown_name());
        assert!(DomainError::UnknownAgent("x".to_string()).is_unknown_name());
        assert!(
            !DomainError::InvalidParameter {
                name: "replicas".to_string(),
                reason: "not a number".to_string()
            }
            .is_unknown_name()
        );
    }
}
