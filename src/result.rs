use std::fmt::{Display, Error, Formatter};

use crate::command::Command;
use crate::error::{ErrorKind, ValidationError};

/// Longest message kept in a result
pub const MAX_REASON_LENGTH: usize = 96;

/// Position of the traversal inside one active list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEntry {
    /// Physical address of the command
    pub address: u32,
    /// The command at `address`, if it could be read
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ErrorKind),
}

/// Final state of a validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub outcome: Outcome,
    /// One entry per list that was active when the run failed; empty on success
    pub stack: Vec<StackEntry>,
    pub message: String,
}

impl ValidationResult {
    pub fn success() -> Self {
        ValidationResult {
            outcome: Outcome::Success,
            stack: Vec::new(),
            message: String::new(),
        }
    }

    pub fn failure(error: ValidationError, stack: Vec<StackEntry>) -> Self {
        ValidationResult {
            outcome: Outcome::Failure(error.kind),
            stack,
            message: truncate_reason(error.message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.outcome {
            Outcome::Success => None,
            Outcome::Failure(kind) => Some(kind),
        }
    }
}

impl Display for ValidationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.outcome {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure(kind) => write!(f, "{}: {}", kind, self.message),
        }
    }
}

fn truncate_reason(mut message: String) -> String {
    if message.len() > MAX_REASON_LENGTH {
        let mut end = MAX_REASON_LENGTH;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_empty_stack() {
        let result = ValidationResult::success();
        assert!(result.is_success());
        assert!(result.stack.is_empty());
        assert_eq!(result.error_kind(), None);
        assert_eq!(result.to_string(), "success");
    }

    #[test]
    fn test_failure_keeps_kind_and_stack() {
        let entry = StackEntry {
            address: 0x1000,
            command: None,
        };
        let result = ValidationResult::failure(
            ValidationError::uninitialized("multiply before load"),
            vec![entry],
        );
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::Uninitialized));
        assert_eq!(result.stack, vec![entry]);
        assert_eq!(result.to_string(), "Uninitialized: multiply before load");
    }

    #[test]
    fn test_long_message_truncated() {
        let result = ValidationResult::failure(
            ValidationError::invalid_arguments("x".repeat(300)),
            Vec::new(),
        );
        assert_eq!(result.message.len(), MAX_REASON_LENGTH);
    }
}
