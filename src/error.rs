// Validation error taxonomy

use std::fmt;

/// The closed set of reasons a display list can be rejected.
///
/// Every kind is terminal: the first error anywhere in the traversal ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Call nesting or matrix stack is full (also used for an exhausted command budget)
    StackOverflow,
    /// Matrix pop with insufficient depth
    StackUnderflow,
    /// Opcode not recognized by the configured microcode
    InvalidCommand,
    /// Segment id unset or out of range
    SegmentError,
    /// Translated address misaligned
    DataAlignment,
    /// Translated address outside addressable RAM
    InvalidAddress,
    /// Wrong length, reserved bits set, illegal flags or an out-of-range index
    InvalidArguments,
    /// Multiply against a matrix that was never loaded
    Uninitialized,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::StackOverflow,
        ErrorKind::StackUnderflow,
        ErrorKind::InvalidCommand,
        ErrorKind::SegmentError,
        ErrorKind::DataAlignment,
        ErrorKind::InvalidAddress,
        ErrorKind::InvalidArguments,
        ErrorKind::Uninitialized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::StackOverflow => "StackOverflow",
            ErrorKind::StackUnderflow => "StackUnderflow",
            ErrorKind::InvalidCommand => "InvalidCommand",
            ErrorKind::SegmentError => "SegmentError",
            ErrorKind::DataAlignment => "DataAlignment",
            ErrorKind::InvalidAddress => "InvalidAddress",
            ErrorKind::InvalidArguments => "InvalidArguments",
            ErrorKind::Uninitialized => "Uninitialized",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A rejected command: the kind plus a short message with the offending values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            kind,
            message: message.into(),
        }
    }

    pub fn stack_overflow(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::StackOverflow, message)
    }

    pub fn stack_underflow(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::StackUnderflow, message)
    }

    pub fn invalid_command(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::InvalidCommand, message)
    }

    pub fn segment(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::SegmentError, message)
    }

    pub fn alignment(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::DataAlignment, message)
    }

    pub fn invalid_address(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::InvalidAddress, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::InvalidArguments, message)
    }

    pub fn uninitialized(message: impl Into<String>) -> Self {
        ValidationError::new(ErrorKind::Uninitialized, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type GfxResult<T> = Result<T, ValidationError>;
