//! Error types for parameter operations.
//!
//! # Structured Error Categories
//!
//! `ParamErrorKind` provides typed error categories for diagnostic
//! conversion. Factory functions (e.g., `read_only()`) remain the public
//! API; they populate the kind, and `Display` produces the message text.
//!
//! All recoverable failures abort the triggering operation with no partial
//! mutation. Allocation failure is intentionally absent: the allocator
//! aborts the process, which is the non-recoverable case.

use std::fmt;

use nush_diagnostic::{Diagnostic, ErrorCode};

use crate::value::ParamType;

/// Result of a parameter operation.
pub type ParamResult<T> = Result<T, ParamError>;

/// Typed error category for structured diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamErrorKind {
    /// Assignment or unset of a read-only parameter.
    ReadOnlyViolation { name: String },
    /// Mutation of a restricted parameter in restricted mode.
    RestrictedViolation { name: String },
    /// The name is not a valid identifier.
    NotAnIdentifier { name: String },
    /// The value shape does not fit the target parameter.
    TypeMismatch {
        name: String,
        expected: ParamType,
        got: ParamType,
    },
    /// Flat key/value list with an odd element count.
    MalformedKeyValueList { name: String, count: usize },
    /// The resolved addressing descriptor cannot be satisfied.
    InvalidSubscriptRange { name: String, start: isize, end: isize },
    /// A live declaration already occupies the name at this level.
    AlreadyDeclared { name: String },
    /// The OS-level side effect of a special binding failed.
    SysFailure { name: String, detail: String },
}

/// A parameter operation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamError {
    pub kind: ParamErrorKind,
}

impl ParamError {
    pub fn read_only(name: impl Into<String>) -> ParamError {
        ParamError {
            kind: ParamErrorKind::ReadOnlyViolation { name: name.into() },
        }
    }

    pub fn restricted(name: impl Into<String>) -> ParamError {
        ParamError {
            kind: ParamErrorKind::RestrictedViolation { name: name.into() },
        }
    }

    pub fn not_an_identifier(name: impl Into<String>) -> ParamError {
        ParamError {
            kind: ParamErrorKind::NotAnIdentifier { name: name.into() },
        }
    }

    pub fn type_mismatch(name: impl Into<String>, expected: ParamType, got: ParamType) -> ParamError {
        ParamError {
            kind: ParamErrorKind::TypeMismatch {
                name: name.into(),
                expected,
                got,
            },
        }
    }

    pub fn malformed_key_value_list(name: impl Into<String>, count: usize) -> ParamError {
        ParamError {
            kind: ParamErrorKind::MalformedKeyValueList {
                name: name.into(),
                count,
            },
        }
    }

    pub fn invalid_subscript(name: impl Into<String>, start: isize, end: isize) -> ParamError {
        ParamError {
            kind: ParamErrorKind::InvalidSubscriptRange {
                name: name.into(),
                start,
                end,
            },
        }
    }

    pub fn already_declared(name: impl Into<String>) -> ParamError {
        ParamError {
            kind: ParamErrorKind::AlreadyDeclared { name: name.into() },
        }
    }

    pub fn sys_failure(name: impl Into<String>, detail: impl Into<String>) -> ParamError {
        ParamError {
            kind: ParamErrorKind::SysFailure {
                name: name.into(),
                detail: detail.into(),
            },
        }
    }

    /// The stable error code for this kind.
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            ParamErrorKind::ReadOnlyViolation { .. } => ErrorCode::E4001,
            ParamErrorKind::RestrictedViolation { .. } => ErrorCode::E4002,
            ParamErrorKind::NotAnIdentifier { .. } => ErrorCode::E4003,
            ParamErrorKind::TypeMismatch { .. } => ErrorCode::E4004,
            ParamErrorKind::MalformedKeyValueList { .. } => ErrorCode::E4005,
            ParamErrorKind::InvalidSubscriptRange { .. } => ErrorCode::E4006,
            ParamErrorKind::AlreadyDeclared { .. } => ErrorCode::E4007,
            ParamErrorKind::SysFailure { .. } => ErrorCode::E4008,
        }
    }

    /// Convert into a diagnostic for the reporting queue.
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParamErrorKind::ReadOnlyViolation { name } => {
                write!(f, "read-only variable: {name}")
            }
            ParamErrorKind::RestrictedViolation { name } => {
                write!(f, "{name}: restricted")
            }
            ParamErrorKind::NotAnIdentifier { name } => {
                write!(f, "not an identifier: {name}")
            }
            ParamErrorKind::TypeMismatch { name, expected, got } => {
                write!(f, "{name}: expected {expected} value, got {got}")
            }
            ParamErrorKind::MalformedKeyValueList { name, count } => {
                write!(f, "{name}: bad set of key/value pairs ({count} elements)")
            }
            ParamErrorKind::InvalidSubscriptRange { name, start, end } => {
                write!(f, "{name}: subscript range [{start},{end}] out of range")
            }
            ParamErrorKind::AlreadyDeclared { name } => {
                write!(f, "{name}: already declared at this scope")
            }
            ParamErrorKind::SysFailure { name, detail } => {
                write!(f, "failed to change {name}: {detail}")
            }
        }
    }
}

impl std::error::Error for ParamError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factories_set_kind_and_message() {
        let err = ParamError::read_only("PPID");
        assert_eq!(
            err.kind,
            ParamErrorKind::ReadOnlyViolation {
                name: "PPID".to_owned()
            }
        );
        assert_eq!(err.to_string(), "read-only variable: PPID");
    }

    #[test]
    fn codes_are_stable_per_kind() {
        assert_eq!(ParamError::read_only("x").code(), ErrorCode::E4001);
        assert_eq!(ParamError::restricted("PATH").code(), ErrorCode::E4002);
        assert_eq!(
            ParamError::malformed_key_value_list("m", 3).code(),
            ErrorCode::E4005
        );
    }

    #[test]
    fn diagnostic_conversion_keeps_message() {
        let diag = ParamError::not_an_identifier("1x").into_diagnostic();
        assert!(diag.is_error());
        assert_eq!(diag.message, "not an identifier: 1x");
        assert_eq!(diag.code, ErrorCode::E4003);
    }
}
