use std::fmt;

/// Error codes for all runtime diagnostics.
///
/// Format: E#### where the first digit indicates the subsystem:
/// - E4xxx: Parameter (variable) runtime errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Parameter Runtime Errors (E4xxx)
    /// Assignment or unset of a read-only parameter
    E4001,
    /// Mutation of a restricted parameter in restricted mode
    E4002,
    /// Malformed parameter name
    E4003,
    /// Value shape does not match the parameter's type
    E4004,
    /// Odd element count when bulk-loading an associative array
    E4005,
    /// Subscript range cannot be satisfied
    E4006,
    /// Declaration conflicts with a live parameter at the same level
    E4007,
    /// OS-level side effect of a special parameter failed
    E4008,

    // Internal Errors (E9xxx)
    /// Parameter table invariant violated
    E9001,
}

impl ErrorCode {
    /// Numeric part of the code.
    pub fn as_u16(self) -> u16 {
        match self {
            ErrorCode::E4001 => 4001,
            ErrorCode::E4002 => 4002,
            ErrorCode::E4003 => 4003,
            ErrorCode::E4004 => 4004,
            ErrorCode::E4005 => 4005,
            ErrorCode::E4006 => 4006,
            ErrorCode::E4007 => 4007,
            ErrorCode::E4008 => 4008,
            ErrorCode::E9001 => 9001,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.as_u16())
    }
}
