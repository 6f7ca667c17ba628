//! Interpreter options the parameter engine consults.

/// The shell options that change parameter behavior. Constructed by the
/// embedder; everything defaults to off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShellOptions {
    /// Restricted mode: parameters flagged restricted reject mutation.
    pub restricted: bool,
    /// Every newly created parameter is exported automatically.
    pub all_export: bool,
    /// ksh compatibility: a scalar write to an array targets element zero
    /// instead of recreating the parameter as a scalar.
    pub ksh_arrays: bool,
    /// ksh compatibility: subscript zero addresses the first element
    /// rather than the insertion point before it.
    pub ksh_zero_subscript: bool,
}
