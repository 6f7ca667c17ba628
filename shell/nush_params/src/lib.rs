//! Parameter (shell variable) runtime for the nush shell.
//!
//! A dynamically typed, scope-aware symbol table backing every shell
//! variable: polymorphic value storage, scoped shadowing with
//! save/restore, special parameters bound to interpreter state, tied
//! scalar/array pairs, and process-environment synchronization.
//!
//! The [`engine::ParamEngine`] facade is the intended entry point;
//! the lower layers are public for collaborators (subscript resolution,
//! `typeset`-style display) that need direct table access.

pub mod assign;
pub mod engine;
pub mod environ;
pub mod errors;
pub mod flags;
pub mod gsu;
pub mod options;
pub mod signals;
pub mod special;
pub mod state;
pub mod table;
pub mod tie;
pub mod value;

pub use assign::{AssocEntry, Subscript};
pub use engine::{ParamEngine, ParamView};
pub use errors::{ParamError, ParamErrorKind, ParamResult};
pub use flags::ParamFlags;
pub use options::ShellOptions;
pub use value::{Number, ParamType, ParamValue};

#[cfg(test)]
mod tests;
