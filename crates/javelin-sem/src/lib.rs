//! The semantic pass.
//!
//! Drives a parsed compilation unit through four phases — type headers,
//! member headers, symbol-table completion, executable bodies — resolving
//! every name, typing every expression, inserting the implicit conversions
//! and synthesizing the members (accessors, `this$0`, captured-local
//! shadows, anonymous-class constructors) the bytecode emitter needs.
//!
//! Errors never abort the pass: they are reported into the diagnostics
//! sink and the offending node is stamped with the `Type::Error` sentinel,
//! which converts freely so a single mistake does not cascade.

mod accessor;
mod anon;
mod errors;
mod imports;
mod packages;
mod passes;
mod resolve;
mod scope;
mod semantic;
mod spell;
mod typer;

pub use errors::SemanticErrorKind;
pub use imports::{Imports, StaticImport};
pub use packages::PackageTree;
pub use scope::{LocalData, Locals};
pub use semantic::{Semantic, TargetRelease};
