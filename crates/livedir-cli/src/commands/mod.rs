//! Command implementations for the livedir CLI.
//!
//! livedir has a single command, [`serve`], which provides an `execute`
//! function taking the parsed arguments and returning a Result.

pub mod serve;

pub use serve::execute as serve_execute;
