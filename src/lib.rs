//! A tiny, embeddable line-oriented command interpreter.
//!
//! This crate reads command lines and resolves them against a small set of
//! built-in commands, a user-defined alias table, and the surrounding
//! system's executables. Lines can chain several commands with `&&`/`||`
//! (with shell-style short-circuiting), reference earlier lines with
//! `!!`/`!n`/`!prefix` history expansion, and reach an arbitrary-precision
//! calculator through the `calc` built-in.
//!
//! The main entry point is [`Interpreter`], which owns the mutable session
//! state (aliases and history) and executes lines through a set of
//! pluggable command factories. The public modules [`alias`], [`history`],
//! [`calc`] and [`chain`] expose the individual engine pieces for direct
//! use and testing.

pub mod alias;
mod builtin;
pub mod calc;
pub mod chain;
pub mod command;
mod external;
pub mod history;
mod interpreter;
pub mod session;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
