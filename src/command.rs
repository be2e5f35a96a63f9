use crate::session::Session;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools, and is what drives `&&`/`||` short-circuiting.
pub type ExitCode = i32;

/// Object-safe trait for any command the interpreter can execute.
///
/// Implemented by built-ins via a blanket impl and by the external-process
/// fallback. Commands write their output to `stdout` (the interpreter's
/// standard output, or a capture buffer in tests) and may mutate the
/// session state (aliases, history).
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`; the
/// interpreter then asks the next factory in its list.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
