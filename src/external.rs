use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::session::Session;
use anyhow::{Context, Result};
use std::env;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Command that is not a builtin.
///
/// The name is resolved against `PATH` up front; the child process runs
/// with captured output, which is then forwarded to the interpreter's
/// output stream once the process finishes.
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env::var_os("PATH")?;
        let program = resolve(&search_paths, Path::new(name))?;
        Some(Box::new(ExternalCommand {
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
        }))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<ExitCode> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        stdout.write_all(&output.stdout)?;
        stdout.write_all(&output.stderr)?;
        match output.status.code() {
            Some(code) => Ok(code),
            None => Ok(terminated_by_signal(output.status)),
        }
    }
}

/// Run a helper program with captured output forwarded to `stdout`.
///
/// Used by builtins that lean on a system tool (`sort` on files, `ps`).
/// Resolution is left to the OS here since the helpers are fixed names.
pub(crate) fn run_captured(
    program: &str,
    args: &[&str],
    stdout: &mut dyn Write,
) -> Result<ExitCode> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {program}"))?;
    stdout.write_all(&output.stdout)?;
    stdout.write_all(&output.stderr)?;
    match output.status.code() {
        Some(code) => Ok(code),
        None => Ok(terminated_by_signal(output.status)),
    }
}

/// Resolve a command name the way a typical shell would.
///
/// Names containing a path separator (absolute or relative) are checked
/// directly; bare names are searched through each directory of
/// `search_paths` in order, first match wins.
fn resolve(search_paths: &OsStr, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if path.is_absolute() || path.components().count() > 1 {
        return path.exists().then(|| path.to_path_buf());
    }
    env::split_paths(search_paths)
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn search(paths: &str) -> std::ffi::OsString {
        std::ffi::OsString::from(paths)
    }

    #[test]
    #[cfg(unix)]
    fn resolves_absolute_existing_path() {
        let found = resolve(&search("/bin"), Path::new("/bin/sh"));
        assert_eq!(found, Some(PathBuf::from("/bin/sh")));
    }

    #[test]
    #[cfg(unix)]
    fn rejects_absolute_missing_path() {
        assert_eq!(resolve(&search("/bin"), Path::new("/bin/nonexisting")), None);
    }

    #[test]
    #[cfg(unix)]
    fn finds_bare_name_in_search_path() {
        let found = resolve(&search("/nonexistent:/bin"), Path::new("sh"))
            .expect("sh should be found in /bin");
        assert!(found.starts_with("/bin"));
        assert!(found.ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn missing_bare_name_is_none() {
        assert_eq!(resolve(&search("/bin"), Path::new("no_such_cmd_here")), None);
    }

    #[test]
    fn empty_name_is_none() {
        assert_eq!(resolve(&search(""), Path::new("")), None);
    }

    #[test]
    #[cfg(unix)]
    fn captures_output_and_exit_code() {
        let command = Box::new(ExternalCommand {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "printf hi; exit 3".to_string()],
        });
        let mut out = Vec::new();
        let mut session = Session::new();
        let code = command.execute(&mut out, &mut session).unwrap();
        assert_eq!(code, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "hi");
    }

    #[test]
    #[cfg(unix)]
    fn run_captured_forwards_output() {
        let mut out = Vec::new();
        let code = run_captured("sh", &["-c", "printf ok"], &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "ok");
    }
}
