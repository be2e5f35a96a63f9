use crate::calc;
use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::external;
use crate::interpreter::Factory;
use crate::session::Session;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "calc" or "alias".
    fn name() -> &'static str;

    /// Executes the command using the provided output stream and session.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, session) {
            Ok(code) => Ok(code),
            Err(e) => {
                writeln!(stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Catalogue used by `help`, in display order.
const COMMAND_HELP: &[(&str, &str)] = &[
    ("tree", "print the file and directory tree"),
    ("sort", "sort numbers or the contents of a file"),
    ("alias", "manage command aliases (define, show, list)"),
    ("ps", "list running processes"),
    ("history", "show the command history"),
    ("calc", "evaluate an arithmetic expression"),
    ("help", "show help for the available commands"),
];

#[derive(FromArgs)]
/// Define and inspect command aliases.
/// With no arguments, lists every alias. With one argument, shows that
/// alias. With more, defines the first as shorthand for the rest.
pub struct Alias {
    #[argh(positional, greedy)]
    /// alias name followed by its expansion words; empty to list all.
    pub args: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        match self.args.as_slice() {
            [] => {
                if session.aliases.is_empty() {
                    writeln!(stdout, "No aliases defined")?;
                } else {
                    for (name, expansion) in session.aliases.list() {
                        writeln!(stdout, "{name}='{expansion}'")?;
                    }
                }
                Ok(0)
            }
            [name] => {
                match session.aliases.lookup(name) {
                    Some(expansion) => writeln!(stdout, "{name}='{expansion}'")?,
                    None => writeln!(stdout, "Alias '{name}' not found")?,
                }
                Ok(0)
            }
            [name, expansion @ ..] => {
                session.aliases.define(name, &expansion.join(" "))?;
                writeln!(stdout, "Alias '{name}' created")?;
                Ok(0)
            }
        }
    }
}

#[derive(FromArgs)]
/// Show previously entered command lines, numbered from 1.
pub struct History {}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        if session.history.is_empty() {
            writeln!(stdout, "No commands in history")?;
            return Ok(0);
        }
        for line in session.history.render() {
            writeln!(stdout, "{line}")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Evaluate an arithmetic expression with arbitrary precision.
/// Supports + - * / % ^ over integers of any length; no precedence.
pub struct Calc {
    #[argh(positional, greedy)]
    /// expression words, e.g. 2 + 2 * 3.
    pub expression: Vec<String>,
}

impl BuiltinCommand for Calc {
    fn name() -> &'static str {
        "calc"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        let line = calc::evaluate(&self.expression)?;
        writeln!(stdout, "{line}")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Sort numbers given as arguments, or delegate an existing file to the
/// system sort.
pub struct Sort {
    #[argh(positional, greedy)]
    /// numbers to sort, or a file name followed by sort options.
    pub args: Vec<String>,
}

impl BuiltinCommand for Sort {
    fn name() -> &'static str {
        "sort"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        if self.args.is_empty() {
            anyhow::bail!("usage: sort <numbers...> or sort <file>");
        }

        if Path::new(&self.args[0]).exists() {
            let args: Vec<&str> = self.args.iter().map(|a| a.as_str()).collect();
            return external::run_captured("sort", &args, stdout);
        }

        let mut numbers = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let number: f64 = arg
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid number: {arg}"))?;
            numbers.push(number);
        }
        numbers.sort_by(f64::total_cmp);

        let line = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(stdout, "{line}")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the directory tree below a root directory.
/// Dot-files and build output are skipped; entries are sorted by name.
pub struct Tree {
    #[argh(positional)]
    /// root directory; defaults to the current directory.
    pub root: Option<String>,
}

impl BuiltinCommand for Tree {
    fn name() -> &'static str {
        "tree"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        let root = self.root.as_deref().unwrap_or(".");
        writeln!(stdout, "{root}")?;
        print_branch(Path::new(root), "", stdout)
            .with_context(|| format!("tree: cannot read {root}"))?;
        Ok(0)
    }
}

fn print_branch(dir: &Path, prefix: &str, out: &mut dyn Write) -> Result<()> {
    let mut entries: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .filter(|(name, _)| !name.starts_with('.') && name != "target")
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let count = entries.len();
    for (index, (name, path)) in entries.into_iter().enumerate() {
        let last = index + 1 == count;
        let marker = if last { "└── " } else { "├── " };
        writeln!(out, "{prefix}{marker}{name}")?;
        if path.is_dir() {
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            print_branch(&path, &child_prefix, out)?;
        }
    }
    Ok(())
}

#[derive(FromArgs)]
/// List running processes in long format via the system ps.
pub struct Ps {}

impl BuiltinCommand for Ps {
    fn name() -> &'static str {
        "ps"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        writeln!(
            stdout,
            "F S UID   PID  PPID  C PRI  NI ADDR SZ WCHAN TTY        TIME CMD"
        )?;
        writeln!(
            stdout,
            "- - --- ---- ----- --- --- --- ---- -- ----- --- ----------- ---"
        )?;
        let mut listing = Vec::new();
        let code = external::run_captured("ps", &["-l"], &mut listing)?;
        for line in String::from_utf8_lossy(&listing).lines().skip(1) {
            if !line.trim().is_empty() {
                writeln!(stdout, "{line}")?;
            }
        }
        Ok(code)
    }
}

#[derive(FromArgs)]
/// Show the command catalogue, or usage details for one command.
pub struct Help {
    #[argh(positional)]
    /// command to describe; lists every command when omitted.
    pub topic: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        let Some(topic) = self.topic else {
            writeln!(stdout, "Available commands:")?;
            writeln!(stdout, "-------------------")?;
            for (name, description) in COMMAND_HELP {
                writeln!(stdout, "{name:<10} : {description}")?;
            }
            writeln!(stdout)?;
            writeln!(stdout, "Use \"help <command>\" for details on a command.")?;
            return Ok(0);
        };

        match COMMAND_HELP.iter().find(|(name, _)| *name == topic) {
            Some((name, description)) => {
                writeln!(stdout, "Help for command: {name}")?;
                writeln!(stdout, "-------------------")?;
                writeln!(stdout, "{description}")?;
                writeln!(stdout)?;
                writeln!(stdout, "Examples:")?;
                for example in usage_examples(name) {
                    writeln!(stdout, "  {example}")?;
                }
                Ok(0)
            }
            None => {
                writeln!(stdout, "Unknown command: {topic}")?;
                writeln!(stdout, "Use \"help\" to list the available commands.")?;
                Ok(0)
            }
        }
    }
}

fn usage_examples(name: &str) -> &'static [&'static str] {
    match name {
        "tree" => &["tree", "tree src"],
        "sort" => &["sort 5 2 8 1 9", "sort file.txt"],
        "alias" => &["alias ll ls -l", "alias", "alias ll"],
        "ps" => &["ps"],
        "history" => &["history", "!5", "!!", "!calc"],
        "calc" => &["calc 2 + 2", "calc 10 * 5", "calc 2 ^ 3"],
        _ => &["help", "help calc"],
    }
}
