use crate::builtin::{Alias, Calc, Help, History, Ps, Sort, Tree};
use crate::chain::{self, ChainOp};
use crate::command::CommandFactory;
use crate::external::ExternalCommand;
use crate::session::Session;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate — built-ins and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A line-oriented command interpreter with aliases, history, chained
/// commands and built-in dispatch.
///
/// The interpreter owns a [`Session`] (alias table + history log) and a
/// list of [`CommandFactory`] objects that are queried in order to create
/// commands by name. Anything no factory recognizes falls through to the
/// external-process fallback, and a name nobody can handle is reported as
/// `command not found`.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let ok = sh.run_line("calc 2 + 2 && calc 6 * 7");
/// assert!(ok);
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            session: Session::new(),
            commands,
        }
    }

    /// Read-only view of the interpreter's alias and history state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one input line against standard output.
    ///
    /// Returns the overall success of the (possibly chained) line.
    pub fn run_line(&mut self, line: &str) -> bool {
        self.run_line_with_output(line, &mut std::io::stdout())
    }

    /// Run one input line, writing all command output to `stdout`.
    ///
    /// The line is history-expanded (echoing the expansion when it changes
    /// the line), appended to history, split on `&&`/`||`, and executed
    /// segment by segment with short-circuiting: a failure stops the chain
    /// at a following `&&`, a success stops it at a following `||`.
    pub fn run_line_with_output(&mut self, line: &str, stdout: &mut dyn Write) -> bool {
        let expanded = self.session.history.expand(line);
        if expanded != line {
            let _ = writeln!(stdout, "{expanded}");
        }
        self.session.history.append(expanded.clone());

        let mut last_success = true;
        for segment in chain::split(&expanded) {
            match segment.op {
                ChainOp::And if !last_success => break,
                ChainOp::Or if last_success => break,
                _ => {}
            }
            last_success = self.run_segment(&segment.text, stdout);
        }
        last_success
    }

    /// Execute a single chain segment and report whether it succeeded.
    fn run_segment(&mut self, text: &str, stdout: &mut dyn Write) -> bool {
        let resolved = self.resolve_alias(text);
        let mut words = resolved.split_whitespace();
        let Some(name) = words.next() else {
            // Nothing runnable between two operators counts as a failure.
            return false;
        };
        let args: Vec<&str> = words.collect();

        let mut created = None;
        for factory in &self.commands {
            if let Some(command) = factory.try_create(name, &args) {
                created = Some(command);
                break;
            }
        }

        match created {
            Some(command) => match command.execute(stdout, &mut self.session) {
                Ok(code) => code == 0,
                Err(error) => {
                    let _ = writeln!(stdout, "{error:#}");
                    false
                }
            },
            None => {
                let _ = writeln!(stdout, "command not found: {name}");
                false
            }
        }
    }

    /// Substitute the segment's leading word through the alias table.
    ///
    /// Substitution is single-level; the no-cycle invariant upheld by
    /// [`crate::alias::AliasTable::define`] makes deeper expansion
    /// unnecessary for termination.
    fn resolve_alias(&self, text: &str) -> String {
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return text.to_string();
        };
        match self.session.aliases.lookup(first) {
            Some(expansion) => {
                let rest: Vec<&str> = words.collect();
                if rest.is_empty() {
                    expansion.to_string()
                } else {
                    format!("{expansion} {}", rest.join(" "))
                }
            }
            None => text.to_string(),
        }
    }

    /// Interactive Read-Eval-Print Loop on top of rustyline.
    ///
    /// `exit` (in any letter case) ends the session; so do Ctrl-C and
    /// Ctrl-D, immediately and without running anything further.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut editor = DefaultEditor::new()?;
        loop {
            match editor.readline("minish> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.eq_ignore_ascii_case("exit") {
                        break;
                    }
                    editor.add_history_entry(line)?;
                    self.run_line(line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("error: {error}");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default dispatch table:
    /// `alias`, `history`, `calc`, `sort`, `tree`, `ps`, `help`, plus the
    /// external command fallback.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Alias>::default()),
            Box::new(Factory::<History>::default()),
            Box::new(Factory::<Calc>::default()),
            Box::new(Factory::<Sort>::default()),
            Box::new(Factory::<Tree>::default()),
            Box::new(Factory::<Ps>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

#[cfg(test)]
mod chain_tests {
    use crate::Interpreter;

    fn run(interpreter: &mut Interpreter, line: &str) -> (bool, String) {
        let mut out = Vec::new();
        let ok = interpreter.run_line_with_output(line, &mut out);
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn and_chain_runs_both_segments() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "sort 1 2 3 && sort 4 5 6");
        assert!(ok);
        assert!(out.contains("1 2 3"));
        assert!(out.contains("4 5 6"));
    }

    #[test]
    fn and_chain_stops_after_failure() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "minish_no_such_command && sort 4 5 6");
        assert!(!ok);
        assert!(out.contains("command not found: minish_no_such_command"));
        assert!(!out.contains("4 5 6"));
    }

    #[test]
    fn or_chain_stops_after_success() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "sort 1 2 3 || sort 4 5 6");
        assert!(ok);
        assert!(out.contains("1 2 3"));
        assert!(!out.contains("4 5 6"));
    }

    #[test]
    fn or_chain_recovers_from_failure() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "minish_no_such_command || sort 4 5 6");
        assert!(ok);
        assert!(out.contains("4 5 6"));
    }

    #[test]
    fn calc_error_fails_only_its_segment() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "calc 1 / 0 || sort 2 1");
        assert!(ok);
        assert!(out.contains("division by zero"));
        assert!(out.contains("1 2"));
    }

    #[test]
    fn rejected_alias_short_circuits_following_and() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "alias x x && sort 1 2");
        assert!(!ok);
        assert!(out.contains("cannot create recursive alias 'x'"));
        assert!(!out.contains("1 2"));
    }

    #[test]
    fn aliases_resolve_before_dispatch() {
        let mut sh = Interpreter::default();
        let (ok, _) = run(&mut sh, "alias ll sort");
        assert!(ok);
        let (ok, out) = run(&mut sh, "ll 3 1 2");
        assert!(ok);
        assert!(out.contains("1 2 3"));
    }

    #[test]
    fn every_line_lands_in_history_after_expansion() {
        let mut sh = Interpreter::default();
        run(&mut sh, "sort 2 1");
        let (ok, out) = run(&mut sh, "!!");
        assert!(ok);
        // The expansion is echoed, then the repeated command runs.
        assert!(out.starts_with("sort 2 1\n"));
        assert!(out.contains("1 2"));
        assert_eq!(sh.session().history.len(), 2);
        assert_eq!(sh.session().history.expand("!2"), "sort 2 1");
    }

    #[test]
    fn unmatched_history_reference_runs_literally() {
        let mut sh = Interpreter::default();
        let (ok, out) = run(&mut sh, "!nothing");
        assert!(!ok);
        assert!(out.contains("command not found: !nothing"));
    }

    #[test]
    fn empty_segment_between_operators_fails() {
        let mut sh = Interpreter::default();
        let (ok, _) = run(&mut sh, "sort 1 &&");
        assert!(!ok);
    }

    #[test]
    #[cfg(unix)]
    fn external_commands_run_and_report_status() {
        let mut sh = Interpreter::default();
        let (ok, _) = run(&mut sh, "true && false");
        assert!(!ok);
        let (ok, _) = run(&mut sh, "false || true");
        assert!(ok);
    }
}
