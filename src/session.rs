use crate::alias::AliasTable;
use crate::history::History;

/// Mutable, per-interpreter state shared by the built-in commands.
///
/// The session contains:
/// - `aliases`: the user-defined alias table.
/// - `history`: the append-only log of entered command lines.
///
/// There is deliberately no global state: every [`crate::Interpreter`] owns
/// its own `Session`, so independent interpreter instances (one per test,
/// for example) never observe each other.
#[derive(Debug, Default, Clone)]
pub struct Session {
    /// User-defined command aliases.
    pub aliases: AliasTable,
    /// Previously entered command lines, oldest first.
    pub history: History,
}

impl Session {
    /// Create an empty session with no aliases and no history.
    pub fn new() -> Self {
        Self::default()
    }
}
