//! User-defined command aliases with cycle rejection on definition.

use std::collections::HashSet;
use thiserror::Error;

/// Errors reported when an alias definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// The expansion starts with the alias's own name.
    #[error("cannot create recursive alias '{0}'")]
    Recursive(String),
    /// Following the expansion chain would loop back to the new alias.
    #[error("circular alias detected for '{0}'")]
    Circular(String),
}

#[derive(Debug, Clone)]
struct AliasEntry {
    name: String,
    expansion: String,
}

/// Mapping from alias name to replacement command text.
///
/// Entries keep their insertion order; redefining an alias updates the
/// stored expansion in place without moving it. The table guarantees that
/// following name -> first word of expansion -> ... never loops back to the
/// name it started from.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Define `name` as shorthand for `expansion`, replacing any previous
    /// definition.
    ///
    /// One surrounding quote character (`'` or `"`) on each end of the
    /// expansion and a leading `=` are stripped before storage, so
    /// `alias ll ="ls -l"` and `alias ll ls -l` store the same text.
    pub fn define(&mut self, name: &str, expansion: &str) -> Result<(), AliasError> {
        let expansion = clean_expansion(expansion);

        let first_word = expansion.split_whitespace().next().unwrap_or("");
        if first_word == name {
            return Err(AliasError::Recursive(name.to_string()));
        }
        if self.walk_returns_to_start(name, expansion) {
            return Err(AliasError::Circular(name.to_string()));
        }

        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.expansion = expansion.to_string(),
            None => self.entries.push(AliasEntry {
                name: name.to_string(),
                expansion: expansion.to_string(),
            }),
        }
        Ok(())
    }

    /// Exact-match lookup of an alias expansion. No partial matching.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.expansion.as_str())
    }

    /// All `(name, expansion)` pairs in insertion order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.expansion.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the chain name -> first word of expansion -> ... as if
    /// `name -> expansion` were already committed, without touching the
    /// stored table.
    ///
    /// The walk stops at the first word that is not an alias key. A
    /// revisited word ends the walk too, and only counts as a cycle when it
    /// is the starting name itself; a loop elsewhere in the chain is not
    /// this definition's fault and is left alone.
    fn walk_returns_to_start<'a>(&'a self, name: &'a str, expansion: &'a str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = name;
        loop {
            if !visited.insert(current) {
                return current == name;
            }
            let mapped = if current == name {
                Some(expansion)
            } else {
                self.lookup(current)
            };
            match mapped.and_then(|text| text.split_whitespace().next()) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }
}

/// Strip one surrounding quote character on each end, then a leading `=`.
fn clean_expansion(raw: &str) -> &str {
    let s = raw
        .strip_prefix('"')
        .or_else(|| raw.strip_prefix('\''))
        .unwrap_or(raw);
    let s = s
        .strip_suffix('"')
        .or_else(|| s.strip_suffix('\''))
        .unwrap_or(s);
    s.strip_prefix('=').unwrap_or(s)
}
