//! Append-only command history with `!`-reference expansion.

use chrono::Local;

/// Ordered log of entered command lines.
///
/// Entries are never mutated or removed within a session; their 1-based
/// position is their insertion order.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    /// Append a command line to the log. No deduplication, no size cap.
    pub fn append(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// Expand a history reference.
    ///
    /// - `!!` is the most recently appended entry;
    /// - `!<digits>` is the entry at that 1-based position;
    /// - `!<text>` is the most recent entry starting with `<text>`;
    /// - anything else, and any reference that matches nothing, comes back
    ///   unchanged. This never fails.
    pub fn expand(&self, input: &str) -> String {
        let Some(reference) = input.strip_prefix('!') else {
            return input.to_string();
        };

        if reference == "!" {
            return self
                .entries
                .last()
                .cloned()
                .unwrap_or_else(|| input.to_string());
        }

        if !reference.is_empty() && reference.bytes().all(|b| b.is_ascii_digit()) {
            return reference
                .parse::<usize>()
                .ok()
                .and_then(|position| position.checked_sub(1))
                .and_then(|index| self.entries.get(index))
                .cloned()
                .unwrap_or_else(|| input.to_string());
        }

        self.entries
            .iter()
            .rev()
            .find(|entry| entry.starts_with(reference))
            .cloned()
            .unwrap_or_else(|| input.to_string())
    }

    /// Render the log as display lines: position, time, command.
    ///
    /// Positions are right-justified to the width of the largest one. The
    /// timestamp is the wall-clock time when `render` is called, not when
    /// the entry was appended.
    pub fn render(&self) -> Vec<String> {
        let width = self.entries.len().to_string().len();
        self.entries
            .iter()
            .enumerate()
            .map(|(index, command)| {
                let timestamp = Local::now().format("%H:%M:%S");
                format!("{:>width$}  {}  {}", index + 1, timestamp, command)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
