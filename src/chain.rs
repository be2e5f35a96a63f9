//! Splitting an input line into `&&`/`||`-joined command segments.

use regex::Regex;
use std::sync::OnceLock;

/// The logical operator preceding a chain segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    /// First segment of the line; always executes.
    None,
    /// `&&`: execute only after a successful predecessor.
    And,
    /// `||`: execute only after a failed predecessor.
    Or,
}

/// One command fragment of an input line together with the operator that
/// decides whether it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSegment {
    pub op: ChainOp,
    pub text: String,
}

fn operator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"&&|\|\|").expect("operator pattern compiles"))
}

/// Split a line on literal `&&` and `||`, keeping the operators.
///
/// Segment text is trimmed; empty segments are kept so the executor can
/// treat them as failed commands rather than silently closing the gap.
pub fn split(line: &str) -> Vec<ChainSegment> {
    let mut segments = Vec::new();
    let mut op = ChainOp::None;
    let mut start = 0;

    for found in operator_pattern().find_iter(line) {
        segments.push(ChainSegment {
            op,
            text: line[start..found.start()].trim().to_string(),
        });
        op = if found.as_str() == "&&" {
            ChainOp::And
        } else {
            ChainOp::Or
        };
        start = found.end();
    }
    segments.push(ChainSegment {
        op,
        text: line[start..].trim().to_string(),
    });
    segments
}
