use thiserror::Error;

use crate::processor::context::NameKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way `parse` can refuse a source text.
///
/// Unresolvable operation types are not errors: they are recorded as
/// `DvmType::Unknown` on the operation and left to later stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input does not match the grammar.
    #[error("line {line}, col {column}: {message}")]
    Grammar {
        line: usize,
        column: usize,
        /// Byte offset into the source, used by [`Error::render`].
        offset: usize,
        message: String,
    },

    #[error("{what} \"{name}\" not found")]
    NotFound { what: &'static str, name: String },

    #[error("{kind} \"{name}\" exists but is used as a function")]
    UsedAsFunction { kind: NameKind, name: String },

    #[error("{kind} \"{name}\" exists but is used as a value")]
    UsedAsValue { kind: NameKind, name: String },

    #[error("found duplicate lines in function \"{function}\" (lines {})", join_lines(.lines))]
    DuplicateLines { function: String, lines: Vec<u64> },

    #[error("function \"{function}\", line {line}: GOTO target {target} does not exist")]
    UnknownGotoTarget {
        function: String,
        line: u64,
        target: u64,
    },
}

fn join_lines(lines: &[u64]) -> String {
    lines
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Builds a grammar error, turning the byte offset into a 1-based
    /// line/column pair.
    pub fn grammar(src: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(src.len());
        let mut line = 1;
        let mut line_start = 0;
        for (i, c) in src.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                line_start = i + 1;
            }
        }
        let column = src[line_start..offset].chars().count() + 1;
        Error::Grammar {
            line,
            column,
            offset,
            message: message.into(),
        }
    }

    /// Human-oriented rendering: grammar errors get the offending source
    /// line and a caret under the failing column.
    pub fn render(&self, src: &str) -> String {
        let mut result = format!("Error: {self}");
        if let Error::Grammar {
            line,
            column,
            offset,
            ..
        } = self
        {
            let offset = (*offset).min(src.len());
            let line_start = src[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let line_end = src[line_start..]
                .find('\n')
                .map(|i| line_start + i)
                .unwrap_or(src.len());
            let text = &src[line_start..line_end];
            result.push_str(&format!("\n --> line {line}, col {column}"));
            result.push_str("\n   |\n");
            result.push_str(&format!("{line:>3}| {text}\n"));
            result.push_str(&format!("   | {}^", " ".repeat(column - 1)));
        }
        result
    }
}
