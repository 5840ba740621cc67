use std::fmt;

use serde::Serialize;

#[derive(Debug)]
pub enum ParseError {
    /// The geo-markup document is not well-formed. Fatal to the parse call.
    DocumentFormat { position: u64, message: String },
    /// The measurement table's header row cannot be read.
    Table(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentFormat { position, message } => {
                write!(f, "malformed document at byte {position}: {message}")
            }
            Self::Table(msg) => write!(f, "unreadable table: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// One measurement row that could not be decoded. The row is skipped;
/// the rest of the table still parses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDecodeError {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for RowDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: cannot parse {} '{}'", self.row, self.field, self.value)
    }
}

impl std::error::Error for RowDecodeError {}
