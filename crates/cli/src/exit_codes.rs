//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args, conflicting options)          |
//! | 3    | I/O error (missing input file, unwritable output)        |
//! | 4    | Parse error (malformed document, table or tolerance file)|
//! | 5    | Parameters outside their physical range                  |
//!
//! Per-row and per-placemark problems never change the exit code; they are
//! logged and reported in the output.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable or output file unwritable.
pub const EXIT_IO: u8 = 3;

/// Document, table, settings or tolerance file could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Optical or loss parameters failed validation.
pub const EXIT_INVALID_PARAMS: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_IO, EXIT_PARSE, EXIT_INVALID_PARAMS];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
