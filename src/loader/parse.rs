//! Tokenizer for the plain-text matrix formats.
//!
//! One matrix row per line. Values are separated by commas, whitespace or
//! both. Blank lines and everything after `#` are ignored. Errors carry the
//! 1-based line and column of the offending token.

use std::str::FromStr;

use crate::{Error, Result};

/// A token and the 1-based column it starts at.
struct Token<'a> {
    text: &'a str,
    column: usize,
}

fn tokens(line: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut start: Option<(usize, usize)> = None;

    for (column, (offset, ch)) in line.char_indices().enumerate() {
        let separator = ch == ',' || ch.is_whitespace();
        match (separator, start) {
            (true, Some((begin, col))) => {
                out.push(Token { text: &line[begin..offset], column: col });
                start = None;
            }
            (false, None) => start = Some((offset, column + 1)),
            _ => {}
        }
    }
    if let Some((begin, col)) = start {
        out.push(Token { text: &line[begin..], column: col });
    }
    out
}

fn parse_table<T: FromStr>(text: &str, kind: &str) -> Result<Vec<Vec<T>>> {
    let mut rows = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = match raw.find('#') {
            Some(cut) => &raw[..cut],
            None => raw,
        };
        let row = tokens(line)
            .into_iter()
            .map(|tok| {
                tok.text.parse::<T>().map_err(|_| Error::Parse {
                    line: idx + 1,
                    column: tok.column,
                    message: format!("expected {kind}, found {:?}", tok.text),
                })
            })
            .collect::<Result<Vec<T>>>()?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Parse the rows of a `.syn` file.
pub fn parse_syn(text: &str) -> Result<Vec<Vec<i64>>> {
    parse_table(text, "an integer synapse code")
}

/// Parse the rows of a `.dist` file.
pub fn parse_dist(text: &str) -> Result<Vec<Vec<f64>>> {
    parse_table(text, "a distance")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixed_separators_and_comments() {
        let text = "# recording 3_170302_02\n0, 1 3\n\n1,0,2  # gap junction to 3\n0 2 0\n";
        assert_eq!(parse_syn(text).unwrap(), vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]]);
    }

    #[test]
    fn test_error_position() {
        let err = parse_syn("0 1\n1 x\n").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => assert_eq!((line, column), (2, 3)),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_float_in_syn_is_rejected() {
        assert!(matches!(parse_syn("0 1.5\n1 0\n"), Err(Error::Parse { line: 1, column: 3, .. })));
    }

    #[test]
    fn test_parse_dist() {
        let rows = parse_dist("0.0, -42.5\n42.5, 0\n").unwrap();
        assert_eq!(rows, vec![vec![0.0, -42.5], vec![42.5, 0.0]]);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_syn("\n# nothing\n").unwrap().is_empty());
    }
}
