//! Plain-text grid files
//!
//! # Input format
//!
//! Whitespace-separated tokens: a header `dimt dimx dimy`, then one
//! `u v uplift` triple per point in linear-index order (`t` slowest, `y`
//! fastest). Line breaks carry no meaning beyond error reporting.
//!
//! # Output format
//!
//! ```text
//! dimt dimx dimy
//! xav yav
//! c c c ... c      <- one line per time step, dimx*dimy codes
//! ```

pub mod reader;
pub mod writer;

pub use reader::{parse_grid, read_grid};
pub use writer::{format_grid, format_output, write_grid, write_output};

use crate::error::{CloudError, Result};
use crate::grid::GridDims;
use std::str::FromStr;

/// Whitespace tokenizer that remembers line numbers.
pub(crate) struct TokenStream<'a> {
    tokens: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    consumed: usize,
    line: usize,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        let tokens = content
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)));
        Self {
            tokens: Box::new(tokens),
            consumed: 0,
            line: 0,
        }
    }

    /// Parse the next token as `T`.
    ///
    /// `expected` is the total number of values the caller needs, used to
    /// report truncation.
    pub(crate) fn next_value<T: FromStr>(&mut self, what: &str, expected: usize) -> Result<T> {
        let Some((line, tok)) = self.tokens.next() else {
            return Err(CloudError::Truncated {
                expected,
                found: self.consumed,
            });
        };
        self.consumed += 1;
        self.line = line;
        tok.parse().map_err(|_| CloudError::Parse {
            line,
            message: format!("expected {what}, found `{tok}`"),
        })
    }

    /// Read a `dimt dimx dimy` header.
    pub(crate) fn read_dims(&mut self) -> Result<GridDims> {
        let mut axes = [0usize; 3];
        for (axis, name) in axes.iter_mut().zip(["dimt", "dimx", "dimy"]) {
            let value: i64 = self.next_value(name, 3)?;
            *axis = usize::try_from(value).map_err(|_| {
                CloudError::invalid_dimensions(format!("{name} must not be negative, got {value}"))
            })?;
        }
        GridDims::new(axes[0], axes[1], axes[2])
    }

    /// Line of the most recently read token.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Number of tokens consumed so far.
    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_track_lines() {
        let mut tokens = TokenStream::new("1 2\n\n  x");
        let a: i32 = tokens.next_value("int", 3).unwrap();
        let b: i32 = tokens.next_value("int", 3).unwrap();
        assert_eq!((a, b), (1, 2));
        let err = tokens.next_value::<i32>("int", 3).unwrap_err();
        assert!(matches!(err, CloudError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_missing_token_is_truncation() {
        let mut tokens = TokenStream::new("4");
        let _: i32 = tokens.next_value("int", 2).unwrap();
        let err = tokens.next_value::<i32>("int", 2).unwrap_err();
        assert!(matches!(
            err,
            CloudError::Truncated {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let mut tokens = TokenStream::new("2 -1 3");
        let err = tokens.read_dims().unwrap_err();
        assert!(matches!(err, CloudError::InvalidDimensions { .. }));
    }
}
