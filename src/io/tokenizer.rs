//! Whitespace-style line tokenizer.
//!
//! Splits a line on a configurable set of delimiter characters. Runs of
//! delimiters count as one, so `"a  b"` yields two tokens.

use std::str::FromStr;

use thiserror::Error;

/// Default delimiters: space, tab and line endings.
pub const WHITESPACE: &str = " \t\r\n";

/// Failure to read the next field of a line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The line has no more tokens.
    #[error("unexpected end of line")]
    Exhausted,

    /// The next token does not parse as the requested type.
    #[error("cannot parse `{0}`")]
    Unparseable(String),
}

/// Iterates the delimited tokens of one line.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: &'a str,
    delimiters: &'a str,
}

impl<'a> Tokenizer<'a> {
    /// Tokenize `line`, splitting on any character of `delimiters`.
    pub fn new(line: &'a str, delimiters: &'a str) -> Self {
        Self {
            rest: line,
            delimiters,
        }
    }

    /// Tokenize `line` on [`WHITESPACE`].
    pub fn whitespace(line: &'a str) -> Self {
        Self::new(line, WHITESPACE)
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }

    /// The next token, or `None` once the line is used up.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let start = self.rest.trim_start_matches(|c: char| self.is_delimiter(c));
        if start.is_empty() {
            self.rest = start;
            return None;
        }
        let end = start.find(|c: char| self.is_delimiter(c)).unwrap_or(start.len());
        let (token, rest) = start.split_at(end);
        self.rest = rest;
        Some(token)
    }

    /// Parse the next token as `T`.
    pub fn parse_next<T: FromStr>(&mut self) -> Result<T, TokenError> {
        let token = self.next_token().ok_or(TokenError::Exhausted)?;
        token
            .parse()
            .map_err(|_| TokenError::Unparseable(token.to_string()))
    }

    /// The unread remainder of the line, leading delimiters included.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_runs_of_delimiters() {
        let tokens: Vec<_> = Tokenizer::whitespace("  Vertex 1\t0.5   2 \r\n").collect();
        assert_eq!(tokens, vec!["Vertex", "1", "0.5", "2"]);
    }

    #[test]
    fn test_custom_delimiters() {
        let mut t = Tokenizer::new("a,b;;c", ",;");
        assert_eq!(t.next_token(), Some("a"));
        assert_eq!(t.next_token(), Some("b"));
        assert_eq!(t.next_token(), Some("c"));
        assert_eq!(t.next_token(), None);
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn test_parse_next() {
        let mut t = Tokenizer::whitespace("Tet 4 1.5 x");
        assert_eq!(t.next_token(), Some("Tet"));
        assert_eq!(t.parse_next::<usize>(), Ok(4));
        assert_eq!(t.parse_next::<f64>(), Ok(1.5));
        assert_eq!(
            t.parse_next::<i64>(),
            Err(TokenError::Unparseable("x".to_string()))
        );
        assert_eq!(t.parse_next::<i64>(), Err(TokenError::Exhausted));
    }

    #[test]
    fn test_remainder() {
        let mut t = Tokenizer::whitespace("Vertex 1 0 0 0 {rgb=(1 0 0)}");
        for _ in 0..5 {
            t.next_token();
        }
        assert_eq!(t.remainder(), " {rgb=(1 0 0)}");
    }

    #[test]
    fn test_empty_line() {
        let mut t = Tokenizer::whitespace("   ");
        assert_eq!(t.next_token(), None);
        assert_eq!(t.parse_next::<f64>(), Err(TokenError::Exhausted));
    }
}
