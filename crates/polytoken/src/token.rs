//! Token strings.
//!
//! A token names one grid cell at one resolution:
//!
//! ```text
//! scalar:    "<value>^<step>"       e.g. "248^4"
//! cell:      "<x>,<y>^<step>"       e.g. "-178,2^2"   (x,y = top-left corner)
//! compound:  "<token>&<token>..."   one token per dimension, in order
//! ```
//!
//! Consumers index tokens by exact string equality, so construction always
//! goes through [`format_coordinate`].

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::precision::format_coordinate;

/// Delimiter between per-dimension tokens in a compound token.
pub const COMPOUND_DELIMITER: &str = "&";

/// An opaque index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Token for a one-dimensional cell starting at `value`.
    pub fn scalar(value: f64, step: f64) -> Self {
        Token(format!("{}^{}", format_coordinate(value), format_coordinate(step)))
    }

    /// Token for a square cell with top-left corner `(x, y)`.
    pub fn cell(x: f64, y: f64, step: f64) -> Self {
        Token(format!(
            "{},{}^{}",
            format_coordinate(x),
            format_coordinate(y),
            format_coordinate(step)
        ))
    }

    /// Join per-dimension tokens in dimension order.
    pub fn compound<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let joined = parts
            .into_iter()
            .map(Token::as_str)
            .collect::<Vec<_>>()
            .join(COMPOUND_DELIMITER);
        Token(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Drop repeated tokens, keeping first-seen order.
pub(crate) fn dedup(tokens: impl IntoIterator<Item = Token>) -> Vec<Token> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
