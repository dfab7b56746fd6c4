use crate::errors::{QuoteError, Result};
use serde::Serialize;
use std::fmt;

/// Ticker symbol as typed by the user, trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Rejects empty and whitespace-only input. Case is left as typed.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuoteError::EmptySymbol);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    /// Signed percentage exactly as the provider sent it, e.g. `-0.42%`.
    pub change_percent: String,
    pub volume: Option<u64>,
}

/// Outcome of a lookup that reached the provider and got a readable answer.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteLookup {
    Found(Quote),
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_trimmed_but_keeps_case() {
        let symbol = Symbol::parse("  petr4 ").unwrap();
        assert_eq!(symbol.as_str(), "petr4");
        assert_eq!(symbol.to_string(), "petr4");
    }

    #[test]
    fn blank_symbols_are_rejected() {
        for input in ["", "   ", "\t\n"] {
            assert!(matches!(Symbol::parse(input), Err(QuoteError::EmptySymbol)));
        }
    }
}
