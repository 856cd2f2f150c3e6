//! Boolean tag-query language.
//!
//! # Syntax Overview
//!
//! - **Tags**: any run of characters other than whitespace and `()|&!`
//! - **Not**: `!tag`
//! - **And**: `a & b`, or implicitly `a b` / `a !b`
//! - **Or**: `a | b`
//! - **Groups**: `(a | b) & c`
//!
//! Precedence is `!` over `&` over `|`; binary operators are
//! left-associative. The empty query matches everything.

mod eval;
mod parser;
mod token;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ParseError;
use crate::record::Tagged;

pub use eval::evaluate;
pub use parser::{parse, Expr, MAX_DEPTH};
pub use token::{normalize, tokenize, Token, SYMBOLS};

/// A compiled query: parse once, filter any number of record sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    source: String,
    expr: Expr,
}

impl TagQuery {
    /// Tokenize, normalize and parse a query string.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input);
        debug!(?tokens, "tokenized tag query");
        let tokens = normalize(tokens);
        debug!(?tokens, "normalized tag query");

        match parse(&tokens) {
            Ok(expr) => {
                debug!(%expr, "parsed tag query");
                Ok(Self {
                    source: input.to_string(),
                    expr,
                })
            }
            Err(e) => {
                warn!(query = input, error = %e, "failed to parse tag query");
                Err(e)
            }
        }
    }

    /// The query text this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Check if this query matches everything (empty or blank input).
    pub fn is_match_all(&self) -> bool {
        self.expr == Expr::All
    }

    /// Records matching this query, in evaluation order.
    pub fn filter<'a, R: Tagged>(&self, records: &'a [R], field: &str) -> Vec<&'a R> {
        let matched = evaluate(&self.expr, records, field);
        debug!(
            total = records.len(),
            matched = matched.len(),
            field,
            "evaluated tag query"
        );
        matched
    }
}

impl FromStr for TagQuery {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Filter `records` by a query over the tag collection named `field`.
///
/// A malformed query is an error, never an empty result.
pub fn query_filter<'a, R: Tagged>(
    query: &str,
    records: &'a [R],
    field: &str,
) -> Result<Vec<&'a R>, ParseError> {
    Ok(TagQuery::parse(query)?.filter(records, field))
}
