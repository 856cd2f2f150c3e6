//! Error types for tag-query operations.

/// Why a query string could not be turned into an expression tree.
///
/// Parsing never recovers: any of these aborts the whole query, so an
/// invalid query is always distinguishable from one that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A `)` with no matching `(`, or a `(` that was never closed.
    #[error("unbalanced parenthesis: missing '{missing}'")]
    UnbalancedParenthesis { missing: char },

    /// `!`, `&` or `|` without the operand(s) it needs.
    #[error("'{op}' missing operand")]
    DanglingOperator { op: char },

    /// More than one top-level term left after reduction.
    #[error("malformed expression around {}", quote_all(.tokens))]
    MalformedExpression { tokens: Vec<String> },

    /// The tree would nest deeper than the evaluator walks safely.
    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

fn quote_all(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    Query(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
