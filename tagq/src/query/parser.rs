//! Parser from normalized tokens to an expression tree.
//!
//! Parentheses are resolved first with an explicit stack; each flat,
//! paren-free run is then reduced by precedence: `!`, then `&`, then `|`.

use std::fmt;

use serde::Serialize;

use super::token::Token;
use crate::error::ParseError;

/// A parsed tag query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expr {
    /// Matches every record (the empty query).
    All,
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    /// Parenthesized sub-expression; evaluates to its inner expression.
    Group(Box<Expr>),
}

impl Expr {
    /// Build a tag leaf.
    pub fn tag(name: impl Into<String>) -> Self {
        Expr::Tag(name.into())
    }

    /// Negate an expression.
    pub fn negate(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    /// Conjunction of two expressions.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    /// Disjunction of two expressions.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// Wrap an expression in parentheses.
    pub fn group(inner: Expr) -> Self {
        Expr::Group(Box::new(inner))
    }

    /// Every distinct tag name referenced by this expression, in first-seen order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags = Vec::new();
        self.collect_tags(&mut tags);
        tags
    }

    fn collect_tags<'a>(&'a self, tags: &mut Vec<&'a str>) {
        match self {
            Expr::All => {}
            Expr::Tag(name) => {
                if !tags.contains(&name.as_str()) {
                    tags.push(name);
                }
            }
            Expr::Not(inner) | Expr::Group(inner) => inner.collect_tags(tags),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_tags(tags);
                right.collect_tags(tags);
            }
        }
    }
}

/// Renders query text. Trees produced by [`parse`] keep their groups, so
/// the output parses back to the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::All => Ok(()),
            Expr::Tag(name) => write!(f, "{}", name),
            Expr::Not(inner) => write!(f, "!{}", inner),
            Expr::And(left, right) => write!(f, "{} & {}", left, right),
            Expr::Or(left, right) => write!(f, "{} | {}", left, right),
            Expr::Group(inner) => write!(f, "({})", inner),
        }
    }
}

/// Deepest tree [`parse`] will build. Every walk over an [`Expr`] recurses,
/// so longer `&`/`|` chains and deeper `!`/paren nesting are rejected.
pub const MAX_DEPTH: usize = 512;

/// Working element while reducing: an unconsumed operator/paren or a
/// finished sub-tree with its depth.
#[derive(Debug)]
enum Item {
    Token(Token),
    Expr(Expr, usize),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Token(token) => write!(f, "{}", token),
            Item::Expr(expr, _) => write!(f, "{}", expr),
        }
    }
}

/// Wrap a new node one level above `depth`, refusing to exceed [`MAX_DEPTH`].
fn deeper(expr: Expr, depth: usize) -> Result<Item, ParseError> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Err(ParseError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(Item::Expr(expr, depth))
}

/// Parse normalized tokens into an expression tree.
///
/// An empty token sequence parses to [`Expr::All`]. Trees deeper than
/// [`MAX_DEPTH`] fail with [`ParseError::TooDeep`].
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Ok(Expr::All);
    }

    let mut stack: Vec<Item> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token {
            Token::RParen => {
                let mut inner = Vec::new();
                loop {
                    match stack.pop() {
                        Some(Item::Token(Token::LParen)) => break,
                        Some(item) => inner.push(item),
                        None => return Err(ParseError::UnbalancedParenthesis { missing: '(' }),
                    }
                }
                inner.reverse();
                let (group, depth) = parse_exprs(inner)?;
                stack.push(deeper(Expr::group(group), depth)?);
            }
            Token::Word(word) => stack.push(Item::Expr(Expr::tag(word.as_str()), 1)),
            other => stack.push(Item::Token(other.clone())),
        }
    }

    if stack
        .iter()
        .any(|item| matches!(item, Item::Token(Token::LParen | Token::RParen)))
    {
        return Err(ParseError::UnbalancedParenthesis { missing: ')' });
    }

    let (expr, _) = parse_exprs(stack)?;
    Ok(expr)
}

/// Reduce a paren-free run to a single expression and its depth.
fn parse_exprs(items: Vec<Item>) -> Result<(Expr, usize), ParseError> {
    if items.is_empty() {
        return Err(ParseError::MalformedExpression {
            tokens: vec!["()".to_string()],
        });
    }

    let items = reduce_not(items)?;
    let items = reduce_binary(items, '&', Expr::And)?;
    let mut items = reduce_binary(items, '|', Expr::Or)?;

    match items.pop() {
        Some(Item::Expr(expr, depth)) if items.is_empty() => Ok((expr, depth)),
        last => {
            items.extend(last);
            Err(ParseError::MalformedExpression {
                tokens: items.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

/// Attach every `!` to the operand after it.
///
/// Runs right to left so `!!a` nests instead of negating a bare `!`.
fn reduce_not(items: Vec<Item>) -> Result<Vec<Item>, ParseError> {
    let mut reduced = Vec::with_capacity(items.len());

    for item in items.into_iter().rev() {
        match item {
            Item::Token(Token::Not) => match reduced.pop() {
                Some(Item::Expr(operand, depth)) => {
                    reduced.push(deeper(Expr::negate(operand), depth)?)
                }
                _ => return Err(ParseError::DanglingOperator { op: '!' }),
            },
            other => reduced.push(other),
        }
    }

    reduced.reverse();
    Ok(reduced)
}

/// Fold every `op` with its neighbours, left-associatively.
fn reduce_binary(
    items: Vec<Item>,
    op: char,
    build: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Result<Vec<Item>, ParseError> {
    let mut reduced: Vec<Item> = Vec::with_capacity(items.len());
    let mut rest = items.into_iter();

    while let Some(item) = rest.next() {
        match item {
            Item::Token(ref token) if token.symbol() == Some(op) => {
                let (left, left_depth) = match reduced.pop() {
                    Some(Item::Expr(expr, depth)) => (expr, depth),
                    _ => return Err(ParseError::DanglingOperator { op }),
                };
                let (right, right_depth) = match rest.next() {
                    Some(Item::Expr(expr, depth)) => (expr, depth),
                    _ => return Err(ParseError::DanglingOperator { op }),
                };
                let node = build(Box::new(left), Box::new(right));
                reduced.push(deeper(node, left_depth.max(right_depth))?);
            }
            other => reduced.push(other),
        }
    }

    Ok(reduced)
}
