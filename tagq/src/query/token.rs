//! Tokenizer and implicit-AND normalizer.

use std::fmt;

use serde::Serialize;

/// Characters that always form a token of their own.
pub const SYMBOLS: [char; 5] = ['(', ')', '|', '&', '!'];

/// A single lexical unit of a tag query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Token {
    /// Bare tag name.
    Word(String),
    LParen,
    RParen,
    Or,
    And,
    Not,
}

impl Token {
    /// Map a symbol character to its token.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '|' => Some(Token::Or),
            '&' => Some(Token::And),
            '!' => Some(Token::Not),
            _ => None,
        }
    }

    /// The symbol character of an operator or parenthesis token.
    pub fn symbol(&self) -> Option<char> {
        match self {
            Token::Word(_) => None,
            Token::LParen => Some('('),
            Token::RParen => Some(')'),
            Token::Or => Some('|'),
            Token::And => Some('&'),
            Token::Not => Some('!'),
        }
    }

    /// True for tag words, the only tokens that can stand as operands.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Word(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.symbol()) {
            (Token::Word(word), _) => write!(f, "{}", word),
            (_, Some(c)) => write!(f, "{}", c),
            (_, None) => Ok(()),
        }
    }
}

/// Split a query string into tokens.
///
/// Never fails: whitespace separates words and is dropped, each symbol is
/// its own token, everything else accumulates into the pending word.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in input.chars() {
        if c.is_whitespace() {
            flush_word(&mut word, &mut tokens);
        } else if let Some(symbol) = Token::from_symbol(c) {
            flush_word(&mut word, &mut tokens);
            tokens.push(symbol);
        } else {
            word.push(c);
        }
    }

    flush_word(&mut word, &mut tokens);
    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}

/// Insert the implicit `&` between adjacent operands.
///
/// An `&` goes between two words (`dev emacs`) and between a word and a
/// following `!` (`dev !linux`). Nothing is inserted before `(`.
pub fn normalize(tokens: Vec<Token>) -> Vec<Token> {
    let mut normalized = Vec::with_capacity(tokens.len() * 2);
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let insert_and = token.is_operand()
            && matches!(iter.peek(), Some(next) if next.is_operand() || *next == Token::Not);
        normalized.push(token);
        if insert_and {
            normalized.push(Token::And);
        }
    }

    normalized
}
