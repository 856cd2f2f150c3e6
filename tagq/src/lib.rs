//! tagq: boolean tag queries over feed records.
//!
//! Tokenizes a query such as `(dev & emacs) | !linux`, parses it into an
//! expression tree, and evaluates it against any records implementing
//! [`Tagged`].

pub mod config;
pub mod error;
pub mod query;
pub mod record;

pub use config::Config;
pub use error::{Error, ParseError, Result};
pub use query::{evaluate, normalize, parse, query_filter, tokenize, Expr, TagQuery, Token};
pub use record::{collect_tags, parse_tag_list, FeedRecord, Tagged};
