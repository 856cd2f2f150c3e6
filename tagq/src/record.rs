//! Tagged records: the field-lookup capability queries evaluate against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::SYMBOLS;
use crate::{Error, Result};

/// A record exposing one or more named tag collections.
pub trait Tagged {
    /// Tags stored under `field`; empty when the field is absent.
    fn tags(&self, field: &str) -> Vec<&str>;

    /// Membership test used by query leaves.
    fn has_tag(&self, field: &str, tag: &str) -> bool {
        self.tags(field).contains(&tag)
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn tags(&self, field: &str) -> Vec<&str> {
        (**self).tags(field)
    }

    fn has_tag(&self, field: &str, tag: &str) -> bool {
        (**self).has_tag(field, tag)
    }
}

/// Dynamic records: the field must hold an array; non-string entries are skipped.
impl Tagged for Value {
    fn tags(&self, field: &str) -> Vec<&str> {
        self.get(field).map(array_tags).unwrap_or_default()
    }

    fn has_tag(&self, field: &str, tag: &str) -> bool {
        self.get(field).is_some_and(|value| array_contains(value, tag))
    }
}

fn array_tags(value: &Value) -> Vec<&str> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn array_contains(value: &Value, tag: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(tag)),
        _ => false,
    }
}

/// A subscribed feed as the reader exports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    #[serde(default)]
    pub title: String,
    pub url: String,
    /// Position in the feed list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Any other fields, kept so they survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// `tags` reads the typed field; any other name is looked up in `extra`.
impl Tagged for FeedRecord {
    fn tags(&self, field: &str) -> Vec<&str> {
        if field == "tags" {
            self.tags.iter().map(String::as_str).collect()
        } else {
            self.extra.get(field).map(array_tags).unwrap_or_default()
        }
    }

    fn has_tag(&self, field: &str, tag: &str) -> bool {
        if field == "tags" {
            self.tags.iter().any(|t| t == tag)
        } else {
            self.extra.get(field).is_some_and(|value| array_contains(value, tag))
        }
    }
}

/// Every distinct tag across `records`, sorted.
pub fn collect_tags<R: Tagged>(records: &[R], field: &str) -> Vec<String> {
    let tags: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.tags(field))
        .collect();
    tags.into_iter().map(str::to_string).collect()
}

/// Parse space-separated tag input, keeping first-seen order without duplicates.
///
/// Tags containing a query symbol are rejected: no query could select them.
pub fn parse_tag_list(input: &str) -> Result<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();

    for tag in input.split_whitespace() {
        if tag.contains(&SYMBOLS[..]) {
            return Err(Error::InvalidTag(format!(
                "'{}' contains one of {}",
                tag,
                SYMBOLS.iter().collect::<String>()
            )));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(tags)
}
