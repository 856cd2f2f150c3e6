//! CLI command implementations.

use std::io::{self, Read};

use serde_json::{json, Value};
use tagq::{
    collect_tags, normalize, parse_tag_list, tokenize, Config, Error, FeedRecord, TagQuery, Tagged,
};

/// Write a default config file under the resolved root.
pub fn init(force: bool) -> tagq::Result<()> {
    let config = Config::default_location()?;
    let path = config.config_path();

    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it");
        return Ok(());
    }

    config.save()?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

/// Print the records matching `query`.
pub fn filter(
    query: &str,
    file: Option<&str>,
    field: Option<&str>,
    format: Option<&str>,
) -> tagq::Result<()> {
    let config = Config::load()?;
    let field = field.unwrap_or(config.tag_field.as_str());
    let format = format.unwrap_or(config.format.as_str());

    // Fail on a bad query before touching the input.
    let query = TagQuery::parse(query)?;
    let records = load_records(file, &config.collection_key)?;
    let matched = query.filter(&records, field);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&matched)?);
        }
        "oneline" => {
            for record in &matched {
                println!("{}", record_label(record));
            }
        }
        "table" => {
            if matched.is_empty() {
                println!("No matching records.");
                return Ok(());
            }

            println!("{:<30} {:<45} TAGS", "TITLE", "URL");
            println!("{}", "-".repeat(90));
            for record in &matched {
                let title = record.get("title").and_then(Value::as_str).unwrap_or("-");
                let url = record.get("url").and_then(Value::as_str).unwrap_or("-");
                println!(
                    "{:<30} {:<45} {}",
                    truncate_string(title, 30),
                    truncate_string(url, 45),
                    record.tags(field).join(" ")
                );
            }
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "Unknown format '{}' (expected table, json or oneline)",
                other
            )));
        }
    }

    Ok(())
}

/// Print every distinct tag, sorted.
pub fn tags(file: Option<&str>, field: Option<&str>) -> tagq::Result<()> {
    let config = Config::load()?;
    let field = field.unwrap_or(config.tag_field.as_str());
    let records = load_records(file, &config.collection_key)?;

    for tag in collect_tags(&records, field) {
        println!("{}", tag);
    }
    Ok(())
}

/// Show the token stream, the normalized stream and the parsed tree.
pub fn explain(query: &str, format: &str) -> tagq::Result<()> {
    let tokens = tokenize(query);
    let normalized = normalize(tokens.clone());
    let parsed = TagQuery::parse(query)?;

    match format {
        "json" => {
            let doc = json!({
                "query": query,
                "tokens": tokens,
                "normalized": normalized,
                "expr": parsed.expr(),
                "tags": parsed.expr().tags(),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        "text" => {
            println!("query:      {}", parsed.source());
            println!("tokens:     {}", join_tokens(&tokens));
            println!("normalized: {}", join_tokens(&normalized));
            if parsed.is_match_all() {
                println!("tree:       (matches everything)");
            } else {
                println!("tree:       {}", parsed);
            }
            println!("tags:       {}", parsed.expr().tags().join(" "));
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "Unknown format '{}' (expected text or json)",
                other
            )));
        }
    }

    Ok(())
}

/// Replace the tags of the feed at `url` in a feeds document, in place.
pub fn tag(url: &str, tags: &str, file: &str) -> tagq::Result<()> {
    let config = Config::load()?;
    let tags = parse_tag_list(tags)?;

    let contents = std::fs::read_to_string(file)?;
    let mut doc: Value = serde_json::from_str(&contents)?;
    let collection = collection_mut(&mut doc, &config.collection_key)?;

    let mut feeds: Vec<FeedRecord> = serde_json::from_value(collection.take())?;
    let feed = feeds
        .iter_mut()
        .find(|feed| feed.url == url)
        .ok_or_else(|| Error::InvalidInput(format!("No feed with url '{}'", url)))?;
    feed.tags = tags;
    println!("{}: {}", url, feed.tags.join(" "));

    *collection = serde_json::to_value(&feeds)?;
    std::fs::write(file, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

/// The record array of a document: the document itself or its `collection_key` member.
fn collection_mut<'a>(doc: &'a mut Value, collection_key: &str) -> tagq::Result<&'a mut Value> {
    if doc.is_array() {
        return Ok(doc);
    }
    match doc.get_mut(collection_key) {
        Some(records) if records.is_array() => Ok(records),
        _ => Err(Error::InvalidInput(format!(
            "No '{}' array in input document",
            collection_key
        ))),
    }
}

/// Read records from a file or stdin.
///
/// Accepts a JSON array, or an object whose `collection_key` member is one.
fn load_records(file: Option<&str>, collection_key: &str) -> tagq::Result<Vec<Value>> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let records = match serde_json::from_str::<Value>(&contents)? {
        Value::Array(records) => records,
        Value::Object(mut doc) => match doc.remove(collection_key) {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(Error::InvalidInput(format!(
                    "'{}' is not an array of records",
                    collection_key
                )))
            }
            None => {
                return Err(Error::InvalidInput(format!(
                    "No '{}' member in input document",
                    collection_key
                )))
            }
        },
        _ => {
            return Err(Error::InvalidInput(
                "Expected an array of records or an object holding one".to_string(),
            ))
        }
    };

    tracing::debug!(count = records.len(), "loaded records");
    Ok(records)
}

/// Short single-line identification of a record.
fn record_label(record: &Value) -> String {
    ["title", "url"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| record.to_string())
}

fn join_tokens(tokens: &[tagq::Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string for display.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
