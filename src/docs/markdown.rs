use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// `h2` or `h3`.
    pub heading_level: String,
    pub text: String,
    pub slug: String,
}

/// Splits a leading `---` block of `key: value` lines from the body.
/// Scalars that parse as JSON (numbers, booleans) keep their type.
pub fn split_front_matter(markdown: &str) -> (Map<String, Value>, &str) {
    let mut attributes = Map::new();
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return (attributes, markdown);
    };

    let Some(end) = rest
        .match_indices("\n---")
        .map(|(idx, _)| idx)
        .find(|idx| {
            let after = &rest[idx + 4..];
            after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
        })
    else {
        return (attributes, markdown);
    };

    for line in rest[..end].lines() {
        let Some((key, raw)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        attributes.insert(key.to_string(), scalar(raw.trim()));
    }

    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    (attributes, body)
}

fn scalar(raw: &str) -> Value {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|value| value.strip_suffix('\'')));
    if let Some(text) = unquoted {
        return Value::String(text.to_string());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// `##` and `###` headings outside fenced code, with unique slugs.
pub fn table_of_contents(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut in_fence = false;

    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let (level, text) = if let Some(text) = trimmed.strip_prefix("### ") {
            ("h3", text)
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            ("h2", text)
        } else {
            continue;
        };

        let text = text.trim().trim_end_matches('#').trim().to_string();
        let base = slugify(&text);
        let count = seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        headings.push(Heading {
            heading_level: level.to_string(),
            text,
            slug,
        });
    }
    headings
}

/// GitHub style anchor: lowercase, punctuation dropped, spaces to `-`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            '-' | '_' => Some(ch),
            ch if ch.is_alphanumeric() => Some(ch),
            _ => None,
        })
        .collect()
}
