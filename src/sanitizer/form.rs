use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use url_escape::decode;

struct KeyPatterns {
    key: Regex,
    segment: Regex,
}

fn key_patterns() -> &'static KeyPatterns {
    static PATTERNS: OnceLock<KeyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| KeyPatterns {
        key: Regex::new(r"^([^\[\]]+)((?:\[[^\[\]]*\])*)$").unwrap(),
        segment: Regex::new(r"\[([^\[\]]*)\]").unwrap(),
    })
}

fn decode_component(text: &str) -> String {
    decode(&text.replace('+', " ")).into_owned()
}

/// Splits `schedule[monday][0][start]` into `["schedule", "monday", "0", "start"]`.
fn parse_key(key: &str) -> Option<Vec<String>> {
    let patterns = key_patterns();
    let captures = patterns.key.captures(key)?;
    let mut path = vec![captures[1].to_string()];
    path.extend(
        patterns
            .segment
            .captures_iter(&captures[2])
            .map(|segment| segment[1].to_string()),
    );
    Some(path)
}

/// `[]` appends after the highest numeric index so far.
fn next_index(map: &Map<String, Value>) -> String {
    map.keys()
        .filter_map(|key| key.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1)
        .to_string()
}

fn insert(map: &mut Map<String, Value>, path: &[String], value: String) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let key = if first.is_empty() {
        next_index(map)
    } else {
        first.clone()
    };

    if rest.is_empty() {
        map.insert(key, Value::String(value));
        return;
    }

    let child = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child) = child {
        insert(child, rest, value);
    }
}

/// Decodes an `application/x-www-form-urlencoded` body into nested JSON.
///
/// Bracketed keys become nested objects, in the order they first appear:
/// `schedule[holidays][0]=2024-12-25` turns into
/// `{"schedule": {"holidays": {"0": "2024-12-25"}}}`. Keys with unbalanced
/// brackets are skipped.
pub fn decode_form(body: &str) -> Map<String, Value> {
    let mut form = Map::new();
    for pair in body.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let Some(path) = parse_key(&key) else {
            debug!("Skipping malformed form key: {:?}", key);
            continue;
        };
        insert(&mut form, &path, decode_component(value));
    }
    form
}
