//! Best-effort recovery of a decision object from free-form model output.
//!
//! Small local models rarely return clean JSON: they wrap it in prose or code
//! fences, use Python literals, leave trailing commas, or stop mid-object.
//! [`try_parse_decision`] tries three strategies in order and never fails
//! loudly; callers substitute a fallback decision on `None`.
//!
//! 1. Structured scan: decode the first JSON object (from any `{`) that
//!    contains the discriminator key, ignoring whatever follows it.
//! 2. Relaxed line scan: single-line objects with single quotes, Python
//!    `True`/`False`/`None` or trailing commas.
//! 3. Key scrape: pull the discriminator and its companion fields out with
//!    regular expressions and assemble the mapping by hand.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Companion fields recovered by the key scrape, besides `parameters`
const SCRAPED_TEXT_FIELDS: [&str; 2] = ["response", "reasoning"];

static RESPONSE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']response["']\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("RESPONSE_FIELD regex is a compile-time constant")
});

static REASONING_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']reasoning["']\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("REASONING_FIELD regex is a compile-time constant")
});

static PARAMETERS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']parameters["']\s*:\s*\{"#)
        .expect("PARAMETERS_KEY regex is a compile-time constant")
});

/// Recover a mapping containing `discriminator` from `text`.
///
/// Returns `None` when no strategy finds the key. Never panics.
pub fn try_parse_decision(text: &str, discriminator: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }

    structured_scan(text, discriminator)
        .or_else(|| relaxed_line_scan(text, discriminator))
        .or_else(|| scrape_keys(text, discriminator))
}

/// Tier 1: the first well-formed object holding the key, trailing text ignored.
fn structured_scan(text: &str, discriminator: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(map))) if map.contains_key(discriminator) => Some(map),
            _ => None,
        }
    })
}

/// Tier 2: single-line objects, parsed after relaxing common non-JSON habits.
fn relaxed_line_scan(text: &str, discriminator: &str) -> Option<Map<String, Value>> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            let start = line.find('{')?;
            let end = line.rfind('}')?;
            (start < end).then(|| &line[start..=end])
        })
        .find_map(|candidate| match parse_relaxed(candidate) {
            Some(Value::Object(map)) if map.contains_key(discriminator) => Some(map),
            _ => None,
        })
}

/// Tier 3: regex extraction of the discriminator and companion fields.
fn scrape_keys(text: &str, discriminator: &str) -> Option<Map<String, Value>> {
    let pattern = format!(
        r#"["']{}["']\s*:\s*["']([^"']*)["']"#,
        regex::escape(discriminator)
    );
    let key_regex = Regex::new(&pattern).ok()?;
    let value = key_regex.captures(text)?.get(1)?.as_str().trim().to_string();

    let mut mapping = Map::new();
    mapping.insert(discriminator.to_string(), Value::String(value));

    if let Some(parameters) = scrape_parameters(text) {
        mapping.insert("parameters".to_string(), Value::Object(parameters));
    }

    for field in SCRAPED_TEXT_FIELDS {
        let regex = match field {
            "response" => &*RESPONSE_FIELD,
            _ => &*REASONING_FIELD,
        };
        if let Some(raw) = regex.captures(text).and_then(|c| c.get(1)) {
            mapping.insert(field.to_string(), Value::String(unescape(raw.as_str())));
        }
    }

    Some(mapping)
}

/// The balanced `{...}` following a `"parameters":` key, if it parses.
fn scrape_parameters(text: &str) -> Option<Map<String, Value>> {
    let found = PARAMETERS_KEY.find(text)?;
    let open = found.end() - 1;
    let close = matching_brace(text, open)?;
    match parse_relaxed(&text[open..=close]) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Index of the brace closing the one at `open`, skipping quoted text.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse JSON after rewriting single-quoted strings, Python literals and
/// trailing commas.
fn parse_relaxed(candidate: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(candidate) {
        return Some(value);
    }
    serde_json::from_str(&relax(candidate)).ok()
}

fn relax(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                // Copy a whole string literal, re-quoting single-quoted ones.
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let s = chars[i];
                    if s == '\\' && i + 1 < chars.len() {
                        if chars[i + 1] == '\'' {
                            out.push('\'');
                        } else {
                            out.push(s);
                            out.push(chars[i + 1]);
                        }
                        i += 2;
                        continue;
                    }
                    if s == c {
                        break;
                    }
                    if s == '"' {
                        out.push_str("\\\"");
                    } else {
                        out.push(s);
                    }
                    i += 1;
                }
                out.push('"');
                i += 1;
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Decode JSON string escapes, keeping the raw text if they are invalid.
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(map: Option<Map<String, Value>>) -> Value {
        Value::Object(map.expect("expected a mapping"))
    }

    #[test]
    fn test_object_with_trailing_prose() {
        let text = r#"Here is the result: {"tool_name": "chat", "parameters": {"response": "hi"}} thanks!"#;
        assert_eq!(
            as_value(try_parse_decision(text, "tool_name")),
            json!({"tool_name": "chat", "parameters": {"response": "hi"}})
        );
    }

    #[test]
    fn test_code_fenced_multiline_object() {
        let text = "```json\n{\n  \"agent\": \"deployment\",\n  \"reasoning\": \"scale request\"\n}\n```";
        let map = try_parse_decision(text, "agent").unwrap();
        assert_eq!(map["agent"], "deployment");
        assert_eq!(map["reasoning"], "scale request");
    }

    #[test]
    fn test_thinking_block_before_json() {
        let text = "<think>The user wants {something}.</think>\n{\"tool_name\": \"list_clusters\", \"parameters\": {}}";
        let map = try_parse_decision(text, "tool_name").unwrap();
        assert_eq!(map["tool_name"], "list_clusters");
    }

    #[test]
    fn test_skips_objects_without_discriminator() {
        let text = r#"{"note": "ignore me"} and then {"tool_name": "check_health", "parameters": {}}"#;
        let map = try_parse_decision(text, "tool_name").unwrap();
        assert_eq!(map["tool_name"], "check_health");
    }

    #[test]
    fn test_python_style_line() {
        let text = "Decision:\n{'tool_name': 'scale_deployment', 'parameters': {'replicas': 3, 'dry_run': False,},}\n";
        let map = try_parse_decision(text, "tool_name").unwrap();
        assert_eq!(map["tool_name"], "scale_deployment");
        assert_eq!(map["parameters"], json!({"replicas": 3, "dry_run": false}));
    }

    #[test]
    fn test_truncated_json_scrapes_discriminator() {
        let text = r#"{"tool_name": "scale_deployment", "parameters": {"deployment_name": "ngi"#;
        let map = try_parse_decision(text, "tool_name").unwrap();
        assert_eq!(map["tool_name"], "scale_deployment");
        assert!(!map.contains_key("parameters"));
    }

    #[test]
    fn test_scrape_recovers_companion_fields() {
        let text = "agent = maybe? \"agent\": \"chat\", \"reasoning\": \"greeting\", \"response\": \"Hello \\\"there\\\"\" <- broken";
        let map = try_parse_decision(text, "agent").unwrap();
        assert_eq!(map["agent"], "chat");
        assert_eq!(map["reasoning"], "greeting");
        assert_eq!(map["response"], "Hello \"there\"");
    }

    #[test]
    fn test_scrape_recovers_balanced_parameters() {
        let text = r#"tool: "tool_name": "install_chart", "parameters": {"chart": "bitnami/redis", "values": {"replicaCount": 2}} ... oops {"#;
        let map = try_parse_decision(text, "tool_name").unwrap();
        assert_eq!(map["tool_name"], "install_chart");
        assert_eq!(
            map["parameters"],
            json!({"chart": "bitnami/redis", "values": {"replicaCount": 2}})
        );
    }

    #[test]
    fn test_none_for_inputs_without_decision() {
        assert!(try_parse_decision("", "tool_name").is_none());
        assert!(try_parse_decision("   \n ", "tool_name").is_none());
        assert!(try_parse_decision("I am not sure what you mean.", "tool_name").is_none());
        assert!(try_parse_decision(r#"{"agent": "cluster"}"#, "tool_name").is_none());
    }

    #[test]
    fn test_malformed_inputs_never_yield_keyless_mapping() {
        let inputs = [
            "",
            "{",
            "}",
            "}{",
            "{{{{",
            r#"{"tool_name""#,
            r#"{"tool_name": }"#,
            r#"{"tool_name": "x", "parameters": {"a": [1, 2}"#,
            r#"{'tool_name': 'x'"#,
            "tool_name tool_name tool_name",
            "{\"tool_name\": \"scale\"} trailing } } {",
            "\\\"\\'{'\"",
            "ölçekle {\"tool_name\": \"ç\"}",
        ];

        for input in inputs {
            if let Some(map) = try_parse_decision(input, "tool_name") {
                assert!(map.contains_key("tool_name"), "input: {input}");
            }
        }
    }

    #[test]
    fn test_relax_keeps_apostrophes_inside_double_quotes() {
        let value = parse_relaxed(r#"{"response": "it's fine", 'ok': True}"#).unwrap();
        assert_eq!(value, json!({"response": "it's fine", "ok": true}));
    }

    #[test]
    fn test_matching_brace_ignores_quoted_braces() {
        let text = r#"{"a": "}", "b": {"c": 1}} tail"#;
        assert_eq!(matching_brace(text, 0), Some(text.len() - 6));
    }
}
