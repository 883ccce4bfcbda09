//! String templating
//!
//! Renders `{key}` placeholders from ordered value sources. Hosts use this
//! for module-provided message and path templates where the available
//! properties are not known at compile time.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([\w.]+)\}").expect("placeholder pattern is valid")
    })
}

/// Render `{key}` placeholders in `template` from `sources`.
///
/// Keys are looked up in each source in order; the first source that has
/// the key wins. Object sources answer by field name, with `.`-separated
/// paths descending into nested objects and arrays (`{peer.addr}`,
/// `{items.0}`). Non-object sources answer to their position (`{0}`).
///
/// A key no source can answer renders as the key name itself, so a
/// template with a typo stays legible instead of failing. `{{` and `}}`
/// escape literal braces.
pub fn render(template: &str, sources: &[&Value]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| match &caps[0] {
            "{{" => "{".to_string(),
            "}}" => "}".to_string(),
            _ => {
                let key = &caps[1];
                lookup(sources, key)
                    .map(render_value)
                    .unwrap_or_else(|| key.to_string())
            }
        })
        .into_owned()
}

fn lookup<'v>(sources: &[&'v Value], path: &str) -> Option<&'v Value> {
    sources
        .iter()
        .enumerate()
        .find_map(|(index, source)| resolve_path(source, index, path))
}

fn resolve_path<'v>(source: &'v Value, index: usize, path: &str) -> Option<&'v Value> {
    // Non-object sources answer to their position in the source list.
    if !source.is_object() {
        return (path == index.to_string()).then_some(source);
    }

    let mut current = source;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
