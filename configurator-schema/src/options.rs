//! Option-cell parsing.
//!
//! Schema authors fill the `options` cell by hand, so three syntaxes are accepted,
//! tried in order:
//! 1. a JSON object: `{"Small":"s","Large":"l"}`
//! 2. a comma list of `key` or `key:value` entries: `monthly:M, yearly:Y` or `red,green`
//! 3. anything else becomes a single option whose label and value are the raw cell
//!
//! Parsing never fails, and a non-empty cell always yields at least one option.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One choice in a select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Label to value mapping for one field. Labels are unique within a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    options: Vec<SelectOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value for `label`. An overwritten label keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.options.iter_mut().find(|o| o.label == label) {
            Some(existing) => existing.value = value,
            None => self.options.push(SelectOption { label, value }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter()
    }

    /// True if some option carries `value`.
    pub fn contains_value(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    fn literal(raw: &str) -> Self {
        let mut set = Self::new();
        set.insert(raw, raw);
        set
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (label, value) in iter {
            set.insert(label, value);
        }
        set
    }
}

/// Outcome of one parse attempt.
#[derive(Debug)]
enum Attempt {
    /// The cell was understood as a mapping.
    Mapping(OptionSet),
    /// The syntax was recognised but the result is not a usable mapping.
    NotAMapping,
    /// The syntax did not apply; try the next one.
    Unrecognised,
}

/// Parse an `options` cell into an [`OptionSet`].
pub fn parse_options(raw: &str) -> OptionSet {
    if raw.is_empty() {
        return OptionSet::new();
    }

    let attempt = match parse_structured(raw) {
        Attempt::Unrecognised => parse_delimited(raw),
        other => other,
    };

    match attempt {
        Attempt::Mapping(set) => set,
        Attempt::NotAMapping | Attempt::Unrecognised => OptionSet::literal(raw),
    }
}

fn parse_structured(raw: &str) -> Attempt {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) if !map.is_empty() => Attempt::Mapping(
            map.into_iter()
                .map(|(label, value)| (label, json_cell_text(value)))
                .collect(),
        ),
        Ok(_) => Attempt::NotAMapping,
        Err(_) => Attempt::Unrecognised,
    }
}

fn json_cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_delimited(raw: &str) -> Attempt {
    // A lone token with no separators is a literal, not a list.
    if !raw.contains(',') && !raw.contains(':') {
        return Attempt::NotAMapping;
    }

    let set: OptionSet = raw
        .split(',')
        .filter_map(|entry| {
            let (key, value) = match entry.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (entry.trim(), ""),
            };
            if key.is_empty() {
                return None;
            }
            let value = if value.is_empty() { key } else { value };
            Some((key.to_string(), value.to_string()))
        })
        .collect();

    if set.is_empty() {
        Attempt::NotAMapping
    } else {
        Attempt::Mapping(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(set: &OptionSet) -> Vec<(&str, &str)> {
        set.iter()
            .map(|o| (o.label.as_str(), o.value.as_str()))
            .collect()
    }

    #[test]
    fn test_key_value_list() {
        let set = parse_options("A:1,B:2");
        assert_eq!(pairs(&set), vec![("A", "1"), ("B", "2")]);
    }

    #[test]
    fn test_bare_list_uses_key_as_value() {
        let set = parse_options("red,green,blue");
        assert_eq!(
            pairs(&set),
            vec![("red", "red"), ("green", "green"), ("blue", "blue")]
        );
    }

    #[test]
    fn test_unstructured_text_is_literal() {
        let set = parse_options("not json; no colons");
        assert_eq!(
            pairs(&set),
            vec![("not json; no colons", "not json; no colons")]
        );
    }

    #[test]
    fn test_whitespace_is_trimmed_around_separator() {
        let set = parse_options(" monthly : M ,  yearly:Y ");
        assert_eq!(pairs(&set), vec![("monthly", "M"), ("yearly", "Y")]);
    }

    #[test]
    fn test_json_object_used_verbatim() {
        let set = parse_options(r#"{"Small":"s","Count":3,"On":true}"#);
        assert_eq!(set.get("Small"), Some("s"));
        assert_eq!(set.get("Count"), Some("3"));
        assert_eq!(set.get("On"), Some("true"));
        assert_eq!(set.len(), 3);
        assert_eq!(
            pairs(&set),
            vec![("Small", "s"), ("Count", "3"), ("On", "true")]
        );
    }

    #[test]
    fn test_json_non_object_falls_back_to_literal() {
        for raw in ["42", "\"quoted\"", "[1,2]", "null", "true", "{}"] {
            let set = parse_options(raw);
            assert_eq!(pairs(&set), vec![(raw, raw)], "raw: {}", raw);
        }
    }

    #[test]
    fn test_value_keeps_text_after_first_colon() {
        let set = parse_options("docs:https://example.com/a");
        assert_eq!(set.get("docs"), Some("https://example.com/a"));
    }

    #[test]
    fn test_empty_entries_are_skipped() {
        let set = parse_options("a,,b,");
        assert_eq!(pairs(&set), vec![("a", "a"), ("b", "b")]);

        let set = parse_options(" , ");
        assert_eq!(pairs(&set), vec![(" , ", " , ")]);
    }

    #[test]
    fn test_duplicate_label_overwrites_in_place() {
        let set = parse_options("a:1,b:2,a:3");
        assert_eq!(pairs(&set), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_empty_input_gives_empty_set() {
        assert!(parse_options("").is_empty());
    }

    #[test]
    fn test_never_empty_for_non_empty_input() {
        let inputs = [
            " ", ":", ",", "::", ",:,", "{", "}", "{\"a\"", "[", "a", ":x", "x:", "\u{1F600}",
            "a:b:c", "\"", "{\"k\":{}}", "  lead", "trail  ",
        ];
        for raw in inputs {
            assert!(!parse_options(raw).is_empty(), "empty result for {:?}", raw);
        }
    }
}
