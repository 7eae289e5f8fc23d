use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaResult;

/// Key holding the ordered list of panel names in a schema document.
pub const NAMES_KEY: &str = ":names";

/// Key holding the field rows inside a panel entry.
pub const DATA_KEY: &str = "data";

/// A configurable value as authored in the schema sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    /// Raw state key, case as authored. Use [`FieldDescriptor::canonical_prop`] as the state key.
    pub prop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl FieldDescriptor {
    /// Lowercased prop. Descriptors differing only in case share one state entry.
    pub fn canonical_prop(&self) -> String {
        self.prop.to_lowercase()
    }

    /// Declared default, or the empty string when none was declared.
    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or("")
    }
}

/// A named, ordered group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

/// The remote description of panels and fields.
///
/// Panel order and field order are exactly the authored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub panels: Vec<PanelSchema>,
}

impl SchemaDocument {
    /// A document with no panels. Renders nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel_names(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|p| p.name.as_str())
    }

    /// Every field of every panel, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.panels.iter().flat_map(|p| p.fields.iter())
    }

    /// Parse schema text. Only invalid JSON is an error; shape problems are tolerated.
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json_value(&value))
    }

    /// Normalize a JSON value of the form
    /// `{ ":names": [name...], name: { "data": [field...] } }`.
    ///
    /// Never fails. Anything unusable is skipped:
    /// - a root that is not an object, or a missing `:names`, gives an empty document
    /// - a listed panel without an entry or without `data` gives a panel with no fields
    /// - a field row without a usable `prop` is dropped
    pub fn from_json_value(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            tracing::warn!("schema root is not an object, treating as empty");
            return Self::empty();
        };

        let Some(names) = root.get(NAMES_KEY).and_then(Value::as_array) else {
            tracing::warn!("schema has no '{}' list, treating as empty", NAMES_KEY);
            return Self::empty();
        };

        let panels = names
            .iter()
            .filter_map(|name| match name.as_str() {
                Some(n) => Some(n),
                None => {
                    tracing::warn!("skipping non-string panel name {}", name);
                    None
                }
            })
            .map(|name| PanelSchema {
                name: name.to_string(),
                fields: parse_panel_fields(name, root.get(name)),
            })
            .collect();

        Self { panels }
    }
}

fn parse_panel_fields(panel: &str, entry: Option<&Value>) -> Vec<FieldDescriptor> {
    let Some(rows) = entry
        .and_then(Value::as_object)
        .and_then(|e| e.get(DATA_KEY))
        .and_then(Value::as_array)
    else {
        tracing::warn!("panel '{}' has no '{}' rows", panel, DATA_KEY);
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let field = row.as_object().and_then(parse_field);
            if field.is_none() {
                tracing::warn!("panel '{}': skipping field row without a prop: {}", panel, row);
            }
            field
        })
        .collect()
}

fn parse_field(row: &Map<String, Value>) -> Option<FieldDescriptor> {
    let prop = cell_text(row.get("prop"))?;
    let label = cell_text(row.get("label")).unwrap_or_else(|| prop.clone());
    Some(FieldDescriptor {
        label,
        prop,
        default: cell_text(row.get("default")),
        options: cell_text(row.get("options")),
    })
}

/// Sheet cells arrive as strings, but hand-edited JSON may carry numbers or booleans.
/// Empty strings count as absent.
fn cell_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_panels_in_declared_order() {
        let doc = SchemaDocument::from_json_value(&json!({
            ":names": ["layout", "content"],
            "content": { "data": [{ "label": "Title", "prop": "title" }] },
            "layout": { "data": [{ "label": "Columns", "prop": "cols", "default": "3" }] }
        }));

        let names: Vec<&str> = doc.panel_names().collect();
        assert_eq!(names, vec!["layout", "content"]);
        assert_eq!(doc.panels[0].fields[0].default.as_deref(), Some("3"));
        assert_eq!(doc.panels[1].fields[0].default, None);
    }

    #[test]
    fn test_missing_names_is_empty() {
        assert!(SchemaDocument::from_json_value(&json!({})).is_empty());
        assert!(SchemaDocument::from_json_value(&json!([1, 2])).is_empty());
        assert!(SchemaDocument::from_json_value(&json!({ ":names": "x" })).is_empty());
    }

    #[test]
    fn test_listed_panel_without_entry_has_no_fields() {
        let doc = SchemaDocument::from_json_value(&json!({ ":names": ["ghost"] }));
        assert_eq!(doc.panels.len(), 1);
        assert!(doc.panels[0].fields.is_empty());
    }

    #[test]
    fn test_field_without_prop_is_dropped() {
        let doc = SchemaDocument::from_json_value(&json!({
            ":names": ["p"],
            "p": { "data": [
                { "label": "No prop" },
                { "label": "Ok", "prop": "ok" },
                "not a row"
            ] }
        }));
        assert_eq!(doc.fields().count(), 1);
        assert_eq!(doc.panels[0].fields[0].prop, "ok");
    }

    #[test]
    fn test_cells_are_stringified_and_empty_is_absent() {
        let doc = SchemaDocument::from_json_value(&json!({
            ":names": ["p"],
            "p": { "data": [{ "prop": "count", "default": 4, "options": "" }] }
        }));
        let field = &doc.panels[0].fields[0];
        assert_eq!(field.label, "count");
        assert_eq!(field.default.as_deref(), Some("4"));
        assert_eq!(field.options, None);
    }

    #[test]
    fn test_canonical_prop_is_lowercase() {
        let field = FieldDescriptor {
            label: "Seats".to_string(),
            prop: "SeatCount".to_string(),
            default: None,
            options: None,
        };
        assert_eq!(field.canonical_prop(), "seatcount");
        assert_eq!(field.default_value(), "");
    }

    #[test]
    fn test_from_json_str_rejects_invalid_json() {
        assert!(SchemaDocument::from_json_str("{ nope").is_err());
        assert!(SchemaDocument::from_json_str("\"text\"").unwrap().is_empty());
    }
}
