use std::collections::BTreeMap;

use crate::schema::SchemaDocument;

/// Flat state: canonical prop to current value.
pub type FormState = BTreeMap<String, String>;

/// Build the default state for every field of every panel.
///
/// The key set equals the canonical props of the document. A field without a
/// declared default maps to `""`. When two props fold to the same key the later
/// field in document order wins.
pub fn build_defaults(doc: &SchemaDocument) -> FormState {
    let mut state = FormState::new();
    for field in doc.fields() {
        state.insert(field.canonical_prop(), field.default_value().to_string());
    }
    tracing::debug!("built {} default values", state.len());
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, PanelSchema};

    fn field(prop: &str, default: Option<&str>) -> FieldDescriptor {
        FieldDescriptor {
            label: prop.to_string(),
            prop: prop.to_string(),
            default: default.map(str::to_string),
            options: None,
        }
    }

    #[test]
    fn test_defaults_cover_every_panel() {
        let doc = SchemaDocument {
            panels: vec![
                PanelSchema {
                    name: "a".to_string(),
                    fields: vec![field("One", Some("1")), field("two", None)],
                },
                PanelSchema {
                    name: "b".to_string(),
                    fields: vec![field("three", Some("x"))],
                },
            ],
        };

        let state = build_defaults(&doc);
        assert_eq!(state.len(), 3);
        assert_eq!(state["one"], "1");
        assert_eq!(state["two"], "");
        assert_eq!(state["three"], "x");
    }

    #[test]
    fn test_case_folded_props_collide() {
        let doc = SchemaDocument {
            panels: vec![PanelSchema {
                name: "p".to_string(),
                fields: vec![field("Mode", Some("a")), field("MODE", Some("b"))],
            }],
        };
        let state = build_defaults(&doc);
        assert_eq!(state.len(), 1);
        assert_eq!(state["mode"], "b");
    }

    #[test]
    fn test_empty_document_gives_empty_state() {
        assert!(build_defaults(&SchemaDocument::empty()).is_empty());
    }
}
