use serde::{Deserialize, Serialize};

use crate::options::{parse_options, OptionSet};
use crate::schema::{FieldDescriptor, SchemaDocument};

/// A form control for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldControl {
    /// Free text entry
    Text { label: String, prop: String },
    /// Choice among parsed options
    Choice {
        label: String,
        prop: String,
        options: OptionSet,
    },
}

impl FieldControl {
    pub fn label(&self) -> &str {
        match self {
            FieldControl::Text { label, .. } | FieldControl::Choice { label, .. } => label,
        }
    }

    /// Canonical (lowercase) state key this control edits.
    pub fn prop(&self) -> &str {
        match self {
            FieldControl::Text { prop, .. } | FieldControl::Choice { prop, .. } => prop,
        }
    }

    pub fn options(&self) -> Option<&OptionSet> {
        match self {
            FieldControl::Text { .. } => None,
            FieldControl::Choice { options, .. } => Some(options),
        }
    }

    fn from_descriptor(field: &FieldDescriptor) -> Self {
        let label = field.label.clone();
        let prop = field.canonical_prop();
        match field.options.as_deref() {
            None => FieldControl::Text { label, prop },
            Some(raw) => FieldControl::Choice {
                label,
                prop,
                options: parse_options(raw),
            },
        }
    }
}

/// A titled group of controls, shown as one accordion item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub fields: Vec<FieldControl>,
}

/// Build the panel list in document order.
pub fn build_panels(doc: &SchemaDocument) -> Vec<Panel> {
    doc.panels
        .iter()
        .map(|panel| Panel {
            title: capitalize_first(&panel.name),
            fields: panel.fields.iter().map(FieldControl::from_descriptor).collect(),
        })
        .collect()
}

/// Upper-case the first character only; the rest is left as authored.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
