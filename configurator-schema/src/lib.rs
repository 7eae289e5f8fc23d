//! # Configurator schema
//!
//! Reads the panel/field schema that drives a block configurator and derives
//! everything the form needs from it.
//!
//! ## Features
//! - Tolerant ingestion of the `{ ":names": [...], name: { "data": [...] } }` sheet format
//! - Default state derivation with lowercase prop keys
//! - Ordered panel and control description for rendering
//! - Option cells in JSON, `key:value` list or literal form
//!
//! ## Example
//! ```
//! use configurator_schema::{build_defaults, build_panels, SchemaDocument};
//!
//! let json = r#"{
//!   ":names": ["pricing"],
//!   "pricing": { "data": [
//!     { "label": "Seats", "prop": "Seats", "default": "1" },
//!     { "label": "Term", "prop": "Term", "options": "monthly:M,yearly:Y" }
//!   ] }
//! }"#;
//!
//! let doc = SchemaDocument::from_json_str(json).unwrap();
//! let defaults = build_defaults(&doc);
//! assert_eq!(defaults["seats"], "1");
//! assert_eq!(build_panels(&doc)[0].title, "Pricing");
//! ```

pub mod defaults;
pub mod error;
pub mod options;
pub mod panels;
pub mod schema;

pub use defaults::{build_defaults, FormState};
pub use error::{SchemaError, SchemaResult};
pub use options::{parse_options, OptionSet, SelectOption};
pub use panels::{build_panels, capitalize_first, FieldControl, Panel};
pub use schema::{FieldDescriptor, PanelSchema, SchemaDocument};

/// Parse schema text and derive both the panels and the default state.
pub fn load_schema_str(json: &str) -> SchemaResult<(Vec<Panel>, FormState)> {
    let doc = SchemaDocument::from_json_str(json)?;
    Ok((build_panels(&doc), build_defaults(&doc)))
}
