//! Mounted configurator tools.
//!
//! Each mount gets an id in a [`ToolStore`]. The schema fetch is the only await;
//! when it resolves, the result is applied only if the tool is still mounted.
//! State changes are staged under the tool's entry lock and the preview sync
//! runs after the lock is released, so collaborators may read the store.

use configurator_schema::{build_defaults, build_panels, FormState, Panel, SchemaDocument};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ConfiguratorConfig;
use crate::error::{ConfiguratorError, ConfiguratorResult};
use crate::html::{render_tool_html, ToolView};
use crate::loader::SchemaLoader;
use crate::preview::{MarkerElement, PreviewServices, PreviewSync};
use crate::state::{dispatch_staged, initial_state, StateContainer};

/// One row of the authored block: its text and the hrefs of its links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRow {
    pub text: String,
    pub links: Vec<String>,
}

/// The container element a configurator is initialized from.
///
/// Row 0 names the block to configure; row 1 links the JSON schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockElement {
    pub rows: Vec<BlockRow>,
}

/// Names derived from the block identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Identifier as authored, e.g. `Pricing`
    pub block: String,
    /// Lowercase identifier, used as the preview element class
    pub block_name: String,
    pub title: String,
    pub storage_key: String,
    pub schema_link: String,
}

impl Mount {
    pub fn from_block(el: &BlockElement) -> ConfiguratorResult<Self> {
        let block = el
            .rows
            .first()
            .map(|row| row.text.trim())
            .filter(|text| !text.is_empty())
            .ok_or(ConfiguratorError::MissingBlockName)?;

        let schema_link = el
            .rows
            .get(1)
            .and_then(|row| row.links.iter().find(|href| href.ends_with("json")))
            .ok_or(ConfiguratorError::MissingSchemaLink)?;

        let block_name = block.to_lowercase();
        Ok(Self {
            block: block.to_string(),
            title: format!("{} Configurator", block),
            storage_key: format!("{}ConfiguratorState", block_name),
            block_name,
            schema_link: schema_link.clone(),
        })
    }
}

/// A mounted tool: its schema-derived panels, live state and preview.
pub struct ToolState {
    pub mount: Mount,
    pub panels: Vec<Panel>,
    container: StateContainer,
    preview: Arc<PreviewSync>,
}

impl ToolState {
    pub fn state(&self) -> &FormState {
        self.container.state()
    }
}

/// Mounted tools by id.
pub type ToolStore = DashMap<String, ToolState>;

pub fn new_tool_store() -> ToolStore {
    DashMap::new()
}

/// Register a tool for `el` and put its preview element in the document.
/// Panels stay empty until [`load_schema`] applies a schema.
pub fn mount(
    store: &ToolStore,
    el: &BlockElement,
    config: &ConfiguratorConfig,
    services: PreviewServices,
) -> ConfiguratorResult<String> {
    let mount = Mount::from_block(el)?;
    let preview = Arc::new(PreviewSync::new(
        mount.block_name.clone(),
        mount.storage_key.clone(),
        config.base_url.clone(),
        services,
    ));

    let container = StateContainer::default();
    if preview.document().find_by_class(&mount.block_name).is_none() {
        let link = preview.link(container.state())?;
        preview
            .document()
            .insert(MarkerElement::link(&mount.block_name, &link));
    }

    let mut tool = ToolState {
        mount,
        panels: Vec::new(),
        container,
        preview: preview.clone(),
    };
    tool.container.subscribe(preview.into_listener());

    let id = Uuid::new_v4().to_string();
    tracing::info!("mounted {} as {}", tool.mount.title, id);
    store.insert(id.clone(), tool);
    Ok(id)
}

/// Fetch the tool's schema and apply it. Returns `false` if the tool was
/// unmounted before the schema arrived.
pub async fn load_schema(
    store: &ToolStore,
    id: &str,
    loader: &SchemaLoader,
) -> ConfiguratorResult<bool> {
    let url = store
        .get(id)
        .map(|tool| tool.mount.schema_link.clone())
        .ok_or_else(|| ConfiguratorError::ToolNotFound(id.to_string()))?;

    let doc = loader.fetch(&url).await;
    apply_schema(store, id, &doc)
}

/// Build panels and state from `doc` for a mounted tool.
///
/// The new state is the schema defaults with saved values laid over them, then
/// the values of a share token in the page URL; the preview syncs if that
/// differs from the current state.
pub fn apply_schema(store: &ToolStore, id: &str, doc: &SchemaDocument) -> ConfiguratorResult<bool> {
    let staged = {
        let Some(mut tool) = store.get_mut(id) else {
            tracing::debug!("tool {} unmounted before its schema arrived; dropping it", id);
            return Ok(false);
        };

        let defaults = build_defaults(doc);
        let saved = tool.preview.saved_state();
        let shared = tool.preview.shared_state();
        tool.panels = build_panels(doc);
        tracing::info!(
            "{}: {} panels, {} fields",
            tool.mount.title,
            tool.panels.len(),
            defaults.len()
        );

        let state = initial_state(&defaults, saved.as_ref(), shared.as_ref());
        tool.container.stage_replace(state)
    };

    dispatch_staged(staged)?;
    Ok(true)
}

/// Mount `el` and load its schema: the configurator's single entry point.
///
/// If loading fails the tool is unmounted again before the error is returned.
pub async fn init(
    store: &ToolStore,
    el: &BlockElement,
    config: &ConfiguratorConfig,
    services: PreviewServices,
    loader: &SchemaLoader,
) -> ConfiguratorResult<String> {
    let id = mount(store, el, config, services)?;
    if let Err(e) = load_schema(store, &id, loader).await {
        unmount(store, &id);
        return Err(e);
    }
    Ok(id)
}

/// Apply one user edit. Returns whether the state changed.
pub fn update_field(
    store: &ToolStore,
    id: &str,
    prop: &str,
    value: &str,
) -> ConfiguratorResult<bool> {
    let staged = store
        .get_mut(id)
        .ok_or_else(|| ConfiguratorError::ToolNotFound(id.to_string()))?
        .container
        .stage_set(prop, value);
    dispatch_staged(staged)
}

pub fn current_state(store: &ToolStore, id: &str) -> ConfiguratorResult<FormState> {
    store
        .get(id)
        .map(|tool| tool.state().clone())
        .ok_or_else(|| ConfiguratorError::ToolNotFound(id.to_string()))
}

/// Link for the copy button. Identical to the preview element's link.
pub fn current_link(store: &ToolStore, id: &str) -> ConfiguratorResult<String> {
    let tool = store
        .get(id)
        .ok_or_else(|| ConfiguratorError::ToolNotFound(id.to_string()))?;
    tool.preview.link(tool.state())
}

pub fn render_tool(store: &ToolStore, id: &str) -> ConfiguratorResult<String> {
    let tool = store
        .get(id)
        .ok_or_else(|| ConfiguratorError::ToolNotFound(id.to_string()))?;

    let link = tool.preview.link(tool.state())?;
    let marker = tool.preview.document().find_by_class(&tool.mount.block_name);
    Ok(render_tool_html(&ToolView {
        title: &tool.mount.title,
        panels: &tool.panels,
        state: tool.state(),
        link: Some(&link),
        marker: marker.as_ref(),
    }))
}

/// Drop a tool. Returns `false` if it was not mounted.
pub fn unmount(store: &ToolStore, id: &str) -> bool {
    let removed = store.remove(id).is_some();
    if removed {
        tracing::info!("unmounted {}", id);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: Vec<(&str, Vec<&str>)>) -> BlockElement {
        BlockElement {
            rows: rows
                .into_iter()
                .map(|(text, links)| BlockRow {
                    text: text.to_string(),
                    links: links.into_iter().map(str::to_string).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_mount_names() {
        let el = block(vec![
            ("  Pricing \n", vec![]),
            (
                "schema",
                vec!["https://a.test/docs.html", "https://a.test/Pricing.json"],
            ),
        ]);
        let mount = Mount::from_block(&el).unwrap();
        assert_eq!(mount.block, "Pricing");
        assert_eq!(mount.block_name, "pricing");
        assert_eq!(mount.title, "Pricing Configurator");
        assert_eq!(mount.storage_key, "pricingConfiguratorState");
        assert_eq!(mount.schema_link, "https://a.test/Pricing.json");
    }

    #[test]
    fn test_mount_requires_rows() {
        assert!(matches!(
            Mount::from_block(&block(vec![])),
            Err(ConfiguratorError::MissingBlockName)
        ));
        assert!(matches!(
            Mount::from_block(&block(vec![("   ", vec![])])),
            Err(ConfiguratorError::MissingBlockName)
        ));
        assert!(matches!(
            Mount::from_block(&block(vec![("Pricing", vec![])])),
            Err(ConfiguratorError::MissingSchemaLink)
        ));
        assert!(matches!(
            Mount::from_block(&block(vec![
                ("Pricing", vec![]),
                ("", vec!["https://a.test/x.html"])
            ])),
            Err(ConfiguratorError::MissingSchemaLink)
        ));
    }
}
