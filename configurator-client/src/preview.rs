//! Live block preview.
//!
//! The preview is a link element whose `href` carries the block config. On every
//! state change the element is replaced by a fresh one, the block loader is asked
//! to activate it, and the raw state is saved.

use configurator_schema::FormState;
use std::sync::{Arc, Mutex};

use crate::error::{ConfiguratorError, ConfiguratorResult};
use crate::html::escape_html;
use crate::share_link::ShareLinkEncoder;
use crate::state::Listener;
use crate::storage::Persistence;

/// The `<a class="{block}" href="{link}">{link}</a>` element a block loads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerElement {
    pub class: String,
    pub href: String,
    pub text: String,
}

impl MarkerElement {
    pub fn link(block: &str, href: &str) -> Self {
        Self {
            class: block.to_string(),
            href: href.to_string(),
            text: href.to_string(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }

    pub fn to_html(&self) -> String {
        format!(
            "<a class=\"{}\" href=\"{}\">{}</a>",
            escape_html(&self.class),
            escape_html(&self.href),
            escape_html(&self.text)
        )
    }
}

/// The page the preview element lives in.
pub trait PreviewDocument: Send + Sync {
    /// Replace the first element carrying `class` with `element`.
    fn replace_by_class(&self, class: &str, element: MarkerElement) -> ConfiguratorResult<()>;
    fn find_by_class(&self, class: &str) -> Option<MarkerElement>;
    /// Attach `element` at the end of the preview area.
    fn insert(&self, element: MarkerElement);
}

/// Activates a block from its marker element. May finish asynchronously; the
/// element is already attached when this is called.
pub trait BlockLoader: Send + Sync {
    fn load_block(&self, element: &MarkerElement) -> ConfiguratorResult<()>;
}

/// In-memory element list standing in for a page.
#[derive(Debug, Default)]
pub struct MarkupDocument {
    elements: Mutex<Vec<MarkerElement>>,
}

impl MarkupDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> Vec<MarkerElement> {
        self.elements
            .lock()
            .map(|elements| elements.clone())
            .unwrap_or_default()
    }
}

impl PreviewDocument for MarkupDocument {
    fn replace_by_class(&self, class: &str, element: MarkerElement) -> ConfiguratorResult<()> {
        let mut elements = self.elements.lock().map_err(|_| ConfiguratorError::ElementNotFound {
            class: class.to_string(),
        })?;
        let slot = elements
            .iter_mut()
            .find(|e| e.has_class(class))
            .ok_or_else(|| ConfiguratorError::ElementNotFound {
                class: class.to_string(),
            })?;
        *slot = element;
        Ok(())
    }

    fn find_by_class(&self, class: &str) -> Option<MarkerElement> {
        let elements = self.elements.lock().ok()?;
        elements.iter().find(|e| e.has_class(class)).cloned()
    }

    fn insert(&self, element: MarkerElement) {
        if let Ok(mut elements) = self.elements.lock() {
            elements.push(element);
        }
    }
}

/// Collaborators a tool preview talks to.
#[derive(Clone)]
pub struct PreviewServices {
    pub document: Arc<dyn PreviewDocument>,
    pub loader: Arc<dyn BlockLoader>,
    pub persistence: Arc<dyn Persistence>,
    pub encoder: ShareLinkEncoder,
}

/// Keeps one block preview in step with the form state.
pub struct PreviewSync {
    block: String,
    storage_key: String,
    base_url: String,
    services: PreviewServices,
}

impl PreviewSync {
    pub fn new(
        block: impl Into<String>,
        storage_key: impl Into<String>,
        base_url: impl Into<String>,
        services: PreviewServices,
    ) -> Self {
        Self {
            block: block.into(),
            storage_key: storage_key.into(),
            base_url: base_url.into(),
            services,
        }
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn document(&self) -> &Arc<dyn PreviewDocument> {
        &self.services.document
    }

    /// State saved by an earlier session of this tool, if any.
    pub fn saved_state(&self) -> Option<FormState> {
        self.services.persistence.load(&self.storage_key)
    }

    /// State carried by a share token in the page URL, if any. A token that
    /// does not decode is logged and ignored.
    pub fn shared_state(&self) -> Option<FormState> {
        match self.services.encoder.shared_state(&self.base_url) {
            Ok(shared) => shared,
            Err(e) => {
                tracing::warn!("ignoring unreadable share token for '{}': {}", self.block, e);
                None
            }
        }
    }

    /// The share link for `state`. Same value [`PreviewSync::sync`] puts on the element.
    pub fn link(&self, state: &FormState) -> ConfiguratorResult<String> {
        self.services.encoder.build_link(&self.base_url, state)
    }

    /// Refresh the preview for `state`. Steps, in order:
    /// 1. build the link
    /// 2. swap a new marker element in for the current one
    /// 3. ask the loader to activate it (only if the swap happened)
    /// 4. save the raw state
    ///
    /// Step 4 always runs. Failures in 2-4 are logged; a failure in 1 is returned
    /// after the save.
    pub fn sync(&self, state: &FormState) -> ConfiguratorResult<String> {
        let link = match self.link(state) {
            Ok(link) => link,
            Err(e) => {
                self.persist(state);
                return Err(e);
            }
        };

        let element = MarkerElement::link(&self.block, &link);
        match self
            .services
            .document
            .replace_by_class(&self.block, element.clone())
        {
            Ok(()) => {
                if let Err(e) = self.services.loader.load_block(&element) {
                    tracing::warn!("block '{}' reload failed: {}", self.block, e);
                }
            }
            Err(e) => tracing::warn!("preview swap for '{}' failed: {}", self.block, e),
        }

        self.persist(state);
        tracing::debug!("preview '{}' synced", self.block);
        Ok(link)
    }

    fn persist(&self, state: &FormState) {
        if let Err(e) = self.services.persistence.save(state, &self.storage_key) {
            tracing::warn!("saving '{}' failed: {}", self.storage_key, e);
        }
    }

    /// Wrap as a state listener.
    pub fn into_listener(self: Arc<Self>) -> Listener {
        Arc::new(move |state: &FormState| self.sync(state).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_html_is_escaped() {
        let el = MarkerElement::link("pricing", "https://a.test/p?x=1&y=2#abc");
        assert_eq!(
            el.to_html(),
            "<a class=\"pricing\" href=\"https://a.test/p?x=1&amp;y=2#abc\">https://a.test/p?x=1&amp;y=2#abc</a>"
        );
    }

    #[test]
    fn test_replace_by_class() {
        let doc = MarkupDocument::new();
        doc.insert(MarkerElement::link("other", "o"));
        doc.insert(MarkerElement::link("pricing", "old"));

        doc.replace_by_class("pricing", MarkerElement::link("pricing", "new"))
            .unwrap();
        assert_eq!(doc.find_by_class("pricing").unwrap().href, "new");
        assert_eq!(doc.elements()[0].href, "o");

        let missing = doc.replace_by_class("absent", MarkerElement::link("absent", "x"));
        assert!(matches!(missing, Err(ConfiguratorError::ElementNotFound { .. })));
    }

    #[test]
    fn test_has_class_matches_tokens() {
        let el = MarkerElement {
            class: "pricing wide".to_string(),
            href: String::new(),
            text: String::new(),
        };
        assert!(el.has_class("wide"));
        assert!(!el.has_class("pri"));
    }
}
