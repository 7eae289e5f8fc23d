//! Configurator runtime.
//!
//! Loads a block's panel schema, keeps the form state, and keeps a live preview
//! of the block pointed at a share link that encodes that state.
//!
//! ```ignore
//! use configurator_client::*;
//! use std::sync::Arc;
//!
//! let config = ConfiguratorConfig::from_env()?;
//! let services = PreviewServices {
//!     document: Arc::new(MarkupDocument::new()),
//!     loader: Arc::new(my_block_loader),
//!     persistence: Arc::new(FileStorage::new(&config.storage_dir)),
//!     encoder: ShareLinkEncoder::new(
//!         Arc::new(StateReform::new(config.renames.clone())),
//!         Arc::new(Base64Codec),
//!     ),
//! };
//! let store = new_tool_store();
//! let id = init(&store, &block, &config, services, &SchemaLoader::new(&config)?).await?;
//! update_field(&store, &id, "term", "Y")?;
//! let link = current_link(&store, &id)?;
//! ```

pub mod config;
pub mod error;
pub mod html;
pub mod loader;
pub mod preview;
pub mod runtime;
pub mod share_link;
pub mod state;
pub mod storage;

pub use config::ConfiguratorConfig;
pub use error::{ConfiguratorError, ConfiguratorResult};
pub use html::{render_tool_html, ToolView};
pub use loader::SchemaLoader;
pub use preview::{
    BlockLoader, MarkerElement, MarkupDocument, PreviewDocument, PreviewServices, PreviewSync,
};
pub use runtime::{
    apply_schema, current_link, current_state, init, load_schema, mount, new_tool_store,
    render_tool, unmount, update_field, BlockElement, BlockRow, Mount, ToolState, ToolStore,
};
pub use share_link::{strip_fragment, Base64Codec, ShareLinkEncoder, TextCodec};
pub use state::{
    dispatch_staged, initial_state, Canonicalize, ExportShape, Listener, Notification,
    StateContainer, StateReform,
};
pub use storage::{FileStorage, MemoryStorage, Persistence};
