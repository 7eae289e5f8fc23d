//! Share links: `<page url>#<base64(json(canonical state))>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use configurator_schema::FormState;
use std::sync::Arc;

use crate::error::{ConfiguratorError, ConfiguratorResult};
use crate::state::{Canonicalize, ExportShape};

/// Reversible text to token encoding.
pub trait TextCodec: Send + Sync {
    fn encode(&self, text: &str) -> ConfiguratorResult<String>;
    fn decode(&self, token: &str) -> ConfiguratorResult<String>;
}

/// UTF-8 bytes as standard, padded base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl TextCodec for Base64Codec {
    fn encode(&self, text: &str) -> ConfiguratorResult<String> {
        Ok(STANDARD.encode(text.as_bytes()))
    }

    fn decode(&self, token: &str) -> ConfiguratorResult<String> {
        let bytes = STANDARD
            .decode(token)
            .map_err(|e| ConfiguratorError::Decode(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ConfiguratorError::Decode(e.to_string()))
    }
}

/// Builds the link the preview block and the copy button both use.
#[derive(Clone)]
pub struct ShareLinkEncoder {
    canonicalizer: Arc<dyn Canonicalize>,
    codec: Arc<dyn TextCodec>,
}

impl ShareLinkEncoder {
    pub fn new(canonicalizer: Arc<dyn Canonicalize>, codec: Arc<dyn TextCodec>) -> Self {
        Self {
            canonicalizer,
            codec,
        }
    }

    /// `base_url` without its fragment, then `#` and the encoded canonical state.
    ///
    /// Deterministic for equal inputs. Collaborator failures are returned, never papered over.
    pub fn build_link(&self, base_url: &str, state: &FormState) -> ConfiguratorResult<String> {
        let shape = self.canonicalizer.canonicalize(state)?;
        let json = serde_json::to_string(&shape)?;
        let token = self.codec.encode(&json)?;
        Ok(format!("{}#{}", strip_fragment(base_url), token))
    }

    /// Inverse of [`ShareLinkEncoder::build_link`]: the canonical state carried by `link`.
    pub fn decode_link(&self, link: &str) -> ConfiguratorResult<ExportShape> {
        let (_, token) = link
            .split_once('#')
            .ok_or_else(|| ConfiguratorError::Decode("link has no fragment".to_string()))?;
        let json = self.codec.decode(token)?;
        serde_json::from_str(&json).map_err(|e| ConfiguratorError::Decode(e.to_string()))
    }

    /// Form state carried by the share token in `url`, if it has one.
    ///
    /// A URL without a fragment (or with an empty one) yields `Ok(None)`; a
    /// fragment that does not decode is an error.
    pub fn shared_state(&self, url: &str) -> ConfiguratorResult<Option<FormState>> {
        match url.split_once('#') {
            Some((_, token)) if !token.is_empty() => {
                let shape = self.decode_link(url)?;
                Ok(Some(self.canonicalizer.restore(&shape)))
            }
            _ => Ok(None),
        }
    }
}

/// Everything before the first `#`.
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}
