//! Remote schema fetch. One attempt per mount; every failure reads as an empty schema.

use configurator_schema::SchemaDocument;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::ConfiguratorConfig;
use crate::error::ConfiguratorResult;

#[derive(Debug, Clone)]
pub struct SchemaLoader {
    client: Client,
}

impl SchemaLoader {
    pub fn new(config: &ConfiguratorConfig) -> ConfiguratorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` once and normalize the body.
    ///
    /// The URL is requested with its casing untouched; hosts that need
    /// lowercase paths must be given lowercase links.
    pub async fn fetch(&self, url: &str) -> SchemaDocument {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("schema fetch {} failed: {}", url, e);
                return SchemaDocument::empty();
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("schema fetch {}: could not read body: {}", url, e);
                return SchemaDocument::empty();
            }
        };

        document_from_response(url, status, &body)
    }
}

fn document_from_response(url: &str, status: StatusCode, body: &str) -> SchemaDocument {
    if !status.is_success() {
        tracing::warn!("schema fetch {} returned {}", url, status);
        return SchemaDocument::empty();
    }

    match SchemaDocument::from_json_str(body) {
        Ok(doc) => {
            tracing::debug!("schema {} loaded with {} panels", url, doc.panels.len());
            doc
        }
        Err(e) => {
            tracing::warn!("schema {} is not valid JSON: {}", url, e);
            SchemaDocument::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{ ":names": ["a"], "a": { "data": [{ "prop": "x" }] } }"#;

    #[test]
    fn test_success_is_parsed() {
        let doc = document_from_response("u", StatusCode::OK, BODY);
        assert_eq!(doc.panels.len(), 1);
    }

    #[test]
    fn test_non_success_is_empty() {
        for status in [
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::MOVED_PERMANENTLY,
        ] {
            assert!(document_from_response("u", status, BODY).is_empty());
        }
    }

    #[test]
    fn test_invalid_body_is_empty() {
        assert!(document_from_response("u", StatusCode::OK, "<html>").is_empty());
    }
}
