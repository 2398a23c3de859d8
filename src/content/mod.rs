pub mod fallback;
pub mod schema;

use log::{debug, info};
use reqwest::Client;
use thiserror::Error;

pub use schema::v1::{Catalog, Feature, Tier};

const SERVICES_PATH: &str = "/api/client-services";
const PRICING_PATH: &str = "/api/client-pricing";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content service returned {status} for {path}")]
    Status { status: u16, path: &'static str },

    #[error("unexpected payload from {path}: {reason}")]
    Schema { path: &'static str, reason: String },
}

/// Read-only client for the upstream admin content service.
#[derive(Clone)]
pub struct ContentClient {
    base_url: String,
    client: Client,
}

impl ContentClient {
    pub fn new(base_url: &str) -> Self {
        info!("Using content service at: {}", base_url);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Categorized services catalogue.
    pub async fn services(&self) -> Result<Catalog, ContentError> {
        self.fetch(SERVICES_PATH).await
    }

    /// Categorized catalogue with per-service pricing tiers.
    pub async fn pricing(&self) -> Result<Catalog, ContentError> {
        self.fetch(PRICING_PATH).await
    }

    async fn fetch(&self, path: &'static str) -> Result<Catalog, ContentError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ContentError::Status {
                status: response.status().as_u16(),
                path,
            });
        }

        let body = response.bytes().await?;
        decode(path, &body)
    }
}

/// Decodes and validates a catalogue document.
pub fn decode(path: &'static str, body: &[u8]) -> Result<Catalog, ContentError> {
    let catalog: Catalog = serde_json::from_slice(body).map_err(|e| ContentError::Schema {
        path,
        reason: e.to_string(),
    })?;
    catalog.validate().map_err(|v| ContentError::Schema {
        path,
        reason: v.to_string(),
    })?;
    Ok(catalog)
}
