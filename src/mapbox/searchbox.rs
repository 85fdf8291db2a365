//! Mapbox Search Box client (suggest + retrieve).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::GeocodeSource;
use crate::config::MapboxConfig;
use crate::error::{AtlasError, Result};
use crate::models::suggestion::{RetrieveResponse, SuggestResponse};
use crate::models::{Feature, SessionToken, Suggestion};

const SERVICE: &str = "mapbox";

/// Talks to the suggest and retrieve endpoints for one access token
#[derive(Clone)]
pub struct SearchBoxClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl SearchBoxClient {
    pub fn new(config: &MapboxConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &MapboxConfig) -> Self {
        Self {
            client,
            base_url: config.searchbox_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or(AtlasError::MissingConfig("MAPBOX_ACCESS_TOKEN"))
    }

    /// `{base}/suggest?q=..&limit=..&session_token=..&access_token=..`
    pub fn suggest_url(&self, query: &str, session: &SessionToken, limit: usize) -> Result<Url> {
        let token = self.token()?;
        let mut url = Url::parse(&format!("{}/suggest", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("session_token", &session.to_string())
            .append_pair("access_token", token);
        Ok(url)
    }

    /// `{base}/retrieve/{id}?session_token=..&access_token=..`
    pub fn retrieve_url(&self, mapbox_id: &str, session: &SessionToken) -> Result<Url> {
        let token = self.token()?;
        let mut url = Url::parse(&format!("{}/retrieve", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| AtlasError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(mapbox_id);
        url.query_pairs_mut()
            .append_pair("session_token", &session.to_string())
            .append_pair("access_token", token);
        Ok(url)
    }

    /// Decode a JSON body whatever the status. An error status with a
    /// non-JSON body is reported as `Status`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(parsed) => {
                if !status.is_success() {
                    warn!("Search Box responded with status {}: {}", status, body);
                }
                Ok(parsed)
            }
            Err(_) if !status.is_success() => {
                warn!("Search Box request failed with status {}", status);
                Err(AtlasError::Status {
                    service: SERVICE,
                    status,
                    body,
                })
            }
            Err(source) => Err(AtlasError::Decode { service: SERVICE, source }),
        }
    }
}

#[async_trait]
impl GeocodeSource for SearchBoxClient {
    async fn suggest(&self, query: &str, session: &SessionToken, limit: usize) -> Result<Vec<Suggestion>> {
        let url = self.suggest_url(query, session, limit)?;
        let response: SuggestResponse = self.get_json(url).await?;
        let suggestions = response.suggestions.unwrap_or_default();
        debug!("{} suggestions for '{}'", suggestions.len(), query);
        Ok(suggestions)
    }

    async fn retrieve(&self, mapbox_id: &str, session: &SessionToken) -> Result<Vec<Feature>> {
        let url = self.retrieve_url(mapbox_id, session)?;
        let response: RetrieveResponse = self.get_json(url).await?;
        Ok(response.features.unwrap_or_default())
    }
}
