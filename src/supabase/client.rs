//! PostgREST client for the properties table.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::PropertySource;
use crate::config::SupabaseConfig;
use crate::error::{AtlasError, Result};
use crate::models::{PropertyRecord, ViewMode};

const SERVICE: &str = "supabase";

/// Supabase REST client with connection configuration
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    url: Option<String>,
    anon_key: Option<String>,
    pub table: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            url: config.url.clone().filter(|u| !u.is_empty()),
            anon_key: config.anon_key.clone().filter(|k| !k.is_empty()),
            table: config.table.clone(),
        }
    }

    /// Whether both the endpoint and the public key are set
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }

    /// `{base}/rest/v1/{table}?select=*&status=eq.{mode}&limit={limit}`
    pub fn query_url(&self, status: ViewMode, limit: usize) -> Result<Url> {
        let base = self
            .url
            .as_deref()
            .ok_or(AtlasError::MissingConfig("SUPABASE_URL"))?;
        build_query_url(base, &self.table, status, limit)
    }
}

pub(crate) fn build_query_url(base: &str, table: &str, status: ViewMode, limit: usize) -> Result<Url> {
    let mut url = Url::parse(base)?.join(&format!("rest/v1/{}", table))?;
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("status", &format!("eq.{}", status))
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

#[async_trait]
impl PropertySource for SupabaseClient {
    async fn fetch_by_status(&self, status: ViewMode, limit: usize) -> Result<Vec<PropertyRecord>> {
        let url = self.query_url(status, limit)?;
        let key = self
            .anon_key
            .as_deref()
            .ok_or(AtlasError::MissingConfig("SUPABASE_ANON_KEY"))?;

        debug!("Querying {} for status={} limit={}", self.table, status, limit);

        let response = self
            .client
            .get(url)
            .header("apikey", key)
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status_code = response.status();
        let body = response.text().await?;
        if !status_code.is_success() {
            return Err(AtlasError::Status {
                service: SERVICE,
                status: status_code,
                body,
            });
        }

        let rows: Vec<PropertyRecord> = serde_json::from_str(&body)
            .map_err(|source| AtlasError::Decode { service: SERVICE, source })?;

        info!("Fetched {} {} rows from {}", rows.len(), status, self.table);
        Ok(rows)
    }
}
