//! Hosted property table access.

mod client;

pub use client::SupabaseClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PropertyRecord, ViewMode};

/// Anything that can list properties by status
#[async_trait]
pub trait PropertySource: Send + Sync {
    async fn fetch_by_status(&self, status: ViewMode, limit: usize) -> Result<Vec<PropertyRecord>>;
}
