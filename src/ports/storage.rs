/// Storage port trait
///
/// Defines the interface for database operations.
/// Implementation: SQLite adapter
use crate::domain::models::{AnalysisRecord, CachedOverview, ServiceConfig};
use crate::error::Result;
use async_trait::async_trait;

/// Port trait for storage operations
#[async_trait]
pub trait StoragePort: Send + Sync {
    // Analysis operations
    /// Persist a new analysis run
    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<i64>;

    /// Get an analysis by ID
    async fn get_analysis(&self, id: i64) -> Result<Option<AnalysisRecord>>;

    /// List analyses, newest first
    async fn list_analyses(
        &self,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<AnalysisRecord>>;

    /// Delete an analysis; returns false when no row matched
    async fn delete_analysis(&self, id: i64) -> Result<bool>;

    // Overview cache operations
    /// Look up a cached LLM overview
    async fn get_cached_overview(&self, cache_key: &str) -> Result<Option<CachedOverview>>;

    /// Insert or replace a cached LLM overview
    async fn save_cached_overview(&self, overview: &CachedOverview) -> Result<()>;

    // Service config operations
    /// Save or update service configuration
    async fn save_service_config(&self, config: &ServiceConfig) -> Result<i64>;

    /// Get service configuration
    async fn get_service_config(
        &self,
        service_type: &str,
        provider: &str,
    ) -> Result<Option<ServiceConfig>>;

    /// Get active service configuration for a service type
    async fn get_active_service_config(&self, service_type: &str) -> Result<Option<ServiceConfig>>;

    /// List all service configurations
    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>>;
}
