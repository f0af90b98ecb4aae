//! Mock implementations for testing

use crate::domain::models::{AnalysisRecord, CachedOverview, ServiceConfig};
use crate::error::Result;
use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock storage implementation for testing
#[derive(Clone, Default)]
pub struct MockStorage {
    analyses: Arc<Mutex<HashMap<i64, AnalysisRecord>>>,
    overviews: Arc<Mutex<HashMap<String, CachedOverview>>>,
    service_configs: Arc<Mutex<Vec<ServiceConfig>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    pub fn analysis_count(&self) -> usize {
        self.analyses.lock().unwrap().len()
    }
}

#[async_trait]
impl StoragePort for MockStorage {
    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<i64> {
        let id = self.next_id();
        let mut a = analysis.clone();
        a.id = Some(id);
        self.analyses.lock().unwrap().insert(id, a);
        Ok(id)
    }

    async fn get_analysis(&self, id: i64) -> Result<Option<AnalysisRecord>> {
        Ok(self.analyses.lock().unwrap().get(&id).cloned())
    }

    async fn list_analyses(
        &self,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<AnalysisRecord>> {
        let analyses = self.analyses.lock().unwrap();
        let mut list: Vec<_> = analyses.values().cloned().collect();
        list.sort_by_key(|a| (-a.created_at, -a.id.unwrap_or(0)));

        let offset = offset.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(100) as usize;

        Ok(list.into_iter().skip(offset).take(limit).collect())
    }

    async fn delete_analysis(&self, id: i64) -> Result<bool> {
        Ok(self.analyses.lock().unwrap().remove(&id).is_some())
    }

    async fn get_cached_overview(&self, cache_key: &str) -> Result<Option<CachedOverview>> {
        Ok(self.overviews.lock().unwrap().get(cache_key).cloned())
    }

    async fn save_cached_overview(&self, overview: &CachedOverview) -> Result<()> {
        self.overviews
            .lock()
            .unwrap()
            .insert(overview.cache_key.clone(), overview.clone());
        Ok(())
    }

    async fn save_service_config(&self, config: &ServiceConfig) -> Result<i64> {
        let mut configs = self.service_configs.lock().unwrap();

        if let Some(existing) = configs
            .iter_mut()
            .find(|c| c.service_type == config.service_type && c.provider == config.provider)
        {
            existing.is_active = config.is_active;
            existing.settings = config.settings.clone();
            existing.updated_at = chrono::Utc::now().timestamp();
            return Ok(existing.id.unwrap_or(1));
        }

        let id = self.next_id();
        let mut c = config.clone();
        c.id = Some(id);
        configs.push(c);
        Ok(id)
    }

    async fn get_service_config(
        &self,
        service_type: &str,
        provider: &str,
    ) -> Result<Option<ServiceConfig>> {
        Ok(self
            .service_configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.service_type.to_string() == service_type && c.provider == provider)
            .cloned())
    }

    async fn get_active_service_config(&self, service_type: &str) -> Result<Option<ServiceConfig>> {
        Ok(self
            .service_configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.service_type.to_string() == service_type && c.is_active)
            .cloned())
    }

    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>> {
        Ok(self.service_configs.lock().unwrap().clone())
    }
}
