/// SQLite storage adapter
///
/// Implements StoragePort for SQLite database operations.
use crate::domain::models::{AnalysisRecord, CachedOverview, ServiceConfig, ServiceType};
use crate::error::Result;
use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const ANALYSIS_COLUMNS: &str = "id, candidate_name, cv_origin, jd_origin, jd_hash, cv_hash,
     overall_score, buckets, explanation, overview, model, created_at";

const SERVICE_CONFIG_COLUMNS: &str =
    "id, service_type, provider, is_active, settings, created_at, updated_at";

/// SQLite storage implementation
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Create a new SQLite storage with the given database path
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // Enable foreign keys
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        log::debug!("Opened database at {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<()> {
        use rusqlite_migration::{Migrations, M};

        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../../migrations/001_initial.sql"
        ))]);

        let mut conn = self.conn.lock().unwrap();
        migrations.to_latest(&mut conn)?;

        Ok(())
    }
}

fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    let buckets_json: String = row.get(7)?;
    let buckets = serde_json::from_str(&buckets_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(AnalysisRecord {
        id: Some(row.get(0)?),
        candidate_name: row.get(1)?,
        cv_origin: row.get(2)?,
        jd_origin: row.get(3)?,
        jd_hash: row.get(4)?,
        cv_hash: row.get(5)?,
        overall_score: row.get(6)?,
        buckets,
        explanation: row.get(8)?,
        overview: row.get(9)?,
        model: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn service_config_from_row(row: &Row<'_>) -> rusqlite::Result<ServiceConfig> {
    let service_type_str: String = row.get(1)?;
    let service_type: ServiceType = service_type_str
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?;

    Ok(ServiceConfig {
        id: Some(row.get(0)?),
        service_type,
        provider: row.get(2)?,
        is_active: row.get(3)?,
        settings: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[async_trait]
impl StoragePort for SqliteStorage {
    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<i64> {
        let buckets = serde_json::to_string(&analysis.buckets)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO analyses (candidate_name, cv_origin, jd_origin, jd_hash, cv_hash,
             overall_score, buckets, explanation, overview, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                analysis.candidate_name,
                analysis.cv_origin,
                analysis.jd_origin,
                analysis.jd_hash,
                analysis.cv_hash,
                analysis.overall_score,
                buckets,
                analysis.explanation,
                analysis.overview,
                analysis.model,
                analysis.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn get_analysis(&self, id: i64) -> Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock().unwrap();
        let analysis = conn
            .query_row(
                &format!("SELECT {} FROM analyses WHERE id = ?1", ANALYSIS_COLUMNS),
                params![id],
                analysis_from_row,
            )
            .optional()?;
        Ok(analysis)
    }

    async fn list_analyses(
        &self,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<AnalysisRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM analyses ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            ANALYSIS_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![limit.unwrap_or(100), offset.unwrap_or(0)],
            analysis_from_row,
        )?;

        let mut analyses = Vec::new();
        for analysis_result in rows {
            analyses.push(analysis_result?);
        }

        Ok(analyses)
    }

    async fn delete_analysis(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM analyses WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    async fn get_cached_overview(&self, cache_key: &str) -> Result<Option<CachedOverview>> {
        let conn = self.conn.lock().unwrap();
        let overview = conn
            .query_row(
                "SELECT cache_key, model, content, created_at
                 FROM overview_cache WHERE cache_key = ?1",
                params![cache_key],
                |row| {
                    Ok(CachedOverview {
                        cache_key: row.get(0)?,
                        model: row.get(1)?,
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(overview)
    }

    async fn save_cached_overview(&self, overview: &CachedOverview) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO overview_cache (cache_key, model, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                overview.cache_key,
                overview.model,
                overview.content,
                overview.created_at,
            ],
        )?;
        Ok(())
    }

    async fn save_service_config(&self, config: &ServiceConfig) -> Result<i64> {
        let conn = self.conn.lock().unwrap();

        // Try to update first
        let rows_updated = conn.execute(
            "UPDATE service_configs SET is_active = ?1, settings = ?2, updated_at = ?3
             WHERE service_type = ?4 AND provider = ?5",
            params![
                config.is_active,
                config.settings,
                chrono::Utc::now().timestamp(),
                config.service_type.to_string(),
                config.provider,
            ],
        )?;

        if rows_updated == 0 {
            conn.execute(
                "INSERT INTO service_configs (service_type, provider, is_active, settings, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    config.service_type.to_string(),
                    config.provider,
                    config.is_active,
                    config.settings,
                    config.created_at,
                    config.updated_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        } else {
            let id: i64 = conn.query_row(
                "SELECT id FROM service_configs WHERE service_type = ?1 AND provider = ?2",
                params![config.service_type.to_string(), config.provider],
                |row| row.get(0),
            )?;
            Ok(id)
        }
    }

    async fn get_service_config(
        &self,
        service_type: &str,
        provider: &str,
    ) -> Result<Option<ServiceConfig>> {
        let conn = self.conn.lock().unwrap();
        let config = conn
            .query_row(
                &format!(
                    "SELECT {} FROM service_configs WHERE service_type = ?1 AND provider = ?2",
                    SERVICE_CONFIG_COLUMNS
                ),
                params![service_type, provider],
                service_config_from_row,
            )
            .optional()?;
        Ok(config)
    }

    async fn get_active_service_config(&self, service_type: &str) -> Result<Option<ServiceConfig>> {
        let conn = self.conn.lock().unwrap();
        let config = conn
            .query_row(
                &format!(
                    "SELECT {} FROM service_configs WHERE service_type = ?1 AND is_active = 1 LIMIT 1",
                    SERVICE_CONFIG_COLUMNS
                ),
                params![service_type],
                service_config_from_row,
            )
            .optional()?;
        Ok(config)
    }

    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM service_configs ORDER BY service_type, provider",
            SERVICE_CONFIG_COLUMNS
        ))?;

        let rows = stmt.query_map([], service_config_from_row)?;

        let mut configs = Vec::new();
        for config_result in rows {
            configs.push(config_result?);
        }

        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BucketResult, ServiceType};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn open_storage() -> (TempDir, SqliteStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(&dir.path().join("test.db")).unwrap();
        storage.run_migrations().unwrap();
        (dir, storage)
    }

    fn sample_analysis(created_at: i64) -> AnalysisRecord {
        AnalysisRecord {
            id: None,
            candidate_name: Some("Jane Doe".to_string()),
            cv_origin: "cv.docx".to_string(),
            jd_origin: "inline".to_string(),
            jd_hash: "jd".to_string(),
            cv_hash: "cv".to_string(),
            overall_score: 42.5,
            buckets: vec![BucketResult {
                bucket: "tools".to_string(),
                score: 50.0,
                intersection: ["sql".to_string()].into_iter().collect(),
                union: ["sql".to_string(), "python".to_string()].into_iter().collect(),
                missing: BTreeSet::new(),
            }],
            explanation: "The role emphasises python, sql.".to_string(),
            overview: None,
            model: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_analysis() {
        let (_dir, storage) = open_storage();
        let id = storage.create_analysis(&sample_analysis(100)).await.unwrap();

        let loaded = storage.get_analysis(id).await.unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.candidate_name.as_deref(), Some("Jane Doe"));
        assert_eq!(loaded.overall_score, 42.5);
        assert_eq!(loaded.buckets, sample_analysis(100).buckets);
    }

    #[tokio::test]
    async fn test_get_missing_analysis() {
        let (_dir, storage) = open_storage();
        assert!(storage.get_analysis(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_analyses_newest_first_with_paging() {
        let (_dir, storage) = open_storage();
        let first = storage.create_analysis(&sample_analysis(100)).await.unwrap();
        let second = storage.create_analysis(&sample_analysis(200)).await.unwrap();
        let third = storage.create_analysis(&sample_analysis(300)).await.unwrap();

        let all = storage.list_analyses(None, None).await.unwrap();
        let ids: Vec<_> = all.iter().filter_map(|a| a.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let page = storage.list_analyses(Some(1), Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, Some(second));
    }

    #[tokio::test]
    async fn test_delete_analysis() {
        let (_dir, storage) = open_storage();
        let id = storage.create_analysis(&sample_analysis(100)).await.unwrap();

        assert!(storage.delete_analysis(id).await.unwrap());
        assert!(!storage.delete_analysis(id).await.unwrap());
        assert!(storage.get_analysis(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overview_cache_replace() {
        let (_dir, storage) = open_storage();
        let key = "abc".to_string();

        assert!(storage.get_cached_overview(&key).await.unwrap().is_none());

        storage
            .save_cached_overview(&CachedOverview::new(key.clone(), "m".into(), "first".into()))
            .await
            .unwrap();
        storage
            .save_cached_overview(&CachedOverview::new(key.clone(), "m".into(), "second".into()))
            .await
            .unwrap();

        let cached = storage.get_cached_overview(&key).await.unwrap().unwrap();
        assert_eq!(cached.content, "second");
    }

    #[tokio::test]
    async fn test_service_config_upsert() {
        let (_dir, storage) = open_storage();
        let config = ServiceConfig::new(ServiceType::Llm, "google".to_string())
            .with_active(true)
            .with_settings(Some(r#"{"model":"gemini-pro"}"#.to_string()));

        let id = storage.save_service_config(&config).await.unwrap();
        let updated = config
            .clone()
            .with_settings(Some(r#"{"model":"gemini-2.5-flash"}"#.to_string()));
        let id_again = storage.save_service_config(&updated).await.unwrap();
        assert_eq!(id, id_again);

        let loaded = storage
            .get_service_config("llm", "google")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.settings.as_deref(), Some(r#"{"model":"gemini-2.5-flash"}"#));

        let active = storage.get_active_service_config("llm").await.unwrap();
        assert!(active.is_some());
        assert_eq!(storage.list_service_configs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (_dir, storage) = open_storage();
        assert!(storage.run_migrations().is_ok());
    }
}
