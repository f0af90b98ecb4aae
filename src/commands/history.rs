//! Analysis history commands

use crate::domain::models::AnalysisRecord;
use crate::error::{AppError, Result};
use crate::AppState;

/// List saved analyses, newest first
pub async fn list_analyses(
    state: &AppState,
    limit: Option<i32>,
    offset: Option<i32>,
) -> Result<Vec<AnalysisRecord>> {
    if limit.is_some_and(|l| l <= 0) {
        return Err(AppError::InvalidInput("Limit must be positive".to_string()));
    }
    if offset.is_some_and(|o| o < 0) {
        return Err(AppError::InvalidInput("Offset cannot be negative".to_string()));
    }

    let analyses = state.storage.list_analyses(limit, offset).await?;
    log::debug!("Loaded {} analyses", analyses.len());
    Ok(analyses)
}

/// Get a saved analysis by ID
pub async fn get_analysis(state: &AppState, id: i64) -> Result<AnalysisRecord> {
    state
        .storage
        .get_analysis(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis #{}", id)))
}

/// Delete a saved analysis
pub async fn delete_analysis(state: &AppState, id: i64) -> Result<()> {
    if !state.storage.delete_analysis(id).await? {
        return Err(AppError::NotFound(format!("Analysis #{}", id)));
    }
    log::info!("Deleted analysis #{}", id);
    Ok(())
}
