//! JD & CV analysis command
//!
//! Runs the full pipeline: load documents, score keyword overlap, explain
//! the result for the interviewer, optionally fetch an LLM overview, and
//! persist the run.

use crate::adapters::document::{self, JdSource};
use crate::commands::config::load_llm_config;
use crate::domain::insight::explain;
use crate::domain::models::{
    content_hash, AnalysisRecord, CachedOverview, InterviewerInsight, MatchReport, SourceDocument,
};
use crate::domain::prompts::parse_candidate_name;
use crate::domain::scoring::compute_cv_match;
use crate::domain::Taxonomy;
use crate::error::Result;
use crate::ports::llm::{LlmConfig, LlmServicePort, OverviewRequest};
use crate::AppState;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// Request to analyze a job description against a CV
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub jd: JdSource,
    pub cv_path: PathBuf,
    pub label: Option<String>,
    pub taxonomy_path: Option<PathBuf>,
    pub model: Option<String>,
    pub overview: bool,
    pub refresh_overview: bool,
    pub save: bool,
}

/// What happened to the LLM overview for a run
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum OverviewStatus {
    Generated,
    Cached,
    Skipped(String),
    Failed(String),
}

/// Result of an analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    pub report: MatchReport,
    pub insight: InterviewerInsight,
    pub overview_status: OverviewStatus,
}

/// Cache key for an overview: the model plus both documents
pub fn overview_cache_key(model: &str, jd: &SourceDocument, cv: &SourceDocument) -> String {
    content_hash(&[model, &jd.text, &cv.text])
}

async fn resolve_overview(
    state: &AppState,
    llm: Option<&dyn LlmServicePort>,
    config: &LlmConfig,
    jd: &SourceDocument,
    cv: &SourceDocument,
    refresh: bool,
) -> Result<(Option<String>, OverviewStatus)> {
    let Some(llm) = llm.filter(|l| l.is_configured()) else {
        log::warn!("No Gemini API key configured; skipping candidate overview");
        return Ok((
            None,
            OverviewStatus::Skipped("no API key configured".to_string()),
        ));
    };

    let cache_key = overview_cache_key(&config.model, jd, cv);

    if !refresh {
        if let Some(cached) = state.storage.get_cached_overview(&cache_key).await? {
            log::info!("Using cached overview for model {}", cached.model);
            return Ok((Some(cached.content), OverviewStatus::Cached));
        }
    }

    let request = OverviewRequest {
        job_description: jd.text.clone(),
        cv_text: cv.text.clone(),
    };

    match llm.generate_overview(&request, config).await {
        Ok(content) => {
            state
                .storage
                .save_cached_overview(&CachedOverview::new(
                    cache_key,
                    config.model.clone(),
                    content.clone(),
                ))
                .await?;
            Ok((Some(content), OverviewStatus::Generated))
        }
        Err(e) => {
            log::warn!("Overview generation failed: {}", e);
            Ok((None, OverviewStatus::Failed(e.to_string())))
        }
    }
}

/// Analyze a job description against a CV
///
/// `stdin` is only consumed when the job description comes from stdin.
pub async fn run_analysis<R: Read>(
    state: &AppState,
    llm: Option<&dyn LlmServicePort>,
    request: AnalyzeRequest,
    stdin: R,
) -> Result<AnalysisOutcome> {
    let jd = document::load_job_description(&request.jd, stdin)?;
    let cv = document::load_cv(&request.cv_path)?;
    log::info!("Comparing {} CV {} against JD from {}", cv.kind, cv.origin, jd.origin);

    let taxonomy = match &request.taxonomy_path {
        Some(path) => Taxonomy::from_json_file(path)?,
        None => Taxonomy::default(),
    };

    let report = compute_cv_match(&jd.text, &cv.text, &taxonomy);
    let insight = explain(&report);
    log::info!("Alignment score: {}%", report.overall_score);

    let (overview, model, overview_status) = if request.overview {
        let mut config = load_llm_config(state).await?;
        if let Some(model) = request.model.clone() {
            config.model = model;
        }
        let (overview, status) =
            resolve_overview(state, llm, &config, &jd, &cv, request.refresh_overview).await?;
        let model = overview.as_ref().map(|_| config.model);
        (overview, model, status)
    } else {
        (None, None, OverviewStatus::Skipped("disabled".to_string()))
    };

    let candidate_name = request
        .label
        .clone()
        .or_else(|| overview.as_deref().and_then(parse_candidate_name));

    let mut record = AnalysisRecord::new(&jd, &cv, &report, &insight)
        .with_overview(overview, model)
        .with_candidate_name(candidate_name);

    if request.save {
        let id = state.storage.create_analysis(&record).await?;
        record.id = Some(id);
        log::info!("Saved analysis #{}", id);
    }

    Ok(AnalysisOutcome {
        record,
        report,
        insight,
        overview_status,
    })
}
