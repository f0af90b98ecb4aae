/// Domain models for Interview Analyzer
///
/// These models represent core business entities and are platform-agnostic.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of source document an analysis input was read from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Docx,
    PlainText,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Docx => write!(f, "docx"),
            DocumentKind::PlainText => write!(f, "text"),
        }
    }
}

/// Text loaded from a job description or CV
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub kind: DocumentKind,
    /// File path, "inline" or "stdin"
    pub origin: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(kind: DocumentKind, origin: impl Into<String>, text: String) -> Self {
        Self {
            kind,
            origin: origin.into(),
            text,
        }
    }

    /// SHA-256 of the document text, hex encoded
    pub fn content_hash(&self) -> String {
        content_hash(&[&self.text])
    }
}

/// Hex SHA-256 over the given parts, each terminated by a NUL separator
pub fn content_hash(parts: &[&str]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Keyword overlap for one capability bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketResult {
    pub bucket: String,
    pub score: f64,
    pub intersection: BTreeSet<String>,
    pub union: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

/// Overlap-based alignment between a job description and a CV
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub overall_score: f64,
    pub buckets: Vec<BucketResult>,
}

impl MatchReport {
    /// Look up a bucket result by name
    pub fn bucket(&self, name: &str) -> Option<&BucketResult> {
        self.buckets.iter().find(|b| b.bucket == name)
    }
}

/// Interviewer-facing explanation derived from a match report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewerInsight {
    pub role_focus: BTreeSet<String>,
    pub cv_matches: BTreeSet<String>,
    pub cv_gaps: BTreeSet<String>,
    pub explanation: String,
}

/// A persisted analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Option<i64>,
    pub candidate_name: Option<String>,
    pub cv_origin: String,
    pub jd_origin: String,
    pub jd_hash: String,
    pub cv_hash: String,
    pub overall_score: f64,
    pub buckets: Vec<BucketResult>,
    pub explanation: String,
    pub overview: Option<String>,
    pub model: Option<String>,
    pub created_at: i64, // Unix timestamp
}

impl AnalysisRecord {
    /// Creates a new, unsaved analysis record
    pub fn new(
        jd: &SourceDocument,
        cv: &SourceDocument,
        report: &MatchReport,
        insight: &InterviewerInsight,
    ) -> Self {
        Self {
            id: None,
            candidate_name: None,
            cv_origin: cv.origin.clone(),
            jd_origin: jd.origin.clone(),
            jd_hash: jd.content_hash(),
            cv_hash: cv.content_hash(),
            overall_score: report.overall_score,
            buckets: report.buckets.clone(),
            explanation: insight.explanation.clone(),
            overview: None,
            model: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Attaches an LLM overview (builder pattern)
    pub fn with_overview(mut self, overview: Option<String>, model: Option<String>) -> Self {
        self.overview = overview;
        self.model = model;
        self
    }

    /// Sets the candidate label (builder pattern)
    pub fn with_candidate_name(mut self, name: Option<String>) -> Self {
        self.candidate_name = name;
        self
    }
}

/// A cached LLM overview for a (model, JD, CV) triple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedOverview {
    pub cache_key: String,
    pub model: String,
    pub content: String,
    pub created_at: i64,
}

impl CachedOverview {
    pub fn new(cache_key: String, model: String, content: String) -> Self {
        Self {
            cache_key,
            model,
            content,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Service configuration type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Llm, // Large Language Model
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::Llm => write!(f, "llm"),
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "llm" => Ok(ServiceType::Llm),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

/// Represents service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id: Option<i64>,
    pub service_type: ServiceType,
    pub provider: String, // "google"
    pub is_active: bool,
    pub settings: Option<String>, // JSON string for provider-specific settings
    pub created_at: i64,
    pub updated_at: i64,
}

impl ServiceConfig {
    /// Creates a new service configuration
    pub fn new(service_type: ServiceType, provider: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            service_type,
            provider,
            is_active: false,
            settings: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the active status (builder pattern)
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Sets the settings JSON (builder pattern)
    pub fn with_settings(mut self, settings: Option<String>) -> Self {
        self.settings = settings;
        self
    }
}
