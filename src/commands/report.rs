//! Plain-text rendering of analysis results for the terminal

use crate::commands::analyze::{AnalysisOutcome, OverviewStatus};
use crate::domain::models::{AnalysisRecord, BucketResult};
use crate::ports::llm::ModelInfo;
use std::collections::BTreeSet;
use std::fmt::Write;

fn list_or_dash(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn write_buckets(out: &mut String, buckets: &[BucketResult]) {
    let width = buckets.iter().map(|b| b.bucket.len()).max().unwrap_or(0);
    let _ = writeln!(out, "Capability breakdown");
    for bucket in buckets {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>5.1}%  matched: {}  |  missing: {}",
            bucket.bucket,
            bucket.score,
            list_or_dash(&bucket.intersection),
            list_or_dash(&bucket.missing),
            width = width
        );
    }
}

/// Render a saved analysis record
pub fn render_record(record: &AnalysisRecord) -> String {
    let mut out = String::new();

    let title = match (record.id, &record.candidate_name) {
        (Some(id), Some(name)) => format!("Analysis #{} - {}", id, name),
        (Some(id), None) => format!("Analysis #{}", id),
        (None, Some(name)) => format!("Analysis - {}", name),
        (None, None) => "Analysis".to_string(),
    };
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(
        out,
        "  CV: {}  |  JD: {}  |  {}",
        record.cv_origin,
        record.jd_origin,
        format_timestamp(record.created_at)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "CV-JD Alignment Score: {:.1}%", record.overall_score);
    let _ = writeln!(
        out,
        "  Overlap-based alignment between Job Description and CV"
    );
    let _ = writeln!(out);

    write_buckets(&mut out, &record.buckets);
    let _ = writeln!(out);

    let _ = writeln!(out, "Interviewer Insight");
    let _ = writeln!(out, "{}", record.explanation);

    if let Some(overview) = &record.overview {
        let _ = writeln!(out);
        match &record.model {
            Some(model) => {
                let _ = writeln!(out, "JD & Candidate Overview ({})", model);
            }
            None => {
                let _ = writeln!(out, "JD & Candidate Overview");
            }
        }
        let _ = writeln!(out, "{}", overview.trim_end());
    }

    out
}

/// Render the outcome of an `analyze` run
pub fn render_outcome(outcome: &AnalysisOutcome) -> String {
    let mut out = render_record(&outcome.record);

    match &outcome.overview_status {
        OverviewStatus::Generated => {}
        OverviewStatus::Cached => {
            let _ = writeln!(out, "(overview reused from cache)");
        }
        OverviewStatus::Skipped(reason) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "Overview skipped: {}", reason);
        }
        OverviewStatus::Failed(error) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "Overview unavailable: {}", error);
        }
    }

    if outcome.record.id.is_none() {
        let _ = writeln!(out, "(not saved)");
    }

    out
}

/// Render a one-line-per-analysis history table
pub fn render_history(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No saved analyses\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<16}  {:>6}  {:<24}  {}",
        "ID", "DATE", "SCORE", "CANDIDATE", "CV"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:>5}  {:<16}  {:>5.1}%  {:<24}  {}",
            record.id.map(|id| id.to_string()).unwrap_or_default(),
            format_timestamp(record.created_at),
            record.overall_score,
            record.candidate_name.as_deref().unwrap_or("-"),
            record.cv_origin
        );
    }
    out
}

/// Render available models
pub fn render_models(models: &[ModelInfo]) -> String {
    let mut out = String::new();
    for model in models {
        let estimate = if model.is_fallback_context_window == Some(true) {
            " (estimated)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:<40} {:<32} {} tokens{}",
            model.id, model.name, model.context_window, estimate
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::insight::explain;
    use crate::domain::scoring::compute_cv_match;
    use crate::domain::Taxonomy;

    fn record() -> AnalysisRecord {
        let report = compute_cv_match("sql python", "python", &Taxonomy::default());
        let insight = explain(&report);
        AnalysisRecord {
            id: Some(7),
            candidate_name: Some("Jane Doe".into()),
            cv_origin: "cv.docx".into(),
            jd_origin: "inline".into(),
            jd_hash: String::new(),
            cv_hash: String::new(),
            overall_score: report.overall_score,
            buckets: report.buckets,
            explanation: insight.explanation,
            overview: Some("Candidate Name:\nJane Doe\n".into()),
            model: Some("gemini-2.5-flash-lite".into()),
            created_at: 0,
        }
    }

    #[test]
    fn test_render_record_sections() {
        let text = render_record(&record());
        assert!(text.starts_with("Analysis #7 - Jane Doe\n"));
        assert!(text.contains("CV-JD Alignment Score: 16.7%"));
        assert!(text.contains("tools"));
        assert!(text.contains("matched: python  |  missing: sql"));
        assert!(text.contains("Interviewer Insight\nThe role emphasises python, sql."));
        assert!(text.contains("JD & Candidate Overview (gemini-2.5-flash-lite)"));
        assert!(text.contains("1970-01-01 00:00"));
    }

    #[test]
    fn test_render_outcome_skipped_and_unsaved() {
        let mut rec = record();
        rec.id = None;
        rec.overview = None;
        let report = compute_cv_match("sql python", "python", &Taxonomy::default());
        let outcome = AnalysisOutcome {
            insight: explain(&report),
            report,
            record: rec,
            overview_status: OverviewStatus::Skipped("disabled".into()),
        };

        let text = render_outcome(&outcome);
        assert!(text.contains("Overview skipped: disabled"));
        assert!(text.ends_with("(not saved)\n"));
        assert!(!text.contains("JD & Candidate Overview"));
    }

    #[test]
    fn test_render_history() {
        assert_eq!(render_history(&[]), "No saved analyses\n");

        let text = render_history(&[record()]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("16.7%"));
        assert!(lines[1].contains("Jane Doe"));
    }
}
