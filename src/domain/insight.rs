//! Interviewer insight generation
//!
//! Turns a match report into a short paragraph telling the interviewer what
//! the role emphasises, what the CV evidences, and which areas to explore.

use crate::domain::models::{InterviewerInsight, MatchReport};
use std::collections::BTreeSet;

const CLOSING_SENTENCE: &str = "These areas should be explored further during the interview to validate depth, ownership, and hands-on involvement.";

fn join(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Build the interviewer explanation for a match report
pub fn explain(report: &MatchReport) -> InterviewerInsight {
    let mut role_focus = BTreeSet::new();
    let mut cv_matches = BTreeSet::new();
    let mut cv_gaps = BTreeSet::new();

    for bucket in &report.buckets {
        role_focus.extend(bucket.union.iter().cloned());
        cv_matches.extend(bucket.intersection.iter().cloned());
        cv_gaps.extend(bucket.missing.iter().cloned());
    }

    let mut sentences = Vec::with_capacity(4);

    if !role_focus.is_empty() {
        sentences.push(format!("The role emphasises {}.", join(&role_focus)));
    }

    if !cv_matches.is_empty() {
        sentences.push(format!(
            "The CV demonstrates clear experience in {}.",
            join(&cv_matches)
        ));
    }

    if !cv_gaps.is_empty() {
        sentences.push(format!(
            "However, the CV does not clearly surface evidence of {}, which are explicitly referenced in the job description.",
            join(&cv_gaps)
        ));
    }

    sentences.push(CLOSING_SENTENCE.to_string());

    InterviewerInsight {
        role_focus,
        cv_matches,
        cv_gaps,
        explanation: sentences.join(" "),
    }
}
