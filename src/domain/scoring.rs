//! Keyword extraction and overlap scoring
//!
//! Both documents are normalized to lowercase ASCII alphanumerics and spaces,
//! then matched against each taxonomy bucket by substring containment. A
//! bucket's score is the Jaccard overlap of the keywords found in the job
//! description and the CV.

use crate::domain::models::{BucketResult, MatchReport};
use crate::domain::taxonomy::{SkillBucket, Taxonomy};
use std::collections::BTreeSet;

/// Lowercase and replace everything outside `[a-z0-9 ]` with a space
///
/// Character count is preserved; runs of whitespace are not collapsed.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | ' ' => c,
            _ => ' ',
        })
        .collect()
}

/// Plain substring containment
pub fn like_match(text: &str, keyword: &str) -> bool {
    text.contains(keyword)
}

/// Keywords of `bucket` present in already-normalized text
pub fn extract_keywords(normalized: &str, bucket: &SkillBucket) -> BTreeSet<String> {
    bucket
        .keywords
        .iter()
        .filter(|k| like_match(normalized, k))
        .cloned()
        .collect()
}

/// Round to one decimal place from the exact binary value, ties to even
///
/// `41.65` is stored as `41.6499...` and rounds down; `0.25` is an exact tie
/// and rounds to `0.2`.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Score a single bucket from the keyword sets found in each document
pub fn score_bucket(
    name: &str,
    jd_items: &BTreeSet<String>,
    cv_items: &BTreeSet<String>,
) -> BucketResult {
    let intersection: BTreeSet<String> = jd_items.intersection(cv_items).cloned().collect();
    let union: BTreeSet<String> = jd_items.union(cv_items).cloned().collect();
    let missing: BTreeSet<String> = jd_items.difference(cv_items).cloned().collect();

    let score = if union.is_empty() {
        0.0
    } else {
        round1(intersection.len() as f64 / union.len() as f64 * 100.0)
    };

    BucketResult {
        bucket: name.to_string(),
        score,
        intersection,
        union,
        missing,
    }
}

/// Compute the overlap-based alignment between a job description and a CV
pub fn compute_cv_match(jd_text: &str, cv_text: &str, taxonomy: &Taxonomy) -> MatchReport {
    let jd = normalize(jd_text);
    let cv = normalize(cv_text);

    let buckets: Vec<BucketResult> = taxonomy
        .buckets
        .iter()
        .map(|bucket| {
            let jd_items = extract_keywords(&jd, bucket);
            let cv_items = extract_keywords(&cv, bucket);
            let result = score_bucket(&bucket.name, &jd_items, &cv_items);
            log::debug!(
                "Bucket {}: jd={} cv={} overlap={} score={}",
                bucket.name,
                jd_items.len(),
                cv_items.len(),
                result.intersection.len(),
                result.score
            );
            result
        })
        .collect();

    let overall_score = if buckets.is_empty() {
        0.0
    } else {
        let total: f64 = buckets.iter().map(|b| b.score).sum();
        round1(total / buckets.len() as f64).min(100.0)
    };

    MatchReport {
        overall_score,
        buckets,
    }
}
