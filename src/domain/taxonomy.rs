//! Capability keyword taxonomy
//!
//! Keywords are grouped into ordered buckets. The default taxonomy covers
//! analytical skills, ownership signals and tooling.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A named group of capability keywords
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillBucket {
    pub name: String,
    pub keywords: Vec<String>,
}

impl SkillBucket {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered set of capability buckets used for keyword extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    pub buckets: Vec<SkillBucket>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            buckets: vec![
                SkillBucket::new(
                    "skills",
                    &[
                        "analytics",
                        "data analysis",
                        "insights",
                        "business insights",
                        "strategy",
                        "strategic",
                        "stakeholder",
                        "stakeholder management",
                        "problem solving",
                        "decision making",
                        "scenario analysis",
                    ],
                ),
                SkillBucket::new(
                    "ownership",
                    &[
                        "led",
                        "leadership",
                        "owned",
                        "ownership",
                        "managed",
                        "management",
                        "delivered",
                        "delivery",
                        "end to end",
                        "e2e",
                        "accountable",
                        "responsible for",
                        "driving",
                        "executed",
                        "scaled",
                    ],
                ),
                SkillBucket::new(
                    "tools",
                    &[
                        "python",
                        "sql",
                        "power bi",
                        "tableau",
                        "excel",
                        "pandas",
                        "numpy",
                        "spark",
                        "dashboard",
                        "data visualization",
                        "etl",
                        "bigquery",
                        "snowflake",
                        "vba",
                        "dax",
                    ],
                ),
            ],
        }
    }
}

impl Taxonomy {
    /// Load a custom taxonomy from a JSON file
    ///
    /// Format: `{"buckets": [{"name": "tools", "keywords": ["sql", "python"]}]}`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_json_str(&raw)?;
        log::info!(
            "Loaded taxonomy [{}] from {}",
            taxonomy.bucket_names().join(", "),
            path.display()
        );
        Ok(taxonomy)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut taxonomy: Taxonomy = serde_json::from_str(raw)?;
        for bucket in &mut taxonomy.buckets {
            bucket.name = bucket.name.trim().to_string();
            bucket.keywords = bucket
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Check structural rules: non-empty, unique bucket names, no empty buckets
    pub fn validate(&self) -> Result<()> {
        if self.buckets.is_empty() {
            return Err(AppError::Config(
                "Taxonomy must contain at least one bucket".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for bucket in &self.buckets {
            if bucket.name.is_empty() {
                return Err(AppError::Config("Bucket name cannot be empty".to_string()));
            }
            if !seen.insert(bucket.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate bucket name: {}",
                    bucket.name
                )));
            }
            if bucket.keywords.is_empty() {
                return Err(AppError::Config(format!(
                    "Bucket '{}' has no keywords",
                    bucket.name
                )));
            }
        }
        Ok(())
    }

    pub fn bucket_names(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.name.as_str()).collect()
    }
}
