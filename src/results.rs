use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A single inbound search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    query: String,
}

impl SearchRequest {
    /// Create a request, rejecting blank queries before any browser work happens
    pub fn new(query: &str) -> Result<Self, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidQuery);
        }
        Ok(Self {
            query: query.to_string(),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// A validated product listing returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listing title, at most 200 characters
    pub title: String,

    /// Price as a positive decimal
    pub price: f64,

    /// Absolute URL of the listing
    pub permalink: String,

    /// Thumbnail image URL
    pub thumbnail: String,
}

/// Candidate fields resolved from one item node, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRecord {
    pub title: Option<String>,
    pub price: f64,
    pub permalink: Option<String>,
    pub thumbnail: Option<String>,
}

/// Diagnostic counters for items that did not produce a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub sponsored: usize,
    pub incomplete: usize,
    pub malformed: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.sponsored + self.incomplete + self.malformed
    }
}

/// Output of one extraction pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionBatch {
    /// Validated records in page order
    pub records: Vec<ProductRecord>,

    /// Number of item nodes found in the results container
    pub items_seen: usize,

    pub skipped: SkipCounts,
}
