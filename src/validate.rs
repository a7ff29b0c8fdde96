use crate::error::ItemSkip;
use crate::results::{CandidateRecord, ExtractionBatch, ProductRecord};
use std::fmt;
use url::Url;

/// Record fields checked by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Price,
    Permalink,
    Thumbnail,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Price => "price",
            Field::Permalink => "permalink",
            Field::Thumbnail => "thumbnail",
        };
        f.write_str(name)
    }
}

/// Why a candidate was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub missing: Vec<Field>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.missing.iter().map(Field::to_string).collect();
        write!(f, "missing or invalid: {}", names.join(", "))
    }
}

/// Accept a candidate only when all four fields are populated and well-formed
pub fn validate(candidate: CandidateRecord) -> Result<ProductRecord, Rejection> {
    let mut missing = Vec::new();

    let title = candidate
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if title.is_none() {
        missing.push(Field::Title);
    }

    let price = candidate.price;
    if !(price.is_finite() && price > 0.0) {
        missing.push(Field::Price);
    }

    let permalink = candidate.permalink.filter(|p| is_web_url(p));
    if permalink.is_none() {
        missing.push(Field::Permalink);
    }

    let thumbnail = candidate.thumbnail.filter(|t| is_web_url(t));
    if thumbnail.is_none() {
        missing.push(Field::Thumbnail);
    }

    match (title, permalink, thumbnail) {
        (Some(title), Some(permalink), Some(thumbnail)) if missing.is_empty() => {
            Ok(ProductRecord {
                title,
                price,
                permalink,
                thumbnail,
            })
        }
        _ => Err(Rejection { missing }),
    }
}

/// Validate every extraction outcome, counting what was dropped and why
///
/// A rejected or skipped item never affects its siblings.
pub fn validate_batch(outcomes: Vec<Result<CandidateRecord, ItemSkip>>) -> ExtractionBatch {
    let mut batch = ExtractionBatch {
        items_seen: outcomes.len(),
        ..ExtractionBatch::default()
    };

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(candidate) => match validate(candidate) {
                Ok(record) => batch.records.push(record),
                Err(rejection) => {
                    ::log::debug!("Item {} rejected: {}", index, rejection);
                    batch.skipped.incomplete += 1;
                }
            },
            Err(ItemSkip::Sponsored) => {
                ::log::trace!("Item {} skipped: sponsored", index);
                batch.skipped.sponsored += 1;
            }
            Err(skip) => {
                ::log::warn!("Item {} skipped: {}", index, skip);
                batch.skipped.malformed += 1;
            }
        }
    }

    batch
}

/// An absolute http(s) URL with a host
pub(crate) fn is_web_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
