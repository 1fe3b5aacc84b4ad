//! Per-record inclusion rules

use super::records::{MetadataRecord, SequenceRecord};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field whose value must be a valid date under the presence policy
pub const COLLECTION_DATE_FIELD: &str = "sampleCollectionDate";

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex pattern"));

/// True when `value` is `YYYY-MM-DD` and names a real calendar date
pub fn is_valid_date(value: &str) -> bool {
    DATE_PATTERN.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Policy name as accepted in configuration and the `policy` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Presence,
    #[default]
    Lenient,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(PolicyKind::Presence),
            "lenient" => Ok(PolicyKind::Lenient),
            other => Err(format!(
                "Unknown policy '{other}', expected 'presence' or 'lenient'"
            )),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Presence => write!(f, "presence"),
            PolicyKind::Lenient => write!(f, "lenient"),
        }
    }
}

/// Inclusion rule applied to every sequence record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Every header field must be present and non-empty; a required
    /// `sampleCollectionDate` must also be a valid date.
    Presence,
    /// Every record is included unless the optional filter field holds a
    /// non-empty value that is not a valid date.
    Lenient { filter_field: Option<String> },
}

impl SelectionPolicy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            SelectionPolicy::Presence => PolicyKind::Presence,
            SelectionPolicy::Lenient { .. } => PolicyKind::Lenient,
        }
    }

    /// Whether an empty export means nothing matched rather than nothing to export
    pub fn can_reject_missing_metadata(&self) -> bool {
        matches!(self, SelectionPolicy::Presence)
    }

    /// Decide whether the sequence record joined with `metadata` is exported
    pub fn accepts(
        &self,
        sequence: &SequenceRecord,
        metadata: Option<&MetadataRecord>,
        fields: &[String],
    ) -> bool {
        match self {
            SelectionPolicy::Presence => {
                let Some(metadata) = metadata else {
                    tracing::trace!(
                        accession = %sequence.accession_version,
                        "Skipping record without metadata"
                    );
                    return false;
                };
                fields.iter().all(|field| match metadata.get(field) {
                    Some(value) if !value.is_empty() => {
                        field != COLLECTION_DATE_FIELD || is_valid_date(value)
                    }
                    _ => false,
                })
            }
            SelectionPolicy::Lenient { filter_field } => {
                let value = filter_field
                    .as_deref()
                    .and_then(|field| metadata.and_then(|m| m.get(field)));
                match value {
                    Some(value) if !value.is_empty() => is_valid_date(value),
                    _ => true,
                }
            }
        }
    }
}
