//! FASTA header composition and record rendering

use super::records::MetadataRecord;
use std::fmt;

/// Header fields used when the request does not name any
pub const DEFAULT_FIELDS: &[&str] = &["displayName", "sampleCollectionDate"];

const FIELD_SEPARATOR: &str = "|";

/// Ordered metadata field names making up the FASTA header.
///
/// Under the presence policy the same list is the set of required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields(Vec<String>);

impl HeaderFields {
    pub fn new(fields: Vec<String>) -> Option<Self> {
        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    /// Parse a comma-separated list, trimming names and dropping empty ones
    pub fn parse(list: &str) -> Option<Self> {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for HeaderFields {
    fn default() -> Self {
        Self(DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

/// Build the header for one record.
///
/// Falls back to the accession when there is no metadata or every requested
/// field is empty, so a header is never blank or just separators.
pub fn build_header(
    metadata: Option<&MetadataRecord>,
    fields: &[String],
    accession_version: &str,
) -> String {
    let Some(metadata) = metadata else {
        return accession_version.to_string();
    };

    let values: Vec<&str> = fields
        .iter()
        .map(|field| metadata.get(field).unwrap_or(""))
        .collect();

    if values.iter().all(|value| value.is_empty()) {
        return accession_version.to_string();
    }

    values.join(FIELD_SEPARATOR)
}

/// Two-line FASTA record; the sequence is emitted exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord<'a> {
    pub header: String,
    pub sequence: &'a str,
}

impl FastaRecord<'_> {
    /// Append `>{header}\n{sequence}\n` to `out`
    pub fn write_to(&self, out: &mut String) {
        out.push('>');
        out.push_str(&self.header);
        out.push('\n');
        out.push_str(self.sequence);
        out.push('\n');
    }
}

impl fmt::Display for FastaRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">{}", self.header)?;
        writeln!(f, "{}", self.sequence)
    }
}
