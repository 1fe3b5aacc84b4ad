//! Upstream record types and document envelope handling

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Shape of an upstream JSON document.
///
/// Each endpoint is configured with exactly one envelope; documents are never
/// sniffed to guess which one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Records wrapped in an object under a `data` key: `{"data": [...]}`
    #[default]
    Data,
    /// A bare top-level array of records
    Bare,
}

impl Envelope {
    /// Extract the record array from a fetched document
    pub fn unwrap_records(self, document: Value) -> Result<Vec<Value>> {
        match (self, document) {
            (Envelope::Bare, Value::Array(records)) => Ok(records),
            (Envelope::Data, Value::Object(mut object)) => match object.remove("data") {
                Some(Value::Array(records)) => Ok(records),
                Some(other) => Err(ExportError::Processing(format!(
                    "expected `data` to be an array but found {}",
                    json_kind(&other)
                ))),
                None => Err(ExportError::Processing(
                    "document has no `data` array".to_string(),
                )),
            },
            (envelope, other) => Err(ExportError::Processing(format!(
                "expected {} but found {}",
                envelope,
                json_kind(&other)
            ))),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Envelope::Data => write!(f, "an object with a `data` array"),
            Envelope::Bare => write!(f, "a bare array"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A sequence entry from the sequences document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub accession_version: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(accession_version: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            accession_version: accession_version.into(),
            sequence: sequence.into(),
        }
    }
}

/// Wire shape of a sequence entry; `main` is null when upstream has no sequence
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceEntry {
    accession_version: String,
    main: Option<String>,
}

/// Parse the sequence entries of an unwrapped document, keeping their order.
///
/// Entries whose `main` is null or missing have nothing to export and are
/// dropped.
pub fn parse_sequences(records: Vec<Value>) -> Result<Vec<SequenceRecord>> {
    let mut sequences = Vec::with_capacity(records.len());
    for (position, value) in records.into_iter().enumerate() {
        let entry: SequenceEntry = serde_json::from_value(value).map_err(|e| {
            ExportError::Processing(format!("invalid sequence record at index {position}: {e}"))
        })?;
        match entry.main {
            Some(sequence) => sequences.push(SequenceRecord {
                accession_version: entry.accession_version,
                sequence,
            }),
            None => debug!(
                "Dropping {} without a sequence",
                entry.accession_version
            ),
        }
    }
    Ok(sequences)
}

/// A metadata entry: an accession plus arbitrarily named fields.
///
/// A field holding JSON `null` is stored as absent. Strings are kept verbatim,
/// other values keep their JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub accession_version: String,
    fields: HashMap<String, Option<String>>,
}

impl MetadataRecord {
    pub fn new(accession_version: impl Into<String>) -> Self {
        let accession_version = accession_version.into();
        let mut fields = HashMap::new();
        fields.insert(
            "accessionVersion".to_string(),
            Some(accession_version.clone()),
        );
        Self {
            accession_version,
            fields,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.fields.insert(name.into(), value.map(str::to_string));
        self
    }

    /// Value of a field, `None` when the key is missing or null
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|value| value.as_deref())
    }

    /// Build a record from one element of the metadata document
    pub fn from_json(value: Value) -> Result<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ExportError::Processing(format!(
                    "metadata record must be an object but found {}",
                    json_kind(&other)
                )))
            }
        };

        let accession_version = match object.get("accessionVersion") {
            Some(Value::String(accession)) => accession.clone(),
            _ => {
                return Err(ExportError::Processing(
                    "metadata record is missing a string `accessionVersion`".to_string(),
                ))
            }
        };

        let fields = object
            .into_iter()
            .map(|(name, value)| (name, field_text(value)))
            .collect();

        Ok(Self {
            accession_version,
            fields,
        })
    }
}

fn field_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
