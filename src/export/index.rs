//! Accession-keyed lookup over metadata records

use super::records::MetadataRecord;
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Metadata records keyed by `accessionVersion`.
///
/// Built once per request. When the source repeats an accession the last
/// record wins.
#[derive(Debug, Default, Clone)]
pub struct MetadataIndex {
    records: HashMap<String, MetadataRecord>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: MetadataRecord) {
        self.records
            .insert(record.accession_version.clone(), record);
    }

    pub fn get(&self, accession_version: &str) -> Option<&MetadataRecord> {
        self.records.get(accession_version)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<MetadataRecord> for MetadataIndex {
    fn from_iter<I: IntoIterator<Item = MetadataRecord>>(iter: I) -> Self {
        let mut index = MetadataIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

/// Build the index from an unwrapped metadata record array
pub fn build_index(records: Vec<Value>) -> Result<MetadataIndex> {
    let mut index = MetadataIndex::new();
    for value in records {
        index.insert(MetadataRecord::from_json(value)?);
    }
    Ok(index)
}
