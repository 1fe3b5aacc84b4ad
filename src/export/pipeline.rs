//! Export orchestration: validate the request, fetch both documents
//! concurrently, join them and render FASTA.

use super::header::{build_header, FastaRecord, HeaderFields};
use super::index::{build_index, MetadataIndex};
use super::records::{parse_sequences, Envelope, SequenceRecord};
use super::select::{PolicyKind, SelectionPolicy};
use crate::error::{ExportError, Result};
use crate::fetch::JsonFetcher;
use serde::Deserialize;
use tracing::{debug, info};

/// Raw query parameters of an export request
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub sequences_url: Option<String>,
    pub metadata_url: Option<String>,
    pub fields: Option<String>,
    pub policy: Option<String>,
    pub filter_for_valid_date: Option<String>,
}

/// Server-wide defaults and upstream document shapes
#[derive(Debug, Clone, Default)]
pub struct ExportSettings {
    pub default_policy: PolicyKind,
    pub default_fields: HeaderFields,
    pub sequences_envelope: Envelope,
    pub metadata_envelope: Envelope,
}

/// A validated export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub sequences_url: String,
    pub metadata_url: String,
    pub fields: HeaderFields,
    pub policy: SelectionPolicy,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ExportRequest {
    /// Validate raw parameters, filling gaps from `settings`
    pub fn from_query(query: ExportQuery, settings: &ExportSettings) -> Result<Self> {
        let (Some(sequences_url), Some(metadata_url)) = (
            non_empty(query.sequences_url),
            non_empty(query.metadata_url),
        ) else {
            return Err(ExportError::MissingParameter(
                "Both sequencesUrl and metadataUrl are required".to_string(),
            ));
        };

        let fields = match query.fields {
            Some(list) => HeaderFields::parse(&list).ok_or_else(|| {
                ExportError::InvalidParameter("At least one field must be specified".to_string())
            })?,
            None => settings.default_fields.clone(),
        };

        let kind = match non_empty(query.policy) {
            Some(name) => name
                .parse::<PolicyKind>()
                .map_err(ExportError::InvalidParameter)?,
            None => settings.default_policy,
        };

        let filter_field = non_empty(query.filter_for_valid_date);
        let policy = match (kind, filter_field) {
            (PolicyKind::Presence, None) => SelectionPolicy::Presence,
            (PolicyKind::Presence, Some(_)) => {
                return Err(ExportError::InvalidParameter(
                    "filterForValidDate is only supported with the lenient policy".to_string(),
                ))
            }
            (PolicyKind::Lenient, filter_field) => SelectionPolicy::Lenient { filter_field },
        };

        Ok(Self {
            sequences_url,
            metadata_url,
            fields,
            policy,
        })
    }
}

/// Result of joining sequences with metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combined {
    pub fasta: String,
    pub emitted: usize,
    pub skipped: usize,
}

/// Join every sequence record with its metadata, in input order
pub fn combine(
    sequences: &[SequenceRecord],
    index: &MetadataIndex,
    fields: &HeaderFields,
    policy: &SelectionPolicy,
) -> Combined {
    let mut combined = Combined::default();

    for sequence in sequences {
        let metadata = index.get(&sequence.accession_version);
        if !policy.accepts(sequence, metadata, fields.as_slice()) {
            combined.skipped += 1;
            continue;
        }

        FastaRecord {
            header: build_header(metadata, fields.as_slice(), &sequence.accession_version),
            sequence: &sequence.sequence,
        }
        .write_to(&mut combined.fasta);
        combined.emitted += 1;
    }

    combined
}

/// Run a complete export and return the FASTA text.
///
/// Both documents are fetched concurrently; either failing aborts the export
/// without partial output.
pub async fn run_export(
    fetcher: &dyn JsonFetcher,
    request: &ExportRequest,
    settings: &ExportSettings,
) -> Result<String> {
    debug!(
        "Fetching sequences from {} and metadata from {}",
        request.sequences_url, request.metadata_url
    );
    let (sequences_doc, metadata_doc) = tokio::try_join!(
        fetcher.fetch(&request.sequences_url),
        fetcher.fetch(&request.metadata_url)
    )?;

    let sequences = parse_sequences(settings.sequences_envelope.unwrap_records(sequences_doc)?)?;
    let index = build_index(settings.metadata_envelope.unwrap_records(metadata_doc)?)?;
    debug!(
        "Joining {} sequences against {} metadata records",
        sequences.len(),
        index.len()
    );

    let combined = combine(&sequences, &index, &request.fields, &request.policy);
    info!(
        "Exported {} of {} sequences ({} skipped, {} policy)",
        combined.emitted,
        sequences.len(),
        combined.skipped,
        request.policy.kind()
    );

    if combined.emitted == 0 && request.policy.can_reject_missing_metadata() {
        return Err(ExportError::NoMatch);
    }

    Ok(combined.fasta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::records::MetadataRecord;

    fn query(seq: Option<&str>, meta: Option<&str>) -> ExportQuery {
        ExportQuery {
            sequences_url: seq.map(str::to_string),
            metadata_url: meta.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_urls_rejected() {
        let settings = ExportSettings::default();
        for q in [
            query(None, Some("http://m")),
            query(Some("http://s"), None),
            query(Some("  "), Some("http://m")),
            query(None, None),
        ] {
            let err = ExportRequest::from_query(q, &settings).unwrap_err();
            assert!(matches!(err, ExportError::MissingParameter(_)));
        }
    }

    #[test]
    fn test_defaults_applied() {
        let request =
            ExportRequest::from_query(query(Some("http://s"), Some("http://m")), &ExportSettings::default())
                .unwrap();
        assert_eq!(request.fields, HeaderFields::default());
        assert_eq!(request.policy, SelectionPolicy::Lenient { filter_field: None });
    }

    #[test]
    fn test_policy_and_filter_parameters() {
        let settings = ExportSettings::default();

        let mut q = query(Some("http://s"), Some("http://m"));
        q.filter_for_valid_date = Some("sampleCollectionDate".to_string());
        let request = ExportRequest::from_query(q.clone(), &settings).unwrap();
        assert_eq!(
            request.policy,
            SelectionPolicy::Lenient {
                filter_field: Some("sampleCollectionDate".to_string())
            }
        );

        q.policy = Some("presence".to_string());
        assert!(matches!(
            ExportRequest::from_query(q.clone(), &settings),
            Err(ExportError::InvalidParameter(_))
        ));

        q.filter_for_valid_date = None;
        let request = ExportRequest::from_query(q.clone(), &settings).unwrap();
        assert_eq!(request.policy, SelectionPolicy::Presence);

        q.policy = Some("whatever".to_string());
        assert!(matches!(
            ExportRequest::from_query(q, &settings),
            Err(ExportError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_field_list_rejected() {
        let mut q = query(Some("http://s"), Some("http://m"));
        q.fields = Some(" , ".to_string());
        let err = ExportRequest::from_query(q, &ExportSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "At least one field must be specified");
    }

    #[test]
    fn test_combine_keeps_input_order_and_counts() {
        let sequences = vec![
            SequenceRecord::new("B.1", "TTTT"),
            SequenceRecord::new("A.1", "ACGT"),
            SequenceRecord::new("C.1", "GGGG"),
        ];
        let index: MetadataIndex = vec![
            MetadataRecord::new("A.1")
                .with_field("displayName", Some("Sample A"))
                .with_field("sampleCollectionDate", Some("2023-05-01")),
            MetadataRecord::new("B.1")
                .with_field("displayName", Some("Sample B"))
                .with_field("sampleCollectionDate", Some("2023-02-30")),
        ]
        .into_iter()
        .collect();

        let lenient = combine(
            &sequences,
            &index,
            &HeaderFields::default(),
            &SelectionPolicy::Lenient { filter_field: None },
        );
        assert_eq!(
            lenient.fasta,
            ">Sample B|2023-02-30\nTTTT\n>Sample A|2023-05-01\nACGT\n>C.1\nGGGG\n"
        );
        assert_eq!((lenient.emitted, lenient.skipped), (3, 0));

        let presence = combine(
            &sequences,
            &index,
            &HeaderFields::default(),
            &SelectionPolicy::Presence,
        );
        assert_eq!(presence.fasta, ">Sample A|2023-05-01\nACGT\n");
        assert_eq!((presence.emitted, presence.skipped), (1, 2));
    }

    #[test]
    fn test_duplicate_sequences_pass_through() {
        let sequences = vec![
            SequenceRecord::new("A.1", "ACGT"),
            SequenceRecord::new("A.1", "ACGA"),
        ];
        let combined = combine(
            &sequences,
            &MetadataIndex::new(),
            &HeaderFields::default(),
            &SelectionPolicy::Lenient { filter_field: None },
        );
        assert_eq!(combined.fasta, ">A.1\nACGT\n>A.1\nACGA\n");
    }
}
