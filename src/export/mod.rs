//! Sequence/metadata join and FASTA rendering
//!
//! - `records` - upstream record types and document envelopes
//! - `index` - accession-keyed metadata lookup
//! - `select` - inclusion policies and date validation
//! - `header` - FASTA header composition
//! - `pipeline` - request validation and end-to-end export

pub mod header;
pub mod index;
pub mod pipeline;
pub mod records;
pub mod select;

pub use header::{build_header, FastaRecord, HeaderFields, DEFAULT_FIELDS};
pub use index::{build_index, MetadataIndex};
pub use pipeline::{combine, run_export, Combined, ExportQuery, ExportRequest, ExportSettings};
pub use records::{parse_sequences, Envelope, MetadataRecord, SequenceRecord};
pub use select::{is_valid_date, PolicyKind, SelectionPolicy, COLLECTION_DATE_FIELD};
