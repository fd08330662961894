//! Delimited-text ingestion.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{IndexedTable, RawTable};

use super::index::ValueIndexer;

/// Build a CSV reader configured for table ingestion.
///
/// The reader is `flexible`, so rows with the wrong field count reach the indexer and are
/// reported as [`IngestionError::RowLengthMismatch`] with their row position.
pub fn reader_builder(delimiter: u8, trim: bool) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .trim(if trim { csv::Trim::All } else { csv::Trim::None });
    builder
}

/// Ingest a delimited file into an [`IndexedTable`].
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    delimiter: u8,
    trim: bool,
) -> IngestionResult<IndexedTable> {
    let mut rdr = reader_builder(delimiter, trim).from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest delimited data from an existing CSV reader.
///
/// Rules:
///
/// - The first record is the header and must be present.
/// - Every data row must have exactly as many fields as the header.
/// - Values are kept verbatim; the index is built in the same pass.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<IndexedTable> {
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if header.is_empty() {
        return Err(IngestionError::EmptyInput);
    }

    let mut indexer = ValueIndexer::new(header.len());
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                // Strict readers reject ragged rows themselves; report them the same way.
                if let csv::ErrorKind::UnequalLengths { expected_len, len, .. } = e.kind() {
                    return Err(IngestionError::RowLengthMismatch {
                        row,
                        expected: *expected_len as usize,
                        actual: *len as usize,
                    });
                }
                return Err(e.into());
            }
        };

        let fields: Vec<String> = record.iter().map(str::to_owned).collect();
        indexer.push_row(row, &fields)?;
        rows.push(fields);
    }

    Ok(IndexedTable {
        table: RawTable::new(header, rows),
        index: indexer.finish(),
    })
}
