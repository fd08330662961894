//! Value indexing: one inverted index per column, built while rows are ingested.

use crate::error::{IngestionError, IngestionResult};
use crate::types::{RawTable, TableIndex};

/// Incremental builder for a [`TableIndex`].
///
/// Rows are pushed in order; each push validates the field count against the header and
/// appends the row position to the bucket of every observed value.
#[derive(Debug, Clone)]
pub struct ValueIndexer {
    expected: usize,
    index: TableIndex,
}

impl ValueIndexer {
    /// Create an indexer for a header with `column_count` columns.
    pub fn new(column_count: usize) -> Self {
        Self {
            expected: column_count,
            index: TableIndex::with_columns(column_count),
        }
    }

    /// Index one row found at data-row position `row`.
    pub fn push_row<S: AsRef<str>>(&mut self, row: usize, fields: &[S]) -> IngestionResult<()> {
        if fields.len() != self.expected {
            return Err(IngestionError::RowLengthMismatch {
                row,
                expected: self.expected,
                actual: fields.len(),
            });
        }
        for (column, value) in self.index.columns.iter_mut().zip(fields) {
            column.insert(value.as_ref(), row);
        }
        Ok(())
    }

    /// Finish and return the index.
    pub fn finish(self) -> TableIndex {
        self.index
    }
}

/// Build the value index for an already materialized table.
///
/// Fails on the first row whose field count differs from the header.
pub fn build_table_index(table: &RawTable) -> IngestionResult<TableIndex> {
    let mut indexer = ValueIndexer::new(table.column_count());
    for (row, fields) in table.rows.iter().enumerate() {
        indexer.push_row(row, fields)?;
    }
    Ok(indexer.finish())
}
