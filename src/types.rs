//! Core data model types.
//!
//! Ingestion produces a [`RawTable`] (string cells, one header) plus a [`TableIndex`] (one
//! [`ValueIndex`] per column). The encoding pipeline turns both into an [`EncodedDataset`].

use std::collections::BTreeMap;

use serde::Serialize;

/// Literal marker for a missing value in the input.
pub const MISSING_SENTINEL: &str = "NA";

/// An in-memory delimited table: one header plus rows of string fields.
///
/// Every row has the same field count as the header once it has passed through
/// [`crate::ingestion::index::build_table_index`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// Column names, in input order.
    pub header: Vec<String>,
    /// Row-major string storage.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from a header and rows.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Mapping from each distinct value of one column to the row positions where it occurs.
///
/// Keys are kept sorted, so iteration order is deterministic. Positions inside a bucket are
/// in ascending (first-seen) order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueIndex {
    buckets: BTreeMap<String, Vec<usize>>,
}

impl ValueIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `value` occurs at `row`.
    pub fn insert(&mut self, value: &str, row: usize) {
        match self.buckets.get_mut(value) {
            Some(bucket) => bucket.push(row),
            None => {
                self.buckets.insert(value.to_owned(), vec![row]);
            }
        }
    }

    /// Number of distinct values.
    pub fn cardinality(&self) -> usize {
        self.buckets.len()
    }

    /// `true` if no value has been recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `true` if `value` was observed.
    pub fn contains(&self, value: &str) -> bool {
        self.buckets.contains_key(value)
    }

    /// Row positions for `value`, if observed.
    pub fn positions(&self, value: &str) -> Option<&[usize]> {
        self.buckets.get(value).map(Vec::as_slice)
    }

    /// Distinct values in ascending string order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// `(value, positions)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The most frequent value.
    ///
    /// Ties go to the lexicographically smallest value. Returns `None` for an empty index.
    pub fn mode(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (value, positions) in self.iter() {
            if best.is_none_or(|(_, n)| positions.len() > n) {
                best = Some((value, positions.len()));
            }
        }
        best.map(|(value, _)| value)
    }
}

/// One [`ValueIndex`] per header column, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableIndex {
    pub columns: Vec<ValueIndex>,
}

impl TableIndex {
    /// Create `n` empty column indexes.
    pub fn with_columns(n: usize) -> Self {
        Self {
            columns: vec![ValueIndex::new(); n],
        }
    }

    /// Index for column `j`.
    pub fn column(&self, j: usize) -> Option<&ValueIndex> {
        self.columns.get(j)
    }

    /// Number of indexed columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// `true` when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A validated table together with its value index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexedTable {
    pub table: RawTable,
    pub index: TableIndex,
}

/// A numeric cell that could not be converted and was replaced by `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionIssue {
    /// 0-based data-row position.
    pub row: usize,
    /// Source column name.
    pub column: String,
    /// Raw cell contents.
    pub raw: String,
}

/// Per-run data-quality counters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EncodingReport {
    /// Numeric cells that were substituted with zero.
    pub conversion_issues: Vec<ConversionIssue>,
    /// Categorical cells whose missing value was replaced by the column mode.
    pub imputed_cells: usize,
}

/// Output of the encoding pipeline.
///
/// `features` is row-major with `feature_count` values per row. `header` and
/// `categorical` have one entry per emitted feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EncodedDataset {
    pub rows: usize,
    pub cols: usize,
    pub features: Vec<f64>,
    pub targets: Vec<f64>,
    pub header: Vec<String>,
    pub categorical: Vec<bool>,
    pub report: EncodingReport,
}

impl EncodedDataset {
    /// Number of encoded rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of features per row.
    pub fn feature_count(&self) -> usize {
        self.cols
    }

    /// Feature values for row `i`.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        self.features.get(start..start + self.cols)
    }

    /// Position of an emitted feature by name.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodedDataset, ValueIndex};

    fn index_of(values: &[&str]) -> ValueIndex {
        let mut idx = ValueIndex::new();
        for (row, v) in values.iter().enumerate() {
            idx.insert(v, row);
        }
        idx
    }

    #[test]
    fn value_index_buckets_keep_first_seen_order() {
        let idx = index_of(&["a", "b", "a", "c", "a"]);
        assert_eq!(idx.cardinality(), 3);
        assert_eq!(idx.positions("a"), Some(&[0, 2, 4][..]));
        assert_eq!(idx.positions("c"), Some(&[3][..]));
        assert_eq!(idx.positions("zzz"), None);
        assert_eq!(idx.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn mode_picks_largest_bucket() {
        let idx = index_of(&["A", "B", "B", "C", "B", "C", "B", "B"]);
        assert_eq!(idx.mode(), Some("B"));
    }

    #[test]
    fn mode_tie_goes_to_smallest_key() {
        let idx = index_of(&["y", "x", "y", "x"]);
        assert_eq!(idx.mode(), Some("x"));
    }

    #[test]
    fn mode_of_empty_index_is_none() {
        assert_eq!(ValueIndex::new().mode(), None);
    }

    #[test]
    fn encoded_dataset_row_slices() {
        let ds = EncodedDataset {
            rows: 2,
            cols: 2,
            features: vec![1.0, 2.0, 3.0, 4.0],
            header: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        assert_eq!(ds.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(ds.row(2), None);
        assert_eq!(ds.feature_index("b"), Some(1));
    }
}
