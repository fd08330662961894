//! Per-column statistics derived from a [`TableIndex`].

use std::fmt;

use crate::types::{RawTable, TableIndex};

/// Cardinality and mode of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    /// Number of distinct observed values.
    pub cardinality: usize,
    /// Most frequent value; `None` if the column has no observations.
    pub mode: Option<String>,
}

/// Distinct-value count per column.
pub fn cardinality(index: &TableIndex) -> Vec<usize> {
    index.columns.iter().map(|c| c.cardinality()).collect()
}

/// Most frequent value per column.
///
/// Ties go to the lexicographically smallest value; empty columns yield `None`.
pub fn modes(index: &TableIndex) -> Vec<Option<String>> {
    index
        .columns
        .iter()
        .map(|c| c.mode().map(str::to_owned))
        .collect()
}

/// Cardinality and mode for every column.
pub fn column_stats(index: &TableIndex) -> Vec<ColumnStats> {
    index
        .columns
        .iter()
        .map(|c| ColumnStats {
            cardinality: c.cardinality(),
            mode: c.mode().map(str::to_owned),
        })
        .collect()
}

/// A named [`ColumnStats`] row, e.g. for printing a dataset overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub stats: ColumnStats,
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.stats.cardinality)
    }
}

/// One summary per header column.
pub fn column_summaries(table: &RawTable, index: &TableIndex) -> Vec<ColumnSummary> {
    table
        .header
        .iter()
        .zip(column_stats(index))
        .map(|(name, stats)| ColumnSummary {
            name: name.clone(),
            stats,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{cardinality, column_summaries, modes};
    use crate::ingestion::build_table_index;
    use crate::types::RawTable;

    fn sample() -> RawTable {
        let rows = [
            ("A", "1"),
            ("B", "2"),
            ("B", "2"),
            ("C", "1"),
            ("B", "3"),
            ("C", "3"),
            ("B", "3"),
            ("B", "1"),
        ];
        RawTable::new(
            vec!["Letter".into(), "Num".into()],
            rows.iter()
                .map(|(a, b)| vec![a.to_string(), b.to_string()])
                .collect(),
        )
    }

    #[test]
    fn cardinality_per_column() {
        let t = sample();
        let idx = build_table_index(&t).unwrap();
        assert_eq!(cardinality(&idx), vec![3, 3]);
    }

    #[test]
    fn mode_of_a_b_c_with_counts_1_5_2_is_b() {
        let t = sample();
        let idx = build_table_index(&t).unwrap();
        let m = modes(&idx);
        assert_eq!(m[0].as_deref(), Some("B"));
        // "1" and "3" both occur three times; the smaller key wins.
        assert_eq!(m[1].as_deref(), Some("1"));
    }

    #[test]
    fn summaries_print_name_and_cardinality() {
        let t = sample();
        let idx = build_table_index(&t).unwrap();
        let lines: Vec<String> = column_summaries(&t, &idx)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, vec!["Letter: 3", "Num: 3"]);
    }
}
