//! One-hot encoding of categorical columns.
//!
//! A column's distinct values are placed in a [`CategoryOrdering`]. The first category is the
//! baseline: it gets no output column and is represented by an all-zero vector. Every other
//! category owns one output position, so a column with `k` distinct values emits `k - 1`
//! features.
//!
//! Ordering rules:
//!
//! - If every value other than `"NA"` is a base-10 integer, categories are sorted numerically
//!   and `"NA"` (when observed) comes first.
//! - Otherwise categories are sorted as strings and `"NA"` (when observed) is swapped into the
//!   first slot. Without `"NA"`, the smallest string is the baseline.
//!
//! The ordering depends only on the set of distinct values, so it is identical across runs.
//!
//! ```rust
//! use tabular_features::processing::CategoryOrdering;
//! use tabular_features::types::ValueIndex;
//!
//! let mut idx = ValueIndex::new();
//! for (row, v) in ["3", "1", "NA", "2"].iter().enumerate() {
//!     idx.insert(v, row);
//! }
//! let ordering = CategoryOrdering::from_index(&idx).unwrap();
//! assert_eq!(ordering.categories(), ["NA", "1", "2", "3"]);
//! assert_eq!(ordering.encode("3"), vec![0.0, 0.0, 1.0]);
//! assert_eq!(ordering.feature_names("Rooms"), ["Rooms_1", "Rooms_2", "Rooms_3"]);
//! ```

use std::collections::HashMap;

use crate::error::{EncodingError, EncodingResult};
use crate::types::{ValueIndex, MISSING_SENTINEL};

/// Deterministic total order over a categorical column's distinct values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOrdering {
    categories: Vec<String>,
    numeric: bool,
    // Output position of every non-baseline category.
    slots: HashMap<String, usize>,
}

impl CategoryOrdering {
    /// Order the distinct values of `index`.
    ///
    /// Returns `None` if the index is empty (there is no baseline to drop).
    pub fn from_index(index: &ValueIndex) -> Option<Self> {
        if index.is_empty() {
            return None;
        }
        let keys: Vec<&str> = index.keys().collect();
        let (categories, numeric) = match numeric_order(&keys) {
            Some(categories) => (categories, true),
            None => (string_order(&keys), false),
        };

        let slots = categories
            .iter()
            .skip(1)
            .enumerate()
            .map(|(slot, c)| (c.clone(), slot))
            .collect();

        Some(Self {
            categories,
            numeric,
            slots,
        })
    }

    /// All categories, baseline first.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The dropped category.
    pub fn baseline(&self) -> &str {
        &self.categories[0]
    }

    /// Categories that own an output position, in output order.
    pub fn encoded_categories(&self) -> &[String] {
        &self.categories[1..]
    }

    /// Output vector length (cardinality - 1).
    pub fn width(&self) -> usize {
        self.categories.len() - 1
    }

    /// `true` if the column was ordered as integer categories.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Output position for `value`; `None` for the baseline or an unseen value.
    pub fn slot(&self, value: &str) -> Option<usize> {
        self.slots.get(value).copied()
    }

    /// Append the one-hot vector for `value` to `out`.
    ///
    /// Unseen values encode like the baseline (all zeros).
    pub fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        let start = out.len();
        out.resize(start + self.width(), 0.0);
        if let Some(slot) = self.slot(value) {
            out[start + slot] = 1.0;
        }
    }

    /// One-hot vector for `value`.
    pub fn encode(&self, value: &str) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        self.encode_into(value, &mut out);
        out
    }

    /// Feature names `<column>_<category>` for every encoded category.
    pub fn feature_names(&self, column: &str) -> Vec<String> {
        self.encoded_categories()
            .iter()
            .map(|c| format!("{column}_{c}"))
            .collect()
    }
}

/// Encode a single categorical value against its column index.
///
/// Returns the one-hot vector and the matching feature names. Fails only if the column has no
/// observed values.
pub fn encode_categorical(
    value: &str,
    index: &ValueIndex,
    column: &str,
) -> EncodingResult<(Vec<f64>, Vec<String>)> {
    let ordering = CategoryOrdering::from_index(index).ok_or_else(|| EncodingError::EmptyColumn {
        column: column.to_owned(),
    })?;
    Ok((ordering.encode(value), ordering.feature_names(column)))
}

fn numeric_order(keys: &[&str]) -> Option<Vec<String>> {
    let mut has_missing = false;
    let mut numbers: Vec<(i64, &str)> = Vec::with_capacity(keys.len());
    for &k in keys {
        if k == MISSING_SENTINEL {
            has_missing = true;
            continue;
        }
        numbers.push((k.parse::<i64>().ok()?, k));
    }
    numbers.sort_unstable();

    let mut out = Vec::with_capacity(keys.len());
    if has_missing {
        out.push(MISSING_SENTINEL.to_owned());
    }
    out.extend(numbers.into_iter().map(|(_, k)| k.to_owned()));
    Some(out)
}

fn string_order(keys: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();
    out.sort_unstable();
    if let Some(na) = out.iter().position(|k| k == MISSING_SENTINEL) {
        out.swap(0, na);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{encode_categorical, CategoryOrdering};
    use crate::error::EncodingError;
    use crate::types::ValueIndex;

    fn index_of(values: &[&str]) -> ValueIndex {
        let mut idx = ValueIndex::new();
        for (row, v) in values.iter().enumerate() {
            idx.insert(v, row);
        }
        idx
    }

    #[test]
    fn integer_categories_sort_numerically_with_na_first() {
        let idx = index_of(&["3", "1", "NA", "2"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert!(o.is_numeric());
        assert_eq!(o.categories(), ["NA", "1", "2", "3"]);
        assert_eq!(o.baseline(), "NA");
        assert_eq!(o.encode("3"), vec![0.0, 0.0, 1.0]);
        assert_eq!(o.feature_names("Col"), ["Col_1", "Col_2", "Col_3"]);
    }

    #[test]
    fn integer_order_is_numeric_not_lexicographic() {
        let idx = index_of(&["10", "9", "-1", "100"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert_eq!(o.categories(), ["-1", "9", "10", "100"]);
        assert_eq!(o.baseline(), "-1");
    }

    #[test]
    fn zero_category_survives_next_to_na() {
        let idx = index_of(&["0", "NA", "1"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert_eq!(o.categories(), ["NA", "0", "1"]);
        assert_eq!(o.encode("0"), vec![1.0, 0.0]);
    }

    #[test]
    fn string_categories_without_na_use_smallest_as_baseline() {
        let idx = index_of(&["Pave", "Grvl", "Pave"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert!(!o.is_numeric());
        assert_eq!(o.categories(), ["Grvl", "Pave"]);
        assert_eq!(o.encode("Pave"), vec![1.0]);
        assert_eq!(o.encode("Grvl"), vec![0.0]);
        assert_eq!(o.feature_names("Street"), ["Street_Pave"]);
    }

    #[test]
    fn string_categories_swap_na_into_first_slot() {
        let idx = index_of(&["Z", "NA", "A", "B"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        // Sorted: A, B, NA, Z; "NA" and "A" trade places.
        assert_eq!(o.categories(), ["NA", "B", "A", "Z"]);
        assert_eq!(o.encode("NA"), vec![0.0, 0.0, 0.0]);
        assert_eq!(o.encode("A"), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn mixed_values_fall_back_to_string_order() {
        let idx = index_of(&["1", "2", "x"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert!(!o.is_numeric());
        assert_eq!(o.categories(), ["1", "2", "x"]);
    }

    #[test]
    fn vector_has_at_most_one_hot_and_zero_only_for_baseline() {
        let idx = index_of(&["c", "a", "b", "d", "NA"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        for cat in o.categories() {
            let v = o.encode(cat);
            assert_eq!(v.len(), idx.cardinality() - 1);
            let sum: f64 = v.iter().sum();
            if cat == o.baseline() {
                assert_eq!(sum, 0.0);
            } else {
                assert_eq!(sum, 1.0);
            }
        }
    }

    #[test]
    fn unseen_value_encodes_as_all_zero() {
        let idx = index_of(&["a", "b", "c"]);
        let o = CategoryOrdering::from_index(&idx).unwrap();
        assert_eq!(o.encode("nope"), vec![0.0, 0.0]);
    }

    #[test]
    fn ordering_is_reproducible() {
        let idx = index_of(&["RL", "RM", "FV", "NA", "C (all)", "RH", "RL"]);
        let a = CategoryOrdering::from_index(&idx).unwrap();
        let b = CategoryOrdering::from_index(&idx.clone()).unwrap();
        assert_eq!(a.categories(), b.categories());
        assert_eq!(a.feature_names("MSZoning"), b.feature_names("MSZoning"));
    }

    #[test]
    fn single_category_emits_nothing() {
        let idx = index_of(&["AllPub", "AllPub"]);
        let (v, names) = encode_categorical("AllPub", &idx, "Utilities").unwrap();
        assert!(v.is_empty());
        assert!(names.is_empty());
    }

    #[test]
    fn empty_index_is_an_error() {
        let err = encode_categorical("x", &ValueIndex::new(), "Alley").unwrap_err();
        assert!(matches!(err, EncodingError::EmptyColumn { column } if column == "Alley"));
    }
}
