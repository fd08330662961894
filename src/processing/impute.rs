//! Missing-value imputation for categorical cells.

use serde::{Deserialize, Serialize};

use crate::types::MISSING_SENTINEL;

/// `true` for the `"NA"` sentinel and for the empty string.
pub fn is_missing(value: &str) -> bool {
    value == MISSING_SENTINEL || value.is_empty()
}

/// Replace a missing value with the column mode.
///
/// Non-missing values pass through unchanged, as do missing values in a column without a
/// mode or whose mode is itself missing.
pub fn impute_categorical<'a>(value: &'a str, mode: Option<&'a str>) -> &'a str {
    match mode {
        Some(mode) if is_missing(value) && !is_missing(mode) => mode,
        _ => value,
    }
}

/// Which categorical columns take part in imputation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeScope {
    /// Every categorical column.
    #[default]
    AllCategorical,
    /// Only the named categorical columns.
    Only(Vec<String>),
    /// Imputation disabled.
    None,
}

impl ImputeScope {
    /// Whether a categorical column named `column` is imputed.
    pub fn applies_to(&self, column: &str) -> bool {
        match self {
            Self::AllCategorical => true,
            Self::Only(columns) => columns.iter().any(|c| c == column),
            Self::None => false,
        }
    }
}
