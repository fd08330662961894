//! Pipeline orchestration: turn an indexed table into a numeric feature matrix.
//!
//! Each header column gets a [`ColumnRole`] once, when the [`Pipeline`] is built. Running the
//! pipeline first derives an [`EncodingPlan`] from the value index (category orderings and
//! modes, computed once per column), then encodes every row against that plan:
//!
//! - identifier column: skipped
//! - target column: parsed as a number into the target vector
//! - ignored columns: skipped
//! - categorical columns: missing values imputed from the mode, then one-hot encoded
//! - everything else: parsed as a single number
//!
//! Numeric cells that do not parse are handled by the configured [`ConversionPolicy`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult, IngestionError};
use crate::types::{
    ConversionIssue, EncodedDataset, EncodingReport, IndexedTable, RawTable, TableIndex, ValueIndex,
};

use super::encode::CategoryOrdering;
use super::impute::{impute_categorical, is_missing, ImputeScope};

/// What to do with a numeric cell that does not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Abort the run with [`EncodingError::Conversion`].
    FailFast,
    /// Emit `0.0` and record a [`ConversionIssue`] in the run report.
    #[default]
    SubstituteZero,
}

/// Pipeline configuration.
///
/// Can be built in code or loaded from JSON:
///
/// ```rust
/// use tabular_features::processing::{ConversionPolicy, PipelineConfig};
///
/// let cfg = PipelineConfig::from_json_str(
///     r#"{
///         "is_categorical": [false, true, false],
///         "identifier_column": "Id",
///         "target_column": "SalePrice",
///         "conversion_policy": "fail_fast"
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(cfg.conversion_policy, ConversionPolicy::FailFast);
/// assert!(cfg.ignored_columns.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// One flag per header column: `true` for categorical columns.
    pub is_categorical: Vec<bool>,
    /// Columns left out of the feature matrix.
    #[serde(default)]
    pub ignored_columns: Vec<String>,
    /// Row identifier column, skipped entirely.
    #[serde(default)]
    pub identifier_column: Option<String>,
    /// Column extracted into the target vector.
    #[serde(default)]
    pub target_column: Option<String>,
    #[serde(default)]
    pub conversion_policy: ConversionPolicy,
    #[serde(default)]
    pub impute: ImputeScope,
}

impl PipelineConfig {
    /// Configuration with the given categorical hints and every other option at its default.
    pub fn new(is_categorical: Vec<bool>) -> Self {
        Self {
            is_categorical,
            ..Default::default()
        }
    }

    pub fn with_identifier(mut self, name: impl Into<String>) -> Self {
        self.identifier_column = Some(name.into());
        self
    }

    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        self.target_column = Some(name.into());
        self
    }

    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_columns.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_conversion_policy(mut self, policy: ConversionPolicy) -> Self {
        self.conversion_policy = policy;
        self
    }

    pub fn with_impute(mut self, scope: ImputeScope) -> Self {
        self.impute = scope;
        self
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(s: &str) -> EncodingResult<Self> {
        serde_json::from_str(s).map_err(|e| EncodingError::Config {
            message: e.to_string(),
        })
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_path(path: impl AsRef<Path>) -> EncodingResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EncodingError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }
}

/// How a header column participates in encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Identifier,
    Target,
    Ignored,
    Categorical,
    Numeric,
}

/// Per-column encoding instructions derived from the value index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPlan {
    /// Identifier or ignored column.
    Skip,
    /// Numeric target value.
    Target,
    /// Single numeric feature.
    Numeric,
    /// One-hot feature block.
    Categorical {
        ordering: CategoryOrdering,
        /// Replacement for missing values, when imputation applies to this column.
        fill: Option<String>,
    },
}

/// Rows encoded against an [`EncodingPlan`], ready to be stitched into an [`EncodedDataset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedChunk {
    pub features: Vec<f64>,
    pub targets: Vec<f64>,
    pub report: EncodingReport,
}

/// Column plans for one table, plus everything needed to encode a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPlan {
    names: Vec<String>,
    columns: Vec<ColumnPlan>,
    policy: ConversionPolicy,
}

impl EncodingPlan {
    /// Assemble a plan from per-column plans in header order.
    pub fn new(names: Vec<String>, columns: Vec<ColumnPlan>, policy: ConversionPolicy) -> Self {
        Self {
            names,
            columns,
            policy,
        }
    }

    pub fn columns(&self) -> &[ColumnPlan] {
        &self.columns
    }

    /// `true` if some column feeds the target vector.
    pub fn has_target(&self) -> bool {
        self.columns.iter().any(|c| matches!(c, ColumnPlan::Target))
    }

    /// Number of features emitted per row.
    pub fn feature_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| match c {
                ColumnPlan::Numeric => 1,
                ColumnPlan::Categorical { ordering, .. } => ordering.width(),
                ColumnPlan::Skip | ColumnPlan::Target => 0,
            })
            .sum()
    }

    /// Emitted feature names in output order.
    pub fn feature_header(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.feature_count());
        for (name, plan) in self.names.iter().zip(&self.columns) {
            match plan {
                ColumnPlan::Numeric => out.push(name.clone()),
                ColumnPlan::Categorical { ordering, .. } => out.extend(ordering.feature_names(name)),
                ColumnPlan::Skip | ColumnPlan::Target => {}
            }
        }
        out
    }

    /// One flag per emitted feature: `true` if it came from a categorical column.
    pub fn categorical_flags(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.feature_count());
        for plan in &self.columns {
            match plan {
                ColumnPlan::Numeric => out.push(false),
                ColumnPlan::Categorical { ordering, .. } => {
                    out.extend(std::iter::repeat_n(true, ordering.width()))
                }
                ColumnPlan::Skip | ColumnPlan::Target => {}
            }
        }
        out
    }

    /// Encode consecutive rows, the first of which sits at data-row position `first_row`.
    pub fn encode_rows(&self, first_row: usize, rows: &[Vec<String>]) -> EncodingResult<EncodedChunk> {
        let mut chunk = EncodedChunk {
            features: Vec::with_capacity(rows.len() * self.feature_count()),
            ..Default::default()
        };
        for (offset, fields) in rows.iter().enumerate() {
            self.encode_row(first_row + offset, fields, &mut chunk)?;
        }
        Ok(chunk)
    }

    /// Encode one row into `out`.
    pub fn encode_row(&self, row: usize, fields: &[String], out: &mut EncodedChunk) -> EncodingResult<()> {
        for ((name, plan), raw) in self.names.iter().zip(&self.columns).zip(fields) {
            match plan {
                ColumnPlan::Skip => {}
                ColumnPlan::Target => {
                    let v = self.convert(row, name, raw, &mut out.report)?;
                    out.targets.push(v);
                }
                ColumnPlan::Numeric => {
                    let v = self.convert(row, name, raw, &mut out.report)?;
                    out.features.push(v);
                }
                ColumnPlan::Categorical { ordering, fill } => {
                    let value = impute_categorical(raw, fill.as_deref());
                    if is_missing(raw) && value != raw.as_str() {
                        out.report.imputed_cells += 1;
                    }
                    ordering.encode_into(value, &mut out.features);
                }
            }
        }
        Ok(())
    }

    /// Stitch chunks (in row order) into the final dataset.
    ///
    /// Without a target column the target vector is one zero per row.
    pub fn finish<I>(&self, rows: usize, chunks: I) -> EncodedDataset
    where
        I: IntoIterator<Item = EncodedChunk>,
    {
        let cols = self.feature_count();
        let mut features = Vec::with_capacity(rows * cols);
        let mut targets = Vec::new();
        let mut report = EncodingReport::default();
        for chunk in chunks {
            features.extend(chunk.features);
            targets.extend(chunk.targets);
            report.conversion_issues.extend(chunk.report.conversion_issues);
            report.imputed_cells += chunk.report.imputed_cells;
        }
        if !self.has_target() {
            targets = vec![0.0; rows];
        }

        EncodedDataset {
            rows,
            cols,
            features,
            targets,
            header: self.feature_header(),
            categorical: self.categorical_flags(),
            report,
        }
    }

    fn convert(&self, row: usize, column: &str, raw: &str, report: &mut EncodingReport) -> EncodingResult<f64> {
        match raw.trim().parse::<f64>() {
            Ok(v) => Ok(v),
            Err(e) => match self.policy {
                ConversionPolicy::FailFast => Err(EncodingError::Conversion {
                    row,
                    column: column.to_owned(),
                    raw: raw.to_owned(),
                    message: e.to_string(),
                }),
                ConversionPolicy::SubstituteZero => {
                    report.conversion_issues.push(ConversionIssue {
                        row,
                        column: column.to_owned(),
                        raw: raw.to_owned(),
                    });
                    Ok(0.0)
                }
            },
        }
    }
}

/// A validated pipeline bound to one header.
#[derive(Debug, Clone)]
pub struct Pipeline {
    header: Vec<String>,
    roles: Vec<ColumnRole>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` against `header` and resolve every column's role.
    ///
    /// Fails if the categorical hints do not have one entry per header column.
    pub fn new(header: &[String], config: PipelineConfig) -> EncodingResult<Self> {
        if config.is_categorical.len() != header.len() {
            return Err(EncodingError::HintLengthMismatch {
                expected: header.len(),
                actual: config.is_categorical.len(),
            });
        }

        let roles = header
            .iter()
            .zip(&config.is_categorical)
            .map(|(name, &categorical)| {
                if config.identifier_column.as_deref() == Some(name.as_str()) {
                    ColumnRole::Identifier
                } else if config.target_column.as_deref() == Some(name.as_str()) {
                    ColumnRole::Target
                } else if config.ignored_columns.iter().any(|c| c == name) {
                    ColumnRole::Ignored
                } else if categorical {
                    ColumnRole::Categorical
                } else {
                    ColumnRole::Numeric
                }
            })
            .collect();

        Ok(Self {
            header: header.to_vec(),
            roles,
            config,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fails unless `table` has exactly the header this pipeline was built for and every row
    /// has one field per header column.
    pub fn check_table(&self, table: &RawTable) -> EncodingResult<()> {
        if table.header != self.header {
            return Err(EncodingError::Config {
                message: format!(
                    "table header {:?} does not match pipeline header {:?}",
                    table.header, self.header
                ),
            });
        }
        let expected = self.header.len();
        if let Some((row, fields)) = table.rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(IngestionError::RowLengthMismatch {
                row,
                expected,
                actual: fields.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Plan for column `j` given its value index.
    pub fn plan_column(&self, j: usize, index: &ValueIndex) -> EncodingResult<ColumnPlan> {
        let plan = match self.roles[j] {
            ColumnRole::Identifier | ColumnRole::Ignored => ColumnPlan::Skip,
            ColumnRole::Target => ColumnPlan::Target,
            ColumnRole::Numeric => ColumnPlan::Numeric,
            ColumnRole::Categorical => {
                let name = &self.header[j];
                let ordering =
                    CategoryOrdering::from_index(index).ok_or_else(|| EncodingError::EmptyColumn {
                        column: name.clone(),
                    })?;
                let fill = if self.config.impute.applies_to(name) {
                    index.mode().map(str::to_owned)
                } else {
                    None
                };
                ColumnPlan::Categorical { ordering, fill }
            }
        };
        Ok(plan)
    }

    /// Plans for every column, sequentially.
    pub fn plan(&self, index: &TableIndex) -> EncodingResult<EncodingPlan> {
        let columns = (0..self.header.len())
            .map(|j| match index.column(j) {
                Some(values) => self.plan_column(j, values),
                None => self.plan_column(j, &ValueIndex::new()),
            })
            .collect::<EncodingResult<Vec<_>>>()?;
        Ok(self.assemble(columns))
    }

    /// Wrap per-column plans (in header order) into an [`EncodingPlan`].
    pub fn assemble(&self, columns: Vec<ColumnPlan>) -> EncodingPlan {
        EncodingPlan::new(self.header.clone(), columns, self.config.conversion_policy)
    }

    /// Encode `table` against its value `index`.
    ///
    /// A table without data rows yields an empty dataset.
    pub fn run(&self, table: &RawTable, index: &TableIndex) -> EncodingResult<EncodedDataset> {
        self.check_table(table)?;
        if table.row_count() == 0 {
            return Ok(EncodedDataset::default());
        }
        let plan = self.plan(index)?;
        let chunk = plan.encode_rows(0, &table.rows)?;
        Ok(plan.finish(table.row_count(), [chunk]))
    }

    /// Same as [`Self::run`] for an [`IndexedTable`].
    pub fn run_indexed(&self, indexed: &IndexedTable) -> EncodingResult<EncodedDataset> {
        self.run(&indexed.table, &indexed.index)
    }
}
