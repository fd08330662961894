//! `tabular-features` turns a delimited table of strings into a numeric feature matrix.
//!
//! The pipeline has three stages:
//!
//! 1. **Ingestion** ([`ingestion`]): read delimited text from a [`ingestion::TableSource`],
//!    check that every row has the header's field count, and build one
//!    [`types::ValueIndex`] per column (value → row positions) in the same pass.
//! 2. **Statistics** ([`processing::stats`]): per-column cardinality and mode.
//! 3. **Encoding** ([`processing::pipeline`]): per-column handling (identifier skip, target
//!    extraction, ignore list, categorical vs numeric), mode imputation of missing categorical
//!    values, and one-hot encoding with a deterministic category order and a dropped baseline.
//!
//! The output is an [`types::EncodedDataset`]: a row-major feature matrix, a target vector,
//! the emitted feature names, and a flag per feature marking categorical origin.
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_features::ingestion::{ingest, IngestionOptions, MemorySource};
//! use tabular_features::processing::{Pipeline, PipelineConfig};
//!
//! # fn main() -> Result<(), tabular_features::EncodingError> {
//! let csv = "Id,MSZoning,BedroomAbvGr,SalePrice\n\
//!            1,RL,3,208500\n\
//!            2,RM,NA,181500\n\
//!            3,NA,3,223500\n\
//!            4,RL,2,140000\n";
//! let it = ingest(&MemorySource::new("train", csv), &IngestionOptions::default())?;
//!
//! let cfg = PipelineConfig::new(vec![false, true, true, false])
//!     .with_identifier("Id")
//!     .with_target("SalePrice");
//! let out = Pipeline::new(&it.table.header, cfg)?.run_indexed(&it)?;
//!
//! // "NA" is the baseline of both categorical columns.
//! assert_eq!(
//!     out.header,
//!     ["MSZoning_RL", "MSZoning_RM", "BedroomAbvGr_2", "BedroomAbvGr_3"]
//! );
//! // Row 2's missing zoning is imputed with the mode, "RL".
//! assert_eq!(out.row(2), Some(&[1.0, 0.0, 0.0, 1.0][..]));
//! assert_eq!(out.report.imputed_cells, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Numeric conversion
//!
//! A numeric cell that does not parse never silently becomes zero: under
//! [`processing::ConversionPolicy::SubstituteZero`] (the default) it is replaced by `0.0`
//! and recorded in [`types::EncodingReport::conversion_issues`]; under
//! [`processing::ConversionPolicy::FailFast`] the run stops with
//! [`EncodingError::Conversion`].
//!
//! ## Modules
//!
//! - [`ingestion`]: sources, delimited-text reading, value indexing, observers
//! - [`types`]: raw table, value index, encoded dataset
//! - [`processing`]: statistics, imputation, encoding, pipeline
//! - [`execution`]: parallel pipeline execution with metrics
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{EncodingError, EncodingResult, IngestionError, IngestionResult};
