//! Feature encoding over an ingested table.
//!
//! The processing layer operates on the [`crate::types::RawTable`] and
//! [`crate::types::TableIndex`] produced by ingestion. It is purely in-memory and single pass.
//!
//! - [`stats`]: per-column cardinality and mode
//! - [`impute`]: mode imputation for missing categorical values
//! - [`encode`]: deterministic category ordering and one-hot vectors
//! - [`pipeline`]: per-column roles, configuration, and feature matrix assembly
//!
//! ## Example: ingest → encode
//!
//! ```rust
//! use tabular_features::ingestion::{ingest, IngestionOptions, MemorySource};
//! use tabular_features::processing::{Pipeline, PipelineConfig};
//!
//! # fn main() -> Result<(), tabular_features::EncodingError> {
//! let src = MemorySource::new(
//!     "houses",
//!     "Id,Street,LotArea,SalePrice\n1,Pave,8450,208500\n2,Grvl,9600,181500\n3,Pave,11250,223500\n",
//! );
//! let it = ingest(&src, &IngestionOptions::default())?;
//!
//! let cfg = PipelineConfig::new(vec![false, true, false, false])
//!     .with_identifier("Id")
//!     .with_target("SalePrice");
//! let out = Pipeline::new(&it.table.header, cfg)?.run_indexed(&it)?;
//!
//! assert_eq!(out.header, ["Street_Pave", "LotArea"]);
//! assert_eq!(out.row(1), Some(&[0.0, 9600.0][..]));
//! assert_eq!(out.targets, [208500.0, 181500.0, 223500.0]);
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod impute;
pub mod pipeline;
pub mod stats;

pub use encode::{encode_categorical, CategoryOrdering};
pub use impute::{impute_categorical, is_missing, ImputeScope};
pub use pipeline::{
    ColumnPlan, ColumnRole, ConversionPolicy, EncodedChunk, EncodingPlan, Pipeline, PipelineConfig,
};
pub use stats::{cardinality, column_stats, column_summaries, modes, ColumnStats, ColumnSummary};
