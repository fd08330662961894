//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest`] or [`ingest_from_path`] (from [`unified`]) which:
//!
//! - read delimited text from an injected [`TableSource`]
//! - validate that every row matches the header's field count
//! - build one value index per column in the same pass
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Lower-level pieces are available under [`csv`] and [`index`].

pub mod csv;
pub mod index;
pub mod observability;
pub mod unified;

pub use index::{build_table_index, ValueIndexer};
pub use observability::{
    FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use unified::{ingest, ingest_from_path, FnSource, IngestionOptions, MemorySource, PathSource, TableSource};
