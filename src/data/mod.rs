//! Dataset contracts
//!
//! Steps that move data around implement these; the orchestration core never
//! depends on a concrete adapter.

pub mod dataset;
pub mod format;

use anyhow::Result;

pub use dataset::{BaseDataset, SplitFractions, Subsets};
pub use format::{InMemoryFormat, InMemoryFormatName, Row};

/// Loads data of type `D` from a target (path, URI, table name...)
pub trait Reader<D>: Send + Sync {
    fn read(&self, target: &str) -> Result<D>;
}

/// Persists data of type `D` to a target
pub trait Writer<D>: Send + Sync {
    fn write(&self, data: &D, target: &str) -> Result<()>;
}

/// Data held in memory that knows how to persist itself
pub trait DataSet {
    /// Layout the data is stored in
    fn internal_format(&self) -> InMemoryFormatName;

    /// A copy of the data in the requested layout
    fn to_format(&self, format: InMemoryFormatName) -> InMemoryFormat;

    /// Persist to `target`, or to where the data was loaded from when `None`
    fn write(&self, target: Option<&str>) -> Result<()>;
}

/// Train/validation/test partitions of one dataset
pub trait DataContainer<D> {
    fn train_data(&self) -> &D;
    fn validation_data(&self) -> &D;
    fn test_data(&self) -> &D;
    fn all_data(&self) -> &D;
}

/// Data that can be split into partitions and joined back together
pub trait Partition: Sized {
    fn split(&self, fractions: &SplitFractions) -> [Self; 3];
    fn combine(parts: [&Self; 3]) -> Self;
}
