//! Reader/writer backed datasets and partition containers

use crate::data::{
    DataContainer, DataSet, InMemoryFormat, InMemoryFormatName, Partition, Reader, Writer,
};
use anyhow::{Context, Result};

/// Relative sizes of the train, validation and test partitions
///
/// Only constructible through [`SplitFractions::new`] or `Default`, so both
/// fractions are non-negative and sum to at most one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitFractions {
    train: f64,
    validation: f64,
}

impl SplitFractions {
    pub fn new(train: f64, validation: f64) -> Result<Self> {
        if train < 0.0 || validation < 0.0 || train + validation > 1.0 {
            anyhow::bail!(
                "invalid split fractions: train={} validation={} (each >= 0, sum <= 1)",
                train,
                validation
            );
        }
        Ok(Self { train, validation })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn validation(&self) -> f64 {
        self.validation
    }

    /// Fraction left for the test partition
    pub fn test(&self) -> f64 {
        1.0 - self.train - self.validation
    }
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.7,
            validation: 0.15,
        }
    }
}

impl<T: Clone> Partition for Vec<T> {
    fn split(&self, fractions: &SplitFractions) -> [Self; 3] {
        let len = self.len();
        let train_end = (((len as f64) * fractions.train()).floor() as usize).min(len);
        let validation_end =
            (train_end + ((len as f64) * fractions.validation()).floor() as usize).min(len);
        [
            self[..train_end].to_vec(),
            self[train_end..validation_end].to_vec(),
            self[validation_end..].to_vec(),
        ]
    }

    fn combine(parts: [&Self; 3]) -> Self {
        parts.iter().flat_map(|p| p.iter().cloned()).collect()
    }
}

/// Data paired with the reader it came from and the writer that persists it
pub struct BaseDataset<D, R, W> {
    reader: R,
    writer: W,
    source: String,
    data: D,
}

impl<D, R, W> BaseDataset<D, R, W>
where
    R: Reader<D>,
    W: Writer<D>,
{
    pub fn load(reader: R, writer: W, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let data = reader
            .read(&source)
            .with_context(|| format!("Failed to read dataset from {}", source))?;
        Ok(Self {
            reader,
            writer,
            source,
            data,
        })
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Re-read the data from its source
    pub fn reload(&mut self) -> Result<()> {
        self.data = self.reader.read(&self.source)?;
        Ok(())
    }
}

impl<R, W> DataSet for BaseDataset<InMemoryFormat, R, W>
where
    R: Reader<InMemoryFormat>,
    W: Writer<InMemoryFormat>,
{
    fn internal_format(&self) -> InMemoryFormatName {
        self.data.name()
    }

    fn to_format(&self, format: InMemoryFormatName) -> InMemoryFormat {
        self.data.convert(format)
    }

    fn write(&self, target: Option<&str>) -> Result<()> {
        let target = target.unwrap_or(&self.source);
        self.writer
            .write(&self.data, target)
            .with_context(|| format!("Failed to write dataset to {}", target))
    }
}

/// Container holding all three partitions and their union
#[derive(Debug, Clone, PartialEq)]
pub struct Subsets<D> {
    train: D,
    validation: D,
    test: D,
    all: D,
}

impl<D: Partition> Subsets<D> {
    /// Read each partition from its own target
    pub fn from_subsets<R: Reader<D>>(
        reader: &R,
        train_target: &str,
        validation_target: &str,
        test_target: &str,
    ) -> Result<Self> {
        let train = reader.read(train_target)?;
        let validation = reader.read(validation_target)?;
        let test = reader.read(test_target)?;
        let all = D::combine([&train, &validation, &test]);
        Ok(Self {
            train,
            validation,
            test,
            all,
        })
    }

    /// Read one target and partition it
    pub fn from_complete_set<R: Reader<D>>(
        reader: &R,
        target: &str,
        fractions: &SplitFractions,
    ) -> Result<Self> {
        let all = reader.read(target)?;
        let [train, validation, test] = all.split(fractions);
        Ok(Self {
            train,
            validation,
            test,
            all,
        })
    }

    /// Persist each partition to its own target
    pub fn write_subsets<W: Writer<D>>(
        &self,
        writer: &W,
        train_target: &str,
        validation_target: &str,
        test_target: &str,
    ) -> Result<()> {
        writer.write(&self.train, train_target)?;
        writer.write(&self.validation, validation_target)?;
        writer.write(&self.test, test_target)?;
        Ok(())
    }
}

impl<D> DataContainer<D> for Subsets<D> {
    fn train_data(&self) -> &D {
        &self.train
    }

    fn validation_data(&self) -> &D {
        &self.validation
    }

    fn test_data(&self) -> &D {
        &self.test
    }

    fn all_data(&self) -> &D {
        &self.all
    }
}
