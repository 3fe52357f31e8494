// src/datasets.rs
//! Typed, row-major sample storage with columnar access by data type.

use crate::error::{Error, Result};
use crate::transformers::Transformer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Continuous,
    Categorical,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Continuous => write!(f, "continuous"),
            DataType::Categorical => write!(f, "categorical"),
        }
    }
}

/// A single feature or label value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Continuous(f64),
    Categorical(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Continuous(_) => DataType::Continuous,
            Value::Categorical(_) => DataType::Categorical,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Continuous(x) => Some(*x),
            Value::Categorical(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Continuous(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Categorical(s)
    }
}

/// Columnar view over a table of samples.
pub trait Dataset {
    fn samples(&self) -> &[Vec<Value>];

    fn num_samples(&self) -> usize {
        self.samples().len()
    }

    fn num_columns(&self) -> usize {
        self.samples().first().map_or(0, Vec::len)
    }

    fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }

    /// Type of a column, taken from the first sample. Rows are validated on
    /// construction so every row agrees.
    fn column_type(&self, column: usize) -> Option<DataType> {
        self.samples()
            .first()
            .and_then(|row| row.get(column))
            .map(Value::data_type)
    }

    fn column(&self, column: usize) -> Vec<Value> {
        self.samples()
            .iter()
            .filter_map(|row| row.get(column).cloned())
            .collect()
    }

    /// Every column of the given type, keyed by column index.
    fn columns_by_type(&self, kind: DataType) -> BTreeMap<usize, Vec<Value>> {
        (0..self.num_columns())
            .filter(|&c| self.column_type(c) == Some(kind))
            .map(|c| (c, self.column(c)))
            .collect()
    }

    /// The continuous columns as plain floats.
    fn continuous_columns(&self) -> BTreeMap<usize, Vec<f64>> {
        self.columns_by_type(DataType::Continuous)
            .into_iter()
            .map(|(c, values)| (c, values.iter().filter_map(Value::as_f64).collect()))
            .collect()
    }
}

fn check_samples(samples: &[Vec<Value>]) -> Result<()> {
    let Some(first) = samples.first() else {
        return Ok(());
    };

    for row in samples {
        if row.len() != first.len() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} columns", first.len()),
                actual: format!("{} columns", row.len()),
            });
        }

        for (column, (value, reference)) in row.iter().zip(first).enumerate() {
            if value.data_type() != reference.data_type() {
                return Err(Error::IncompatibleDataType {
                    column,
                    expected: reference.data_type(),
                    actual: value.data_type(),
                });
            }
        }
    }

    Ok(())
}

/// Samples without targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unlabeled {
    samples: Vec<Vec<Value>>,
}

impl Unlabeled {
    pub fn new(samples: Vec<Vec<Value>>) -> Result<Self> {
        check_samples(&samples)?;
        Ok(Unlabeled { samples })
    }

    /// Build from purely continuous rows.
    pub fn from_floats(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Value::Continuous).collect())
                .collect(),
        )
    }

    /// Transform the samples in place.
    pub fn apply(&mut self, transformer: &dyn Transformer) -> Result<()> {
        transformer.transform(&mut self.samples, None)
    }
}

impl Dataset for Unlabeled {
    fn samples(&self) -> &[Vec<Value>] {
        &self.samples
    }
}

/// Samples paired one-to-one with labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Labeled {
    samples: Vec<Vec<Value>>,
    labels: Vec<Value>,
}

impl Labeled {
    pub fn new(samples: Vec<Vec<Value>>, labels: Vec<Value>) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} labels", samples.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        check_samples(&samples)?;
        Ok(Labeled { samples, labels })
    }

    pub fn labels(&self) -> &[Value] {
        &self.labels
    }

    /// Transform the samples in place, handing the labels along.
    pub fn apply(&mut self, transformer: &dyn Transformer) -> Result<()> {
        transformer.transform(&mut self.samples, Some(self.labels.as_mut_slice()))
    }
}

impl Dataset for Labeled {
    fn samples(&self) -> &[Vec<Value>] {
        &self.samples
    }
}
