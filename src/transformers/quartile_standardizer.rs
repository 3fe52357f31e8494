use super::{Stateful, Transformer};
use crate::datasets::{DataType, Dataset, Value};
use crate::error::{Error, Result};
use crate::stats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stand-in scale for columns with no spread.
pub const EPSILON: f64 = 1e-8;

/// Removes the median and scales each continuous feature by its interquartile
/// range, the distance between the 25th and 75th percentiles.
///
/// Both statistics are order based, so a handful of outliers barely moves
/// them. Categorical columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuartileStandardizer {
    center: bool,
    medians: Option<BTreeMap<usize, f64>>,
    iqrs: Option<BTreeMap<usize, f64>>,
}

impl Default for QuartileStandardizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl QuartileStandardizer {
    /// `center` selects whether the median is subtracted before scaling.
    pub fn new(center: bool) -> Self {
        QuartileStandardizer {
            center,
            medians: None,
            iqrs: None,
        }
    }

    pub fn center(&self) -> bool {
        self.center
    }

    /// Per-column medians, `None` until fitted.
    pub fn medians(&self) -> Option<&BTreeMap<usize, f64>> {
        self.medians.as_ref()
    }

    /// Per-column interquartile ranges, `None` until fitted. Never zero.
    pub fn iqrs(&self) -> Option<&BTreeMap<usize, f64>> {
        self.iqrs.as_ref()
    }
}

impl Stateful for QuartileStandardizer {
    fn fit(&mut self, dataset: &dyn Dataset) -> Result<()> {
        let columns = dataset.continuous_columns();

        let fitted = columns
            .into_par_iter()
            .map(|(column, values)| -> Result<(usize, f64, f64)> {
                let median = stats::median(&values)?;
                let iqr = stats::iqr(&values)?;
                Ok((column, median, iqr))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut medians = BTreeMap::new();
        let mut iqrs = BTreeMap::new();

        for (column, median, iqr) in fitted {
            // only an exact zero is floored; an infinite spread still scales
            // finite features to finite values
            let iqr = if iqr == 0.0 {
                log::warn!("column {column} has no interquartile spread, scaling by {EPSILON}");
                EPSILON
            } else {
                iqr
            };

            medians.insert(column, median);
            iqrs.insert(column, iqr);
        }

        log::debug!("quartile standardizer fitted on {} continuous columns", iqrs.len());

        self.medians = Some(medians);
        self.iqrs = Some(iqrs);

        Ok(())
    }

    fn fitted(&self) -> bool {
        self.medians.is_some() && self.iqrs.is_some()
    }
}

impl Transformer for QuartileStandardizer {
    fn transform(&self, samples: &mut [Vec<Value>], _labels: Option<&mut [Value]>) -> Result<()> {
        let (Some(medians), Some(iqrs)) = (&self.medians, &self.iqrs) else {
            return Err(Error::NotFitted);
        };

        // validate everything up front so a bad sample leaves the batch untouched
        for sample in samples.iter() {
            for &column in iqrs.keys() {
                match sample.get(column) {
                    Some(Value::Continuous(_)) => {}
                    Some(other) => {
                        return Err(Error::IncompatibleDataType {
                            column,
                            expected: DataType::Continuous,
                            actual: other.data_type(),
                        })
                    }
                    None => {
                        return Err(Error::DimensionMismatch {
                            expected: format!("at least {} columns", column + 1),
                            actual: format!("{} columns", sample.len()),
                        })
                    }
                }
            }
        }

        for sample in samples.iter_mut() {
            for (&column, &iqr) in iqrs {
                if let Some(Value::Continuous(feature)) = sample.get_mut(column) {
                    if self.center {
                        *feature -= medians[&column];
                    }
                    *feature /= iqr;
                }
            }
        }

        Ok(())
    }
}
