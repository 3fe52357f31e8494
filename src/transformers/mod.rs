//! Feature transformers that rewrite samples in place.

pub mod quartile_standardizer;

use crate::datasets::{Dataset, Unlabeled, Value};
use crate::error::Result;

pub use quartile_standardizer::QuartileStandardizer;

pub trait Transformer {
    /// Transform `samples` in place. Labels are handed along for
    /// transformers that need them.
    fn transform(&self, samples: &mut [Vec<Value>], labels: Option<&mut [Value]>) -> Result<()>;
}

/// Transformers that learn their parameters from a dataset first.
pub trait Stateful: Transformer {
    fn fit(&mut self, dataset: &dyn Dataset) -> Result<()>;

    fn fitted(&self) -> bool;

    /// Fit to the samples and transform them in one go.
    fn fit_transform(
        &mut self,
        samples: &mut [Vec<Value>],
        labels: Option<&mut [Value]>,
    ) -> Result<()> {
        let dataset = Unlabeled::new(samples.to_vec())?;
        self.fit(&dataset)?;
        self.transform(samples, labels)
    }
}
