//! Error types shared by the layers, statistics and transformers.

use crate::datasets::DataType;

/// Errors raised at the point of misuse. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `back` was called without an unconsumed `forward` result.
    #[error("must perform forward pass before backpropagating")]
    NotReady,

    /// `transform` was called before `fit`.
    #[error("transformer has not been fitted")]
    NotFitted,

    /// A statistic was requested over an empty sequence.
    #[error("cannot compute statistics of empty data")]
    EmptyData,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("column {column} holds {actual} data but {expected} was expected")]
    IncompatibleDataType {
        column: usize,
        expected: DataType,
        actual: DataType,
    },

    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        param: String,
        value: String,
        constraint: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_describe_the_misuse() {
        assert!(Error::NotReady.to_string().contains("forward pass"));
        assert!(Error::NotFitted.to_string().contains("not been fitted"));

        let err = Error::IncompatibleDataType {
            column: 2,
            expected: DataType::Continuous,
            actual: DataType::Categorical,
        };
        assert_eq!(
            err.to_string(),
            "column 2 holds categorical data but continuous was expected"
        );
    }
}
