use nalgebra::DVector;
use polars::prelude::*;
use thiserror::Error;

/// Every way the pipeline can fail, as a distinct named variant so a caller
/// can decide whether to drop rows, impute differently, or abort.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("column {column} still has a missing value at row {row} after imputation")]
    MissingData { column: String, row: usize },

    #[error("zero denominator computing {feature} at row {row}")]
    DivisionEdgeCase { feature: String, row: usize },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("input format error: {0}")]
    InputFormat(String),

    #[error("model fit failed: {0}")]
    ModelFit(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// How missing temperature readings are repaired after sentinel
/// normalization. Precipitation is always zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImputePolicy {
    /// Copy the most recent prior non-missing value. Errors if the first
    /// row is missing, since there is nothing to copy from.
    Forward,
    /// Replace missing readings with 0.0.
    Zero,
    /// Drop any row with a missing temperature reading.
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub struct CleanSettings {
    pub temperature_policy: ImputePolicy,
}

impl Default for CleanSettings {
    fn default() -> Self {
        CleanSettings {
            temperature_policy: ImputePolicy::Forward,
        }
    }
}

/// Source of raw daily observations. Production code reads a CSV; tests
/// hand back in-memory frames.
pub trait DataSource {
    fn retrieve_observations(&self) -> Result<DataFrame, PipelineError>;
}

/// Sink for tables and progress notes. The original workflow printed
/// intermediate frames and rendered line charts; both collapse to `render`.
pub trait Reporter {
    fn render(&self, table: &DataFrame);
    fn note(&self, message: &str);
}

/// Output of one evaluation: the error metric, the paired predictions over
/// the test dates, and the fitted model description.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub mean_absolute_error: f64,
    /// Columns: DATE, actual, predicted, in test date order.
    pub predictions: DataFrame,
    /// Weights paired with the predictor column they apply to.
    pub coefficients: Vec<(String, f64)>,
    pub intercept: f64,
}

impl EvaluationResult {
    pub fn new(
        mean_absolute_error: f64,
        predictions: DataFrame,
        names: &[&str],
        weights: &DVector<f64>,
        intercept: f64,
    ) -> Self {
        let coefficients = names
            .iter()
            .zip(weights.iter())
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect();
        EvaluationResult {
            mean_absolute_error,
            predictions,
            coefficients,
            intercept,
        }
    }
}
