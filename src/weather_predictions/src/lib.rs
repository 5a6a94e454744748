pub mod pipeline;

use chrono::NaiveDate;

pub use crate::pipeline::api::{
    CleanSettings, DataSource, EvaluationResult, ImputePolicy, PipelineError, Reporter,
};
pub use crate::pipeline::cleaner::clean_observations;
pub use crate::pipeline::evaluate::{evaluate, mean_absolute_error, walk_forward};
pub use crate::pipeline::features::{build_features, PREDICTOR_COLUMNS, TARGET_COLUMN};
pub use crate::pipeline::loader::CsvSource;
pub use crate::pipeline::model::RidgeModel;
pub use crate::pipeline::report::ConsoleReporter;
pub use crate::pipeline::split::split_at;

/// Composes the whole procedure over any observation source:
/// load, clean, derive features, fit at the boundary, report.
pub struct WeatherPredictor<T: DataSource> {
    source: T,
    settings: CleanSettings,
}

impl<T: DataSource> WeatherPredictor<T> {
    pub fn new(source: T, settings: CleanSettings) -> Self {
        WeatherPredictor { source, settings }
    }

    pub fn run(
        &self,
        predictors: &[&str],
        boundary: NaiveDate,
        alpha: f64,
        reporter: &dyn Reporter,
    ) -> Result<EvaluationResult, PipelineError> {
        let raw = self.source.retrieve_observations()?;
        let cleaned = clean_observations(&raw, self.settings)?;
        reporter.render(&cleaned);

        let features = build_features(&cleaned)?;
        let result = evaluate(predictors, &features, boundary, alpha)?;
        reporter.note(&format!(
            "mean absolute error through {}: {:.4}",
            boundary, result.mean_absolute_error
        ));
        reporter.render(&result.predictions);
        Ok(result)
    }

    /// Walk-forward variant over successive boundaries, pooling the error.
    pub fn run_walk_forward(
        &self,
        predictors: &[&str],
        boundaries: &[NaiveDate],
        alpha: f64,
        reporter: &dyn Reporter,
    ) -> Result<EvaluationResult, PipelineError> {
        let raw = self.source.retrieve_observations()?;
        let cleaned = clean_observations(&raw, self.settings)?;
        let features = build_features(&cleaned)?;
        let result = walk_forward(predictors, &features, boundaries, alpha)?;
        reporter.note(&format!(
            "pooled mean absolute error over {} boundaries: {:.4}",
            boundaries.len(),
            result.mean_absolute_error
        ));
        reporter.render(&result.predictions);
        Ok(result)
    }
}
