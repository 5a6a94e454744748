use chrono::NaiveDate;
use nalgebra::DVector;
use polars::prelude::*;

use crate::pipeline::api::{EvaluationResult, PipelineError};
use crate::pipeline::features::TARGET_COLUMN;
use crate::pipeline::linalg::{column_to_vector, date_column, frame_to_matrix, predictions_to_frame};
use crate::pipeline::model::RidgeModel;
use crate::pipeline::split::split_at;

/// Fit on rows dated on or before the boundary, predict everything after,
/// and score with mean absolute error. Rows with a null in any predictor or
/// the target (rolling warmup, for one) are excluded before splitting;
/// anything non-finite that survives is rejected rather than handed to the
/// solver.
pub fn evaluate(
    predictors: &[&str],
    table: &DataFrame,
    boundary: NaiveDate,
    alpha: f64,
) -> Result<EvaluationResult, PipelineError> {
    let complete = complete_rows(predictors, table)?;
    let (train, test) = split_at(&complete, boundary)?;
    if test.height() == 0 {
        return Err(PipelineError::Validation(format!(
            "no rows after the {} boundary to test on",
            boundary
        )));
    }

    let (model, test_dates, actual, predicted) = fit_window(predictors, &train, &test, alpha)?;

    let error = mean_absolute_error(&actual, &predicted);
    let predictions = predictions_to_frame(&test_dates, &actual, &predicted)?;
    Ok(EvaluationResult::new(
        error,
        predictions,
        predictors,
        model.weights().ok_or_else(|| {
            PipelineError::ModelFit("fit produced no weights".to_string())
        })?,
        model.intercept().unwrap_or(0.0),
    ))
}

/// Walk-forward evaluation over successive boundaries: for each boundary,
/// fit on everything through it and predict only the span up to the next
/// one, so no prediction ever comes from a model that saw its own future.
/// The pooled error covers every predicted row; the reported coefficients
/// are the most recent window's.
pub fn walk_forward(
    predictors: &[&str],
    table: &DataFrame,
    boundaries: &[NaiveDate],
    alpha: f64,
) -> Result<EvaluationResult, PipelineError> {
    if boundaries.is_empty() {
        return Err(PipelineError::Validation(
            "walk-forward needs at least one boundary".to_string(),
        ));
    }
    for pair in boundaries.windows(2) {
        if pair[1] <= pair[0] {
            return Err(PipelineError::Validation(
                "walk-forward boundaries must be strictly increasing".to_string(),
            ));
        }
    }

    let complete = complete_rows(predictors, table)?;

    let mut pooled: Option<DataFrame> = None;
    let mut absolute_errors: Vec<f64> = Vec::new();
    let mut last_fit: Option<RidgeModel> = None;

    for (i, boundary) in boundaries.iter().enumerate() {
        let (train, rest) = split_at(&complete, *boundary)?;
        let window = match boundaries.get(i + 1) {
            Some(next) => {
                let rest_dates = date_column(&rest)?;
                let mask = rest_dates
                    .iter()
                    .map(|d| Some(*d <= *next))
                    .collect::<BooleanChunked>();
                rest.filter(&mask)?
            }
            None => rest,
        };
        if window.height() == 0 {
            continue;
        }

        let (model, dates, actual, predicted) = fit_window(predictors, &train, &window, alpha)?;
        for (a, p) in actual.iter().zip(predicted.iter()) {
            absolute_errors.push((a - p).abs());
        }
        let frame = predictions_to_frame(&dates, &actual, &predicted)?;
        pooled = match pooled {
            Some(mut acc) => {
                acc.vstack_mut(&frame)?;
                Some(acc)
            }
            None => Some(frame),
        };
        last_fit = Some(model);
    }

    let predictions = pooled.ok_or_else(|| {
        PipelineError::Validation("no rows fell after any walk-forward boundary".to_string())
    })?;
    let model = last_fit.ok_or_else(|| {
        PipelineError::ModelFit("walk-forward fitted no model".to_string())
    })?;
    let error = absolute_errors.iter().sum::<f64>() / absolute_errors.len() as f64;
    Ok(EvaluationResult::new(
        error,
        predictions,
        predictors,
        model.weights().ok_or_else(|| {
            PipelineError::ModelFit("fit produced no weights".to_string())
        })?,
        model.intercept().unwrap_or(0.0),
    ))
}

/// Average of |actual - predicted|. Kept distinct from any binding holding
/// its computed value.
pub fn mean_absolute_error(actual: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n
}

/// Exclude incomplete rows, then insist everything left is finite.
fn complete_rows(predictors: &[&str], table: &DataFrame) -> Result<DataFrame, PipelineError> {
    let mut subset = predictors.iter().map(|c| c.to_string()).collect::<Vec<String>>();
    subset.push(TARGET_COLUMN.to_string());
    let complete = table.drop_nulls(Some(&subset[..]))?;
    validate_finite(&complete, &subset)?;
    Ok(complete)
}

fn validate_finite(frame: &DataFrame, columns: &[String]) -> Result<(), PipelineError> {
    for column in columns {
        let chunked = frame.column(column)?.f64()?;
        for (row, value) in chunked.into_iter().enumerate() {
            match value {
                Some(v) if v.is_finite() => {}
                Some(v) => {
                    return Err(PipelineError::Validation(format!(
                        "non-finite value {} in column {} at row {}",
                        v, column, row
                    )))
                }
                None => {
                    return Err(PipelineError::Validation(format!(
                        "null value in column {} at row {}",
                        column, row
                    )))
                }
            }
        }
    }
    Ok(())
}

fn fit_window(
    predictors: &[&str],
    train: &DataFrame,
    test: &DataFrame,
    alpha: f64,
) -> Result<(RidgeModel, Vec<NaiveDate>, DVector<f64>, DVector<f64>), PipelineError> {
    if train.height() == 0 {
        return Err(PipelineError::Validation(
            "no rows on or before the boundary to train on".to_string(),
        ));
    }

    let train_design = frame_to_matrix(train, predictors)?;
    let train_target = column_to_vector(train, TARGET_COLUMN)?;
    let mut model = RidgeModel::new(alpha)?;
    model.fit(&train_design, &train_target)?;

    let test_design = frame_to_matrix(test, predictors)?;
    let actual = column_to_vector(test, TARGET_COLUMN)?;
    let predicted = model.predict(&test_design)?;
    let test_dates = date_column(test)?;
    Ok((model, test_dates, actual, predicted))
}
