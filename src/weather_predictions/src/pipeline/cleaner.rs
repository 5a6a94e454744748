use polars::prelude::*;

use crate::pipeline::api::{CleanSettings, ImputePolicy, PipelineError};

/// Temperature readings use 9999 as an in-band missing marker. It has to
/// become a real null before any fill step runs.
const MISSING_SENTINEL: f64 = 9999.0;

const CORE_COLUMNS: [&str; 4] = ["DATE", "PRCP", "TMAX", "TMIN"];
const TEMPERATURE_COLUMNS: [&str; 2] = ["TMAX", "TMIN"];

/// Reduce the raw observation table to the core columns and repair missing
/// values. Snowfall and snow depth are mostly empty upstream and are dropped
/// outright instead of imputed. Returns a new frame; the input is untouched.
pub fn clean_observations(
    raw: &DataFrame,
    settings: CleanSettings,
) -> Result<DataFrame, PipelineError> {
    for required in CORE_COLUMNS.iter() {
        if raw.column(required).is_err() {
            return Err(PipelineError::InputFormat(format!(
                "required column {} is missing",
                required
            )));
        }
    }

    let mut core = raw.select(CORE_COLUMNS.to_vec())?;

    for column in TEMPERATURE_COLUMNS.iter() {
        let normalized = sentinel_to_null(core.column(column)?)?;
        core.with_column(normalized)?;
    }

    let precipitation = core.column("PRCP")?.fill_null(FillNullStrategy::Zero)?;
    core.with_column(precipitation)?;

    match settings.temperature_policy {
        ImputePolicy::Forward => {
            for column in TEMPERATURE_COLUMNS.iter() {
                let filled = core
                    .column(column)?
                    .fill_null(FillNullStrategy::Forward(None))?;
                if let Some(row) = first_null_row(&filled)? {
                    return Err(PipelineError::MissingData {
                        column: column.to_string(),
                        row,
                    });
                }
                core.with_column(filled)?;
            }
        }
        ImputePolicy::Zero => {
            for column in TEMPERATURE_COLUMNS.iter() {
                let filled = core.column(column)?.fill_null(FillNullStrategy::Zero)?;
                core.with_column(filled)?;
            }
        }
        ImputePolicy::Drop => {
            core = core.drop_nulls(Some(&TEMPERATURE_COLUMNS[..]))?;
        }
    }

    Ok(core)
}

fn sentinel_to_null(series: &Series) -> Result<Series, PipelineError> {
    let values = series
        .f64()?
        .into_iter()
        .map(|value| match value {
            Some(v) if (v - MISSING_SENTINEL).abs() < f64::EPSILON => None,
            other => other,
        })
        .collect::<Vec<Option<f64>>>();
    Ok(Series::new(series.name(), values))
}

fn first_null_row(series: &Series) -> Result<Option<usize>, PipelineError> {
    for (row, value) in series.f64()?.into_iter().enumerate() {
        if value.is_none() {
            return Ok(Some(row));
        }
    }
    Ok(None)
}
