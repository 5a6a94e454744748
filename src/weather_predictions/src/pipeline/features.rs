use std::collections::HashMap;

use chrono::Datelike;
use polars::prelude::*;

use crate::pipeline::api::PipelineError;
use crate::pipeline::linalg::{column_to_vector, date_column};

pub const TARGET_COLUMN: &str = "target";

/// Every column `build_features` leaves usable as a predictor.
pub const PREDICTOR_COLUMNS: [&str; 8] = [
    "PRCP",
    "TMAX",
    "TMIN",
    "month_max",
    "month_day_max",
    "max_min",
    "monthly_avg",
    "day_of_year_avg",
];

/// Trailing window for the rolling maximum-temperature mean.
const ROLLING_WINDOW: usize = 30;

/// Derive the predictor columns and the shifted target from a cleaned,
/// date-ordered table. The returned frame drops the final row (its target is
/// tomorrow's reading, which does not exist yet); rolling-warmup nulls are
/// kept and must be excluded before fitting.
///
/// Every statistic here is causal: row t only ever sees rows at or before t.
pub fn build_features(cleaned: &DataFrame) -> Result<DataFrame, PipelineError> {
    let dates = date_column(cleaned)?;
    let tmax = column_to_vector(cleaned, "TMAX")?.iter().copied().collect::<Vec<f64>>();
    let tmin = column_to_vector(cleaned, "TMIN")?.iter().copied().collect::<Vec<f64>>();

    let month_max = rolling_mean(&tmax, ROLLING_WINDOW);
    let month_day_max = ratio(&month_max, &tmax, "month_day_max")?;
    let max_min = ratio(
        &tmax.iter().map(|v| Some(*v)).collect::<Vec<Option<f64>>>(),
        &tmin,
        "max_min",
    )?;
    let month_keys = dates.iter().map(|d| d.month()).collect::<Vec<u32>>();
    let day_keys = dates.iter().map(|d| d.ordinal()).collect::<Vec<u32>>();
    let monthly_avg = expanding_group_mean(&tmax, &month_keys);
    let day_of_year_avg = expanding_group_mean(&tmax, &day_keys);

    let mut target = cleaned.column("TMAX")?.shift(-1);
    target.rename(TARGET_COLUMN);

    let mut frame = cleaned.clone();
    frame.with_column(Series::new("month_max", month_max))?;
    frame.with_column(Series::new("month_day_max", month_day_max))?;
    frame.with_column(Series::new("max_min", max_min))?;
    frame.with_column(Series::new("monthly_avg", monthly_avg))?;
    frame.with_column(Series::new("day_of_year_avg", day_of_year_avg))?;
    frame.with_column(target)?;

    Ok(frame.slice(0, cleaned.height().saturating_sub(1)))
}

/// Mean over a fixed trailing window; null until the window is full.
fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut running_sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        running_sum += value;
        if i + 1 > window {
            running_sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(running_sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Element-wise numerator / denominator. A null numerator stays null; a zero
/// denominator is a hard error, never an infinite sentinel.
fn ratio(
    numerator: &[Option<f64>],
    denominator: &[f64],
    feature: &str,
) -> Result<Vec<Option<f64>>, PipelineError> {
    let mut out = Vec::with_capacity(numerator.len());
    for (row, (numer, denom)) in numerator.iter().zip(denominator.iter()).enumerate() {
        match numer {
            Some(n) => {
                if *denom == 0.0 {
                    return Err(PipelineError::DivisionEdgeCase {
                        feature: feature.to_string(),
                        row,
                    });
                }
                out.push(Some(n / denom));
            }
            None => out.push(None),
        }
    }
    Ok(out)
}

/// Expanding mean per group key: each row averages every observation from
/// the start of the series through itself that shares its key. A single
/// forward pass with running sums keeps this strictly causal.
fn expanding_group_mean(values: &[f64], keys: &[u32]) -> Vec<f64> {
    let mut totals: HashMap<u32, (f64, usize)> = HashMap::new();
    let mut out = Vec::with_capacity(values.len());
    for (value, key) in values.iter().zip(keys.iter()) {
        let entry = totals.entry(*key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
        out.push(entry.0 / entry.1 as f64);
    }
    out
}
