use chrono::NaiveDate;
use polars::prelude::*;

use crate::pipeline::api::PipelineError;
use crate::pipeline::linalg::date_column;

/// Partition at an inclusive boundary: train takes every row dated on or
/// before it, test everything after, both in date order.
pub fn split_at(
    frame: &DataFrame,
    boundary: NaiveDate,
) -> Result<(DataFrame, DataFrame), PipelineError> {
    let dates = date_column(frame)?;
    validate_ordering(&dates)?;

    let mask = dates
        .iter()
        .map(|d| Some(*d <= boundary))
        .collect::<BooleanChunked>();
    let train = frame.filter(&mask)?;
    let test = frame.filter(&!&mask)?;
    Ok((train, test))
}

/// Duplicate or out-of-order dates make the split ill-defined, so they are
/// rejected up front rather than left to produce a silently wrong partition.
fn validate_ordering(dates: &[NaiveDate]) -> Result<(), PipelineError> {
    for (row, pair) in dates.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(PipelineError::Validation(format!(
                "DATE must be strictly increasing: row {} ({}) then row {} ({})",
                row,
                pair[0],
                row + 1,
                pair[1]
            )));
        }
    }
    Ok(())
}
