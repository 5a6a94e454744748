use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;

use crate::pipeline::api::PipelineError;

/// Extract the named columns as an (n_rows x n_cols) matrix. Nulls must
/// already have been excluded; any remaining one is a validation failure.
pub fn frame_to_matrix(frame: &DataFrame, columns: &[&str]) -> Result<DMatrix<f64>, PipelineError> {
    let selected = frame.select(columns.to_vec())?;
    let array: ndarray::Array2<f64> = selected.to_ndarray::<Float64Type>(IndexOrder::Fortran)?;
    let (nrows, ncols) = array.dim();
    Ok(DMatrix::from_row_iterator(nrows, ncols, array.into_iter()))
}

/// Extract a single column as a dense vector, rejecting nulls.
pub fn column_to_vector(frame: &DataFrame, column: &str) -> Result<DVector<f64>, PipelineError> {
    let chunked = frame.column(column)?.f64()?;
    let mut values = Vec::with_capacity(chunked.len());
    for (row, value) in chunked.into_iter().enumerate() {
        match value {
            Some(v) => values.push(v),
            None => {
                return Err(PipelineError::Validation(format!(
                    "null value in column {} at row {}",
                    column, row
                )))
            }
        }
    }
    Ok(DVector::from_vec(values))
}

/// Read the DATE column out as calendar dates. A non-date DATE column is an
/// input format problem, not a validation one.
pub fn date_column(frame: &DataFrame) -> Result<Vec<NaiveDate>, PipelineError> {
    let column = frame.column("DATE")?;
    let dates = column
        .date()
        .map_err(|_| PipelineError::InputFormat("DATE column is not a date type".to_string()))?;
    let mut out = Vec::with_capacity(dates.len());
    for (row, date) in dates.as_date_iter().enumerate() {
        match date {
            Some(d) => out.push(d),
            None => {
                return Err(PipelineError::InputFormat(format!(
                    "DATE is null at row {}",
                    row
                )))
            }
        }
    }
    Ok(out)
}

/// Assemble the (DATE, actual, predicted) result frame in test date order.
pub fn predictions_to_frame(
    dates: &[NaiveDate],
    actual: &DVector<f64>,
    predicted: &DVector<f64>,
) -> Result<DataFrame, PipelineError> {
    let date_series = DateChunked::from_naive_date("DATE", dates.iter().copied()).into_series();
    let frame = DataFrame::new(vec![
        date_series,
        Series::new("actual", actual.iter().copied().collect::<Vec<f64>>()),
        Series::new("predicted", predicted.iter().copied().collect::<Vec<f64>>()),
    ])?;
    Ok(frame)
}

#[cfg(test)]
mod test_linalg {
    use super::*;

    #[test]
    fn frame_converts_in_row_order() {
        let frame = df!(
            "a" => &[1.0, 2.0],
            "b" => &[3.0, 4.0]
        )
        .unwrap();
        let matrix = frame_to_matrix(&frame, &["a", "b"]).unwrap();
        assert_eq!(matrix, DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 2.0, 4.0]));
    }

    #[test]
    fn column_with_null_is_rejected() {
        let frame = df!("a" => &[Some(1.0), None]).unwrap();
        let result = column_to_vector(&frame, "a");
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn predictions_frame_round_trips() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ];
        let actual = DVector::from_vec(vec![10.0, 12.0]);
        let predicted = DVector::from_vec(vec![9.5, 12.5]);
        let frame = predictions_to_frame(&dates, &actual, &predicted).unwrap();
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(date_column(&frame).unwrap(), dates);
    }
}
