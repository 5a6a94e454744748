use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::pipeline::api::{DataSource, PipelineError};

const REQUIRED_COLUMNS: [&str; 6] = ["DATE", "PRCP", "SNOW", "SNWD", "TMAX", "TMIN"];
const NUMERIC_COLUMNS: [&str; 5] = ["PRCP", "SNOW", "SNWD", "TMAX", "TMIN"];

/// Reads the daily observation file: a headered CSV with a DATE column and
/// the NOAA measurement columns. One-shot; either the whole file loads or
/// the error says which part of the format was wrong.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for CsvSource {
    fn retrieve_observations(&self) -> Result<DataFrame, PipelineError> {
        let mut frame = CsvReader::from_path(&self.path)?
            .has_header(true)
            .with_try_parse_dates(true)
            .finish()?;

        for column in REQUIRED_COLUMNS.iter() {
            if frame.column(column).is_err() {
                return Err(PipelineError::InputFormat(format!(
                    "{} is missing required column {}",
                    self.path.display(),
                    column
                )));
            }
        }
        if frame.column("DATE")?.dtype() != &DataType::Date {
            return Err(PipelineError::InputFormat(format!(
                "DATE column of {} did not parse as a calendar date",
                self.path.display()
            )));
        }
        for column in NUMERIC_COLUMNS.iter() {
            let as_float = frame.column(column)?.cast(&DataType::Float64)?;
            frame.with_column(as_float)?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod test_loader {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_a_well_formed_file() {
        let path = write_temp_csv(
            "weather_predictions_loader_ok.csv",
            "DATE,PRCP,SNOW,SNWD,TMAX,TMIN\n\
             2024-01-01,0.0,0.0,0.0,50,30\n\
             2024-01-02,0.1,0.0,0.0,52,31\n",
        );
        let frame = CsvSource::new(&path).retrieve_observations().unwrap();
        assert_eq!(frame.shape(), (2, 6));
        assert_eq!(frame.column("DATE").unwrap().dtype(), &DataType::Date);
        // Integer temperatures come back as floats for the numeric pipeline.
        assert_eq!(frame.column("TMAX").unwrap().dtype(), &DataType::Float64);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_column_is_an_input_format_error() {
        let path = write_temp_csv(
            "weather_predictions_loader_missing.csv",
            "DATE,PRCP,TMAX,TMIN\n2024-01-01,0.0,50,30\n",
        );
        let result = CsvSource::new(&path).retrieve_observations();
        assert!(matches!(result, Err(PipelineError::InputFormat(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unparsable_dates_are_an_input_format_error() {
        let path = write_temp_csv(
            "weather_predictions_loader_baddate.csv",
            "DATE,PRCP,SNOW,SNWD,TMAX,TMIN\nnot-a-date,0.0,0.0,0.0,50,30\n",
        );
        let result = CsvSource::new(&path).retrieve_observations();
        assert!(matches!(result, Err(PipelineError::InputFormat(_))));
        std::fs::remove_file(path).ok();
    }
}
