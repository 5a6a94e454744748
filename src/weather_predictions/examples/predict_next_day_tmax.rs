//! End-to-end run over a local `data.csv`: clean the daily observations,
//! derive the rolling/expanding features, fit ridge regression through the
//! end of 2020, then walk forward over later year ends.

use chrono::NaiveDate;
use weather_predictions::{
    CleanSettings, ConsoleReporter, CsvSource, PipelineError, WeatherPredictor, PREDICTOR_COLUMNS,
};

fn main() -> Result<(), PipelineError> {
    let reporter = ConsoleReporter;
    let predictor = WeatherPredictor::new(CsvSource::new("data.csv"), CleanSettings::default());

    let boundary = NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid calendar date");
    let result = predictor.run(&PREDICTOR_COLUMNS, boundary, 0.1, &reporter)?;
    for (name, weight) in &result.coefficients {
        println!("{:>16}: {:+.4}", name, weight);
    }
    println!("{:>16}: {:+.4}", "intercept", result.intercept);

    let year_ends = [
        NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid calendar date"),
        NaiveDate::from_ymd_opt(2021, 12, 31).expect("valid calendar date"),
        NaiveDate::from_ymd_opt(2022, 12, 31).expect("valid calendar date"),
    ];
    predictor.run_walk_forward(&PREDICTOR_COLUMNS, &year_ends, 0.1, &reporter)?;
    Ok(())
}
