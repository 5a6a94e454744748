use polars::prelude::*;

use crate::pipeline::api::Reporter;

/// Prints tables and notes to stdout. Stands in for both the text sink and
/// the chart sinks of the original workflow.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn render(&self, table: &DataFrame) {
        println!("{}", table);
    }

    fn note(&self, message: &str) {
        println!("{}", message);
    }
}
