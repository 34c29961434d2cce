use crate::fetch::FetchError;
use crate::types::climate::{LonLat, Variable};
use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

/// Hard failures of the climate series fetcher and of the aggregation step.
#[derive(Debug, Error)]
pub enum ClimateDataError {
    #[error("Coordinate {0} is outside the valid longitude/latitude range")]
    InvalidCoordinate(LonLat),

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse climate payload from {url}")]
    PayloadParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Climate payload has no series for {0}")]
    MissingVariable(Variable),

    #[error("Climate payload has an invalid date key '{0}'")]
    InvalidDateKey(String),

    #[error("Series for {variable} has {found} days, expected {expected}")]
    IncompleteSeries {
        variable: Variable,
        expected: usize,
        found: usize,
    },

    #[error("Series for {variable} does not cover {date}")]
    MissingDay { variable: Variable, date: NaiveDate },

    #[error("Failed processing climate DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
