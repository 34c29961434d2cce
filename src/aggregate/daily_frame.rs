//! Contains the `DailyClimateFrame` structure for lazy operations on a daily climate series.

use crate::aggregate::monthly::MonthlyAggregates;
use crate::climate::error::ClimateDataError;
use crate::climate::series_fetcher::DailyClimateSeries;
use crate::types::climate::{ClimateSample, Variable};
use chrono::Datelike;
use polars::prelude::*;

/// A wrapper around a Polars `LazyFrame` holding one row per day.
///
/// Columns: `date` (`YYYY-MM-DD` string), `year` and `month` (`i32`, derived
/// from the row's own date), `prec` and `temp` (`f64`, null when missing).
#[derive(Clone)]
pub struct DailyClimateFrame {
    /// The underlying Polars LazyFrame containing the daily data.
    pub frame: LazyFrame,
}

impl DailyClimateFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Builds the frame from samples, keeping their order.
    pub fn from_samples(samples: &[ClimateSample]) -> Result<Self, ClimateDataError> {
        let dates: Vec<String> = samples.iter().map(|s| s.date.to_string()).collect();
        let years: Vec<i32> = samples.iter().map(|s| s.date.year()).collect();
        let months: Vec<i32> = samples.iter().map(|s| s.date.month() as i32).collect();
        let prec: Vec<Option<f64>> = samples
            .iter()
            .map(|s| Variable::Precipitation.value(s))
            .collect();
        let temp: Vec<Option<f64>> = samples
            .iter()
            .map(|s| Variable::Temperature.value(s))
            .collect();

        let df = df!(
            "date" => dates,
            "year" => years,
            "month" => months,
            Variable::Precipitation.column() => prec,
            Variable::Temperature.column() => temp,
        )?;
        Ok(Self::new(df.lazy()))
    }

    /// Filters the rows based on a Polars predicate expression.
    pub fn filter(&self, predicate: Expr) -> DailyClimateFrame {
        DailyClimateFrame::new(self.frame.clone().filter(predicate))
    }

    /// Restricts the frame to a single (year, month).
    pub fn for_month(&self, year: i32, month: u32) -> DailyClimateFrame {
        self.filter(
            col("year")
                .eq(lit(year))
                .and(col("month").eq(lit(month as i32))),
        )
    }

    /// Groups by (year, month) and computes sum, mean, sample standard
    /// deviation and observation count of each variable.
    ///
    /// Groups are sorted chronologically. Null values are skipped per column,
    /// so a month with fewer observed days simply averages over what exists.
    pub fn monthly_aggregates(&self) -> Result<MonthlyAggregates, ClimateDataError> {
        let mut aggregations = Vec::with_capacity(8);
        for variable in Variable::ALL {
            let name = variable.column();
            aggregations.push(col(name).sum().alias(format!("{name}_sum")));
            aggregations.push(col(name).mean().alias(format!("{name}_mean")));
            aggregations.push(col(name).std(1).alias(format!("{name}_std")));
            aggregations.push(
                col(name)
                    .count()
                    .cast(DataType::UInt32)
                    .alias(format!("{name}_count")),
            );
        }

        let grouped = self
            .frame
            .clone()
            .group_by([col("year"), col("month")])
            .agg(aggregations)
            .sort(["year", "month"], SortMultipleOptions::default())
            .collect()?;

        MonthlyAggregates::from_grouped(&grouped)
    }

    pub fn collect(&self) -> Result<DataFrame, ClimateDataError> {
        Ok(self.frame.clone().collect()?)
    }
}

impl DailyClimateSeries {
    /// The series as a [`DailyClimateFrame`].
    pub fn frame(&self) -> Result<DailyClimateFrame, ClimateDataError> {
        DailyClimateFrame::from_samples(&self.samples)
    }

    /// Per (year, month) statistics of the series.
    pub fn monthly(&self) -> Result<MonthlyAggregates, ClimateDataError> {
        self.frame()?.monthly_aggregates()
    }
}
