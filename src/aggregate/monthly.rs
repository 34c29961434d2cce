//! Monthly statistics derived from a daily climate series.

use crate::climate::error::ClimateDataError;
use crate::types::climate::Variable;
use crate::types::period::Month;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Statistics of one variable over one (year, month) group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    /// Number of observed (non-missing) days in the group.
    pub count: u32,
    /// Sum of the observed values, `0.0` when nothing was observed.
    pub sum: f64,
    pub mean: Option<f64>,
    /// Sample (n-1) standard deviation; `None` with fewer than two observations.
    pub std_dev: Option<f64>,
}

/// All statistics for one (year, month).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRecord {
    pub key: Month,
    pub precipitation: FieldStats,
    pub temperature: FieldStats,
}

impl AggregateRecord {
    pub fn field(&self, variable: Variable) -> &FieldStats {
        match variable {
            Variable::Precipitation => &self.precipitation,
            Variable::Temperature => &self.temperature,
        }
    }
}

/// Which statistic a view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Sum,
    Mean,
    StdDev,
}

impl Statistic {
    fn pick(self, stats: &FieldStats) -> Option<f64> {
        match self {
            Statistic::Sum => Some(stats.sum),
            Statistic::Mean => stats.mean,
            Statistic::StdDev => stats.std_dev,
        }
    }
}

/// One row of a view: a statistic of both variables for one (year, month).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyValue {
    pub key: Month,
    pub precipitation: Option<f64>,
    pub temperature: Option<f64>,
}

/// Per (year, month) statistics, sorted chronologically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyAggregates {
    records: Vec<AggregateRecord>,
}

impl MonthlyAggregates {
    /// Reads the output of the grouped aggregation.
    pub(crate) fn from_grouped(df: &DataFrame) -> Result<Self, ClimateDataError> {
        let years = df.column("year")?.i32()?;
        let months = df.column("month")?.i32()?;

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let (Some(year), Some(month)) = (years.get(idx), months.get(idx)) else {
                continue;
            };
            records.push(AggregateRecord {
                key: Month(year, month as u32),
                precipitation: field_stats(df, Variable::Precipitation, idx)?,
                temperature: field_stats(df, Variable::Temperature, idx)?,
            });
        }
        records.sort_by_key(|r| r.key);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn get(&self, year: i32, month: u32) -> Option<&AggregateRecord> {
        self.records.iter().find(|r| r.key == Month(year, month))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.key.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn view(&self, statistic: Statistic) -> Vec<MonthlyValue> {
        self.records
            .iter()
            .map(|r| MonthlyValue {
                key: r.key,
                precipitation: statistic.pick(&r.precipitation),
                temperature: statistic.pick(&r.temperature),
            })
            .collect()
    }

    pub fn sums(&self) -> Vec<MonthlyValue> {
        self.view(Statistic::Sum)
    }

    pub fn means(&self) -> Vec<MonthlyValue> {
        self.view(Statistic::Mean)
    }

    pub fn std_devs(&self) -> Vec<MonthlyValue> {
        self.view(Statistic::StdDev)
    }

    /// Pivots one statistic of one variable into a month × year table.
    ///
    /// The result has a `month` column (1 to 12) and one column per year, named
    /// after the year, with nulls where that month has no data.
    pub fn wide_by_year(
        &self,
        variable: Variable,
        statistic: Statistic,
    ) -> Result<DataFrame, PolarsError> {
        let mut columns = Vec::with_capacity(self.years().len() + 1);
        columns.push(Column::new("month".into(), (1..=12).collect::<Vec<i32>>()));

        for year in self.years() {
            let values: Vec<Option<f64>> = (1..=12)
                .map(|month| {
                    self.get(year, month)
                        .and_then(|r| statistic.pick(r.field(variable)))
                })
                .collect();
            columns.push(Column::new(year.to_string().into(), values));
        }

        DataFrame::new(columns)
    }
}

fn field_stats(
    df: &DataFrame,
    variable: Variable,
    idx: usize,
) -> Result<FieldStats, ClimateDataError> {
    let name = variable.column();
    let count = df
        .column(&format!("{name}_count"))?
        .u32()?
        .get(idx)
        .unwrap_or(0);
    let sum = df.column(&format!("{name}_sum"))?.f64()?.get(idx);
    let mean = df.column(&format!("{name}_mean"))?.f64()?.get(idx);
    let std_dev = df.column(&format!("{name}_std"))?.f64()?.get(idx);

    Ok(FieldStats {
        count,
        sum: sum.unwrap_or(0.0),
        mean: mean.filter(|v| count > 0 && v.is_finite()),
        // Not computable from a single observation, whatever the backend reports.
        std_dev: std_dev.filter(|v| count > 1 && v.is_finite()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::daily_frame::DailyClimateFrame;
    use crate::types::climate::ClimateSample;
    use chrono::{Datelike, NaiveDate};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn samples(
        start: NaiveDate,
        prec: &[Option<f64>],
        temp: &[Option<f64>],
    ) -> Vec<ClimateSample> {
        start
            .iter_days()
            .zip(prec.iter().zip(temp.iter()))
            .map(|(date, (p, t))| ClimateSample {
                date,
                precipitation: *p,
                temperature: *t,
            })
            .collect()
    }

    fn aggregate(samples: &[ClimateSample]) -> MonthlyAggregates {
        DailyClimateFrame::from_samples(samples)
            .unwrap()
            .monthly_aggregates()
            .unwrap()
    }

    #[test]
    fn test_january_example() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let input = samples(
            jan1,
            &[Some(0.0), Some(10.0), Some(20.0)],
            &[Some(25.0), Some(25.0), Some(25.0)],
        );
        let aggregates = aggregate(&input);

        assert_eq!(aggregates.len(), 1);
        let record = aggregates.get(2024, 1).unwrap();
        assert_eq!(record.precipitation.count, 3);
        assert!(approx(record.precipitation.sum, 30.0));
        assert!(approx(record.precipitation.mean.unwrap(), 10.0));
        assert!(approx(record.precipitation.std_dev.unwrap(), 10.0));

        // Uniform values have zero spread.
        assert!(approx(record.temperature.std_dev.unwrap(), 0.0));
        assert!(approx(record.temperature.mean.unwrap(), 25.0));
    }

    #[test]
    fn test_single_day_has_no_std_dev() {
        let day = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let aggregates = aggregate(&samples(day, &[Some(4.2)], &[Some(18.5)]));

        let record = aggregates.get(2023, 6).unwrap();
        assert!(approx(record.precipitation.sum, 4.2));
        assert!(approx(record.precipitation.mean.unwrap(), 4.2));
        assert_eq!(record.precipitation.std_dev, None);
        assert!(approx(record.temperature.sum, 18.5));
        assert!(approx(record.temperature.mean.unwrap(), 18.5));
        assert_eq!(record.temperature.std_dev, None);
    }

    #[test]
    fn test_missing_values_are_skipped_per_field() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let aggregates = aggregate(&samples(
            start,
            &[Some(2.0), None, Some(4.0)],
            &[None, None, Some(30.0)],
        ));
        let record = aggregates.get(2022, 3).unwrap();

        assert_eq!(record.precipitation.count, 2);
        assert!(approx(record.precipitation.mean.unwrap(), 3.0));
        assert_eq!(record.temperature.count, 1);
        assert!(approx(record.temperature.mean.unwrap(), 30.0));
        assert_eq!(record.temperature.std_dev, None);
    }

    #[test]
    fn test_groups_are_keyed_by_each_samples_date() {
        // 2023-12-30 .. 2024-02-02: three groups, sorted across the year boundary.
        let start = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        let n = 35;
        let prec: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
        let temp: Vec<Option<f64>> = (0..n).map(|i| Some(20.0 + (i % 7) as f64)).collect();
        let input = samples(start, &prec, &temp);
        let aggregates = aggregate(&input);

        let keys: Vec<Month> = aggregates.records().iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![Month(2023, 12), Month(2024, 1), Month(2024, 2)]);
        assert_eq!(aggregates.years(), vec![2023, 2024]);
        assert_eq!(aggregates.get(2023, 12).unwrap().precipitation.count, 2);
        assert_eq!(aggregates.get(2024, 2).unwrap().precipitation.count, 2);

        // Re-deriving the sums must match summing the raw samples of each key.
        for record in aggregates.records() {
            let (prec_sum, temp_sum) = input
                .iter()
                .filter(|s| s.date.year() == record.key.year() && s.date.month() == record.key.month())
                .fold((0.0, 0.0), |(p, t), s| {
                    (p + s.precipitation.unwrap_or(0.0), t + s.temperature.unwrap_or(0.0))
                });
            assert!(approx(record.precipitation.sum, prec_sum));
            assert!(approx(record.temperature.sum, temp_sum));
        }
        let view_total: f64 = aggregates
            .sums()
            .iter()
            .filter_map(|v| v.precipitation)
            .sum();
        assert!(approx(view_total, prec.iter().flatten().sum()));
    }

    #[test]
    fn test_views_and_wide_table() -> Result<(), Box<dyn std::error::Error>> {
        let mut input = samples(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            &[Some(1.0), Some(3.0)],
            &[Some(20.0), Some(22.0)],
        );
        input.extend(samples(
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            &[Some(5.0)],
            &[Some(30.0)],
        ));
        let aggregates = aggregate(&input);

        let means = aggregates.means();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].temperature, Some(21.0));
        let stds = aggregates.std_devs();
        assert_eq!(stds[1].precipitation, None);

        let wide = aggregates.wide_by_year(Variable::Precipitation, Statistic::Sum)?;
        assert_eq!(wide.shape(), (12, 3));
        let names: Vec<&str> = wide.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["month", "2022", "2023"]);
        assert_eq!(wide.column("2022")?.f64()?.get(0), Some(4.0));
        assert_eq!(wide.column("2022")?.f64()?.get(1), None);
        assert_eq!(wide.column("2023")?.f64()?.get(1), Some(5.0));
        Ok(())
    }
}
