//! Plain-text tables for the terminal.

use crate::aggregate::daily_frame::DailyClimateFrame;
use crate::aggregate::monthly::MonthlyAggregates;
use crate::climate::error::ClimateDataError;
use std::fmt::{self, Write};

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// One line per (year, month) with the statistics shown in the charts plus
/// their spread.
pub fn monthly_table(aggregates: &MonthlyAggregates) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_monthly_table(&mut out, aggregates)?;
    Ok(out)
}

fn write_monthly_table(out: &mut impl Write, aggregates: &MonthlyAggregates) -> fmt::Result {
    writeln!(
        out,
        "{:<8} {:>5} {:>10} {:>10} {:>10} {:>5} {:>9} {:>9}",
        "MÊS", "N", "PREC SUM", "PREC MÉD", "PREC DP", "N", "TEMP MÉD", "TEMP DP"
    )?;
    writeln!(out, "{}", "-".repeat(74))?;
    for record in aggregates.records() {
        let p = &record.precipitation;
        let t = &record.temperature;
        writeln!(
            out,
            "{:<8} {:>5} {:>10} {:>10} {:>10} {:>5} {:>9} {:>9}",
            record.key.to_string(),
            p.count,
            cell(Some(p.sum)),
            cell(p.mean),
            cell(p.std_dev),
            t.count,
            cell(t.mean),
            cell(t.std_dev),
        )?;
    }
    Ok(())
}

/// The first `rows` days of the series as formatted by Polars.
pub fn daily_table(frame: &DailyClimateFrame, rows: usize) -> Result<String, ClimateDataError> {
    let df = frame.collect()?;
    Ok(format!("{}", df.head(Some(rows))))
}
