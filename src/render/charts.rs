//! Month-by-month line charts, one line per year.

use crate::aggregate::monthly::{MonthlyAggregates, Statistic};
use crate::render::error::RenderError;
use crate::types::climate::Variable;
use plotlars::{Axis, Legend, LinePlot, Plot, Rgb, Text};
use std::path::Path;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Plotly sequential "Blues", lightest tones dropped so every line stays visible.
const BLUES: [(u8, u8, u8); 7] = [
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Plotly sequential "Reds", lightest tones dropped.
const REDS: [(u8, u8, u8); 7] = [
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

/// Description of one monthly chart.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyChart {
    pub title: &'static str,
    pub y_title: &'static str,
    pub variable: Variable,
    pub statistic: Statistic,
    palette: &'static [(u8, u8, u8)],
}

impl MonthlyChart {
    /// Total precipitation per month.
    pub const PRECIPITATION: MonthlyChart = MonthlyChart {
        title: "Precipitação Mensal por Ano",
        y_title: "Precipitação (mm)",
        variable: Variable::Precipitation,
        statistic: Statistic::Sum,
        palette: &BLUES,
    };

    /// Mean daily temperature per month.
    pub const TEMPERATURE: MonthlyChart = MonthlyChart {
        title: "Temperatura média Mensal por Ano",
        y_title: "Temperatura média (°C)",
        variable: Variable::Temperature,
        statistic: Statistic::Mean,
        palette: &REDS,
    };

    /// Line colors for `n` years, spread over the palette, oldest year lightest.
    fn palette_indices(&self, n: usize) -> Vec<usize> {
        let len = self.palette.len();
        (0..n)
            .map(|i| {
                if n <= 1 {
                    len - 1
                } else if n <= len {
                    len - n + i
                } else {
                    i % len
                }
            })
            .collect()
    }

    fn colors(&self, n: usize) -> Vec<Rgb> {
        self.palette_indices(n)
            .into_iter()
            .map(|idx| {
                let (r, g, b) = self.palette[idx];
                Rgb(r, g, b)
            })
            .collect()
    }

    /// Builds the plot; one line per year present in `aggregates`.
    pub fn build(&self, aggregates: &MonthlyAggregates) -> Result<LinePlot, RenderError> {
        let table = aggregates.wide_by_year(self.variable, self.statistic)?;
        let years: Vec<String> = aggregates.years().iter().map(i32::to_string).collect();
        let Some((first, rest)) = years.split_first() else {
            return Err(RenderError::NoData(self.title));
        };
        let additional: Vec<&str> = rest.iter().map(String::as_str).collect();

        let month_axis = Axis::new()
            .tick_values((1..=12).map(f64::from).collect())
            .tick_labels(MONTH_LABELS.to_vec());

        Ok(LinePlot::builder()
            .data(&table)
            .x("month")
            .y(first.as_str())
            .additional_lines(additional)
            .colors(self.colors(years.len()))
            .with_shape(true)
            .plot_title(Text::from(self.title))
            .x_title(Text::from("Mês"))
            .y_title(Text::from(self.y_title))
            .x_axis(&month_axis)
            .legend(&Legend::new())
            .build())
    }

    pub fn to_html(&self, aggregates: &MonthlyAggregates) -> Result<String, RenderError> {
        Ok(self.build(aggregates)?.to_html())
    }

    pub fn write(&self, aggregates: &MonthlyAggregates, path: &Path) -> Result<(), RenderError> {
        let html = self.to_html(aggregates)?;
        std::fs::write(path, html).map_err(|e| RenderError::Write(path.to_path_buf(), e))
    }
}
