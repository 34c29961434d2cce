//! This module provides the main entry point: a client bundling the boundary,
//! directory and climate fetchers behind one configuration.

use crate::aggregate::monthly::MonthlyAggregates;
use crate::climate::series_fetcher::{ClimateSeriesFetcher, DailyClimateSeries};
use crate::config::ClientConfig;
use crate::error::MuniClimaError;
use crate::geography::boundary_fetcher::BoundaryFetcher;
use crate::geography::directory_fetcher::{Directory, DirectoryFetcher};
use crate::types::boundary::BoundarySet;
use crate::types::climate::LonLat;
use crate::types::state::State;
use bon::bon;
use chrono::NaiveDate;
use reqwest::Client;

/// The client for municipality boundaries, municipality listings and daily
/// climate series.
///
/// Each fetcher memoizes successful results by request arguments, bounded by
/// [`ClientConfig::cache_capacity`].
///
/// # Examples
///
/// ```rust
/// # use municlima::{MuniClima, MuniClimaError};
/// # fn run() -> Result<(), MuniClimaError> {
/// // Create a client against the public IBGE and NASA POWER services
/// let client = MuniClima::new()?;
/// assert_eq!(client.config().cache_capacity, 32);
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
pub struct MuniClima {
    config: ClientConfig,
    boundaries: BoundaryFetcher,
    directory: DirectoryFetcher,
    climate: ClimateSeriesFetcher,
}

#[bon]
impl MuniClima {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self, MuniClimaError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with a custom configuration, e.g. other base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`MuniClimaError::HttpClient`] if the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, MuniClimaError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(MuniClimaError::HttpClient)?;
        let capacity = config.cache_capacity;

        Ok(Self {
            boundaries: BoundaryFetcher::new(client.clone(), &config.ibge_base_url, capacity),
            directory: DirectoryFetcher::new(client.clone(), &config.ibge_base_url, capacity),
            climate: ClimateSeriesFetcher::new(client, &config.power_base_url, capacity),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the outlines of every municipality of `state`.
    ///
    /// # Errors
    ///
    /// Any non-success status or unusable payload is a
    /// [`MuniClimaError::Boundary`]; nothing is retried.
    pub async fn boundaries(&self, state: State) -> Result<BoundarySet, MuniClimaError> {
        Ok(self.boundaries.fetch(state).await?)
    }

    /// Lists the municipalities of `state`.
    ///
    /// Never fails. When the listing is unavailable the returned [`Directory`]
    /// is empty and [`Directory::failure`] says why.
    pub async fn municipalities(&self, state: State) -> Directory {
        self.directory.fetch(state).await
    }

    /// Fetches the daily precipitation and temperature series at a point.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LonLat)`: **Required.** The query point.
    /// * `.start(NaiveDate)`: **Required.** First day (inclusive).
    /// * `.end(NaiveDate)`: **Required.** Last day (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`MuniClimaError::ClimateData`] for an invalid coordinate, an
    /// inverted range, a non-success status or a payload that does not cover
    /// every requested day.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use municlima::{LonLat, MuniClima, MuniClimaError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MuniClimaError> {
    /// let client = MuniClima::new()?;
    /// let series = client
    ///     .daily_climate()
    ///     .location(LonLat(-56.0967, -15.6014)) // Cuiabá
    ///     .start(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    ///     .end(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    ///     .call()
    ///     .await?;
    /// assert_eq!(series.samples.len(), 31);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn daily_climate(
        &self,
        location: LonLat,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyClimateSeries, MuniClimaError> {
        Ok(self.climate.fetch(location, start, end).await?)
    }

    /// Fetches the daily series and aggregates it by (year, month).
    #[builder]
    pub async fn monthly_climate(
        &self,
        location: LonLat,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlyAggregates, MuniClimaError> {
        let series = self.climate.fetch(location, start, end).await?;
        Ok(series.monthly()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::period::DateRange;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_monthly_climate_over_mock_service() -> Result<(), MuniClimaError> {
        let mock_server = MockServer::start().await;
        let range = DateRange::new(date(2024, 1, 30), date(2024, 2, 2)).unwrap();

        let mut prec = serde_json::Map::new();
        let mut temp = serde_json::Map::new();
        for (i, day) in range.iter_days().enumerate() {
            let key = day.format("%Y%m%d").to_string();
            prec.insert(key.clone(), json!(10.0 * i as f64));
            temp.insert(key, json!(26.0));
        }

        Mock::given(method("GET"))
            .and(path("/api/temporal/daily/point"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "header": { "fill_value": -999.0 },
                "properties": { "parameter": { "PRECTOTCORR": prec, "T2M": temp } }
            })))
            .mount(&mock_server)
            .await;

        let client = MuniClima::with_config(
            ClientConfig::builder()
                .power_base_url(mock_server.uri())
                .build(),
        )?;
        let aggregates = client
            .monthly_climate()
            .location(LonLat(-56.0, -15.0))
            .start(range.start)
            .end(range.end)
            .call()
            .await?;

        assert_eq!(aggregates.len(), 2);
        let january = aggregates.get(2024, 1).unwrap();
        assert!((january.precipitation.sum - 10.0).abs() < 1e-9); // 0 + 10
        let february = aggregates.get(2024, 2).unwrap();
        assert!((february.precipitation.sum - 50.0).abs() < 1e-9); // 20 + 30
        assert_eq!(february.temperature.std_dev, Some(0.0));
        Ok(())
    }
}
