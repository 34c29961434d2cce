use crate::cache::MemoCache;
use crate::climate::error::ClimateDataError;
use crate::fetch::get_text;
use crate::types::climate::{ClimateSample, LonLat, Variable};
use crate::types::period::{DateRange, COMPACT_DATE_FORMAT};
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// Community tag sent to the climate service ("SB", sustainable buildings).
const COMMUNITY: &str = "SB";

#[derive(Debug, Deserialize)]
struct PowerResponse {
    #[serde(default)]
    header: PowerHeader,
    properties: PowerProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PowerHeader {
    fill_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, BTreeMap<String, Option<f64>>>,
}

/// A daily series for one point, one sample per day of `range`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClimateSeries {
    pub location: LonLat,
    pub range: DateRange,
    pub samples: Vec<ClimateSample>,
}

type SeriesKey = ((u64, u64), DateRange);

/// Fetches daily precipitation and temperature for a point from NASA POWER.
pub struct ClimateSeriesFetcher {
    client: Client,
    base_url: String,
    cache: Mutex<MemoCache<SeriesKey, DailyClimateSeries>>,
}

impl ClimateSeriesFetcher {
    pub fn new(client: Client, base_url: &str, cache_capacity: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(MemoCache::new(cache_capacity)),
        }
    }

    pub(crate) fn url(&self) -> String {
        format!("{}/api/temporal/daily/point", self.base_url)
    }

    /// Fetches the series for `location` over `start..=end`.
    ///
    /// The result has exactly one sample per calendar day, in order. A payload
    /// that does not cover every day is rejected rather than returned partially.
    pub async fn fetch(
        &self,
        location: LonLat,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyClimateSeries, ClimateDataError> {
        if !location.is_valid() {
            return Err(ClimateDataError::InvalidCoordinate(location));
        }
        let range =
            DateRange::new(start, end).ok_or(ClimateDataError::InvertedRange { start, end })?;

        let key = (location.cache_key(), range);
        {
            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&key) {
                info!("Memo hit for climate series at {} ({})", location, range);
                return Ok(cached);
            }
        }

        let parameters = Variable::ALL.map(Variable::parameter).join(",");
        let url = self.url();
        let text = get_text(
            &self.client,
            &url,
            &[
                ("parameters", parameters),
                ("community", COMMUNITY.to_string()),
                ("longitude", location.lon().to_string()),
                ("latitude", location.lat().to_string()),
                ("start", range.compact_start()),
                ("end", range.compact_end()),
                ("format", "JSON".to_string()),
            ],
        )
        .await?;

        let response: PowerResponse = serde_json::from_str(&text)
            .map_err(|source| ClimateDataError::PayloadParse { url, source })?;
        let samples = samples_from_response(response, range)?;
        info!(
            "Fetched {} daily samples at {} ({})",
            samples.len(),
            location,
            range
        );

        let series = DailyClimateSeries {
            location,
            range,
            samples,
        };
        self.cache.lock().await.insert(key, series.clone());
        Ok(series)
    }
}

/// Joins the per-variable day maps into ordered samples covering `range`.
fn samples_from_response(
    mut response: PowerResponse,
    range: DateRange,
) -> Result<Vec<ClimateSample>, ClimateDataError> {
    let fill_value = response.header.fill_value;
    let expected = range.days();

    let mut columns: Vec<HashMap<NaiveDate, Option<f64>>> = Vec::with_capacity(2);
    for variable in Variable::ALL {
        let days = response
            .properties
            .parameter
            .remove(variable.parameter())
            .ok_or(ClimateDataError::MissingVariable(variable))?;

        let mut parsed = HashMap::with_capacity(days.len());
        for (key, value) in days {
            let date = NaiveDate::parse_from_str(&key, COMPACT_DATE_FORMAT)
                .map_err(|_| ClimateDataError::InvalidDateKey(key.clone()))?;
            // The service marks missing observations with its fill value.
            let value = value.filter(|v| v.is_finite() && Some(*v) != fill_value);
            parsed.insert(date, value);
        }

        if parsed.len() != expected {
            warn!(
                "{} series has {} days, expected {}",
                variable,
                parsed.len(),
                expected
            );
            return Err(ClimateDataError::IncompleteSeries {
                variable,
                expected,
                found: parsed.len(),
            });
        }
        columns.push(parsed);
    }

    range
        .iter_days()
        .map(|date| {
            let mut values = [None; 2];
            for (slot, (variable, column)) in values
                .iter_mut()
                .zip(Variable::ALL.iter().zip(columns.iter()))
            {
                *slot = *column
                    .get(&date)
                    .ok_or(ClimateDataError::MissingDay {
                        variable: *variable,
                        date,
                    })?;
            }
            Ok(ClimateSample {
                date,
                precipitation: values[0],
                temperature: values[1],
            })
        })
        .collect()
}
