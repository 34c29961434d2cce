//! Selection state of one report: state, municipality and date range, with the
//! data fetched for them.
//!
//! Changing a selection discards everything derived from it. Invalid date
//! picks leave the session in a warning state in which nothing is fetched and
//! no charts are rendered.

use crate::aggregate::monthly::MonthlyAggregates;
use crate::climate::series_fetcher::DailyClimateSeries;
use crate::error::MuniClimaError;
use crate::geography::directory_fetcher::Directory;
use crate::municlima::MuniClima;
use crate::render::charts::MonthlyChart;
use crate::render::error::RenderError;
use crate::render::map::{MapView, DEFAULT_ZOOM};
use crate::types::boundary::BoundarySet;
use crate::types::climate::LonLat;
use crate::types::municipality::Municipality;
use crate::types::period::{DateRange, DateSelectionError};
use crate::types::state::State;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DATE_WARNING: &str = "Por favor, selecione um intervalo válido de datas.";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user about the last selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub level: StatusLevel,
    pub message: String,
}

impl StatusLine {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            StatusLevel::Info => "info",
            StatusLevel::Warning => "aviso",
            StatusLevel::Error => "erro",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

/// Climate data for the current municipality and date range.
#[derive(Debug, Clone)]
pub struct ClimateView {
    pub series: DailyClimateSeries,
    pub aggregates: MonthlyAggregates,
}

/// Files written by [`Session::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub map: PathBuf,
    pub charts: Vec<PathBuf>,
}

pub struct Session<'a> {
    client: &'a MuniClima,
    state: Option<State>,
    directory: Option<Directory>,
    boundaries: Option<BoundarySet>,
    municipality: Option<Municipality>,
    map_center: Option<LonLat>,
    dates: Result<DateRange, DateSelectionError>,
    climate: Option<ClimateView>,
    status: Vec<StatusLine>,
}

impl<'a> Session<'a> {
    /// Starts with nothing selected and the configured default date range.
    ///
    /// A default range that does not fit the configured window puts the
    /// session in the same warning state as an invalid pick.
    pub fn new(client: &'a MuniClima) -> Self {
        let dates = client.config().date_window.default_selection();
        let mut status = Vec::new();
        if let Err(e) = &dates {
            warn!("Configured default dates rejected: {e}");
            status.push(StatusLine::warning(format!("{DATE_WARNING} ({e})")));
        }
        Self {
            dates,
            client,
            state: None,
            directory: None,
            boundaries: None,
            municipality: None,
            map_center: None,
            climate: None,
            status,
        }
    }

    pub fn state(&self) -> Option<State> {
        self.state
    }

    pub fn directory(&self) -> Option<&Directory> {
        self.directory.as_ref()
    }

    pub fn boundaries(&self) -> Option<&BoundarySet> {
        self.boundaries.as_ref()
    }

    pub fn municipality(&self) -> Option<&Municipality> {
        self.municipality.as_ref()
    }

    pub fn map_center(&self) -> Option<LonLat> {
        self.map_center
    }

    pub fn dates(&self) -> Result<DateRange, &DateSelectionError> {
        self.dates.as_ref().copied()
    }

    pub fn climate(&self) -> Option<&ClimateView> {
        self.climate.as_ref()
    }

    pub fn status(&self) -> &[StatusLine] {
        &self.status
    }

    /// Takes the accumulated status lines, leaving none behind.
    pub fn drain_status(&mut self) -> Vec<StatusLine> {
        std::mem::take(&mut self.status)
    }

    /// Selects a state and loads its municipality listing and outlines.
    ///
    /// A failed listing only adds a warning: the session continues with an
    /// empty directory. A failed outline request is returned as an error and
    /// leaves the state without boundaries.
    pub async fn select_state(&mut self, state: State) -> Result<(), MuniClimaError> {
        info!("Selecting state {state}");
        self.state = Some(state);
        self.directory = None;
        self.boundaries = None;
        self.clear_municipality();

        let directory = self.client.municipalities(state).await;
        if let Some(failure) = &directory.failure {
            self.status.push(StatusLine::warning(failure.to_string()));
        }
        self.directory = Some(directory);

        match self.client.boundaries(state).await {
            Ok(boundaries) => {
                debug!("Loaded {} outlines for {state}", boundaries.len());
                self.boundaries = Some(boundaries);
                Ok(())
            }
            Err(e) => {
                self.status.push(StatusLine::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Selects a municipality of the current state by its listed name.
    pub async fn select_municipality(&mut self, name: &str) -> Result<(), MuniClimaError> {
        let (state, directory) = self.current_directory()?;
        let municipality = directory.by_name(name).cloned().ok_or_else(|| {
            MuniClimaError::UnknownMunicipality {
                state,
                name: name.to_string(),
            }
        });
        self.select(municipality).await
    }

    /// Selects a municipality of the current state by its IBGE code.
    pub async fn select_municipality_code(&mut self, id: u32) -> Result<(), MuniClimaError> {
        let (state, directory) = self.current_directory()?;
        let municipality = directory.by_id(id).cloned().ok_or_else(|| {
            MuniClimaError::UnknownMunicipality {
                state,
                name: id.to_string(),
            }
        });
        self.select(municipality).await
    }

    fn current_directory(&self) -> Result<(State, &Directory), MuniClimaError> {
        match (self.state, &self.directory) {
            (Some(state), Some(directory)) => Ok((state, directory)),
            _ => Err(MuniClimaError::NoStateSelected),
        }
    }

    async fn select(
        &mut self,
        municipality: Result<Municipality, MuniClimaError>,
    ) -> Result<(), MuniClimaError> {
        self.clear_municipality();
        let municipality = match municipality {
            Ok(m) => m,
            Err(e) => {
                self.status.push(StatusLine::error(e.to_string()));
                return Err(e);
            }
        };

        let center = self
            .boundaries
            .as_ref()
            .ok_or(MuniClimaError::NoStateSelected)
            .and_then(|set| Ok(set.require(municipality.id)?.centroid()?));
        let center = match center {
            Ok(center) => center,
            Err(e) => {
                self.status.push(StatusLine::error(e.to_string()));
                return Err(e);
            }
        };

        info!("Selected {} ({}) centered at {center}", municipality.name, municipality.id);
        self.status.push(StatusLine::info(format!(
            "Código do IBGE da cidade selecionada: {}",
            municipality.id
        )));
        self.municipality = Some(municipality);
        self.map_center = Some(center);
        self.refresh_climate().await
    }

    fn clear_municipality(&mut self) {
        self.municipality = None;
        self.map_center = None;
        self.climate = None;
    }

    /// Applies the dates picked by the user.
    ///
    /// Anything other than an ordered pair inside the configured window puts
    /// the session in a warning state: no request is sent and the previous
    /// climate data is dropped. This is not an error.
    pub async fn select_dates(&mut self, picks: &[NaiveDate]) -> Result<(), MuniClimaError> {
        self.climate = None;
        match self.client.config().date_window.validate(picks) {
            Ok(range) => {
                self.status.push(StatusLine::info(format!(
                    "Data de Início: {}",
                    range.compact_start()
                )));
                self.status
                    .push(StatusLine::info(format!("Data de Fim: {}", range.compact_end())));
                self.dates = Ok(range);
                self.refresh_climate().await
            }
            Err(e) => {
                warn!("Rejected date selection {picks:?}: {e}");
                self.status.push(StatusLine::warning(format!("{DATE_WARNING} ({e})")));
                self.dates = Err(e);
                Ok(())
            }
        }
    }

    /// Fetches and aggregates the climate series when a municipality and a
    /// valid date range are both selected. Does nothing otherwise.
    pub async fn refresh_climate(&mut self) -> Result<(), MuniClimaError> {
        self.climate = None;
        let (Some(center), Ok(range)) = (self.map_center, &self.dates) else {
            return Ok(());
        };
        let range = *range;

        let fetched = self
            .client
            .daily_climate()
            .location(center)
            .start(range.start)
            .end(range.end)
            .call()
            .await
            .and_then(|series| {
                let aggregates = series.monthly()?;
                Ok(ClimateView { series, aggregates })
            });

        match fetched {
            Ok(view) => {
                info!("Aggregated {} months for {range}", view.aggregates.len());
                self.climate = Some(view);
                Ok(())
            }
            Err(e) => {
                self.status.push(StatusLine::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Writes the map page and, when climate data is present, both charts
    /// into `out_dir`.
    pub fn render(
        &self,
        out_dir: &Path,
        rendered_at: NaiveDateTime,
    ) -> Result<RenderedReport, MuniClimaError> {
        let (Some(municipality), Some(center), Some(boundaries)) =
            (&self.municipality, self.map_center, &self.boundaries)
        else {
            return Err(MuniClimaError::NoMunicipalitySelected);
        };
        let boundary = boundaries.require(municipality.id)?;

        std::fs::create_dir_all(out_dir)
            .map_err(|e| RenderError::OutputDir(out_dir.to_path_buf(), e))?;

        let title = format!("{} ({})", municipality.name, municipality.state);
        let map = out_dir.join("mapa.html");
        MapView {
            title: &title,
            boundary,
            center,
            zoom: DEFAULT_ZOOM,
            rendered_at,
        }
        .write(&map)?;

        let mut charts = Vec::new();
        if let Some(climate) = &self.climate {
            for (chart, file) in [
                (MonthlyChart::PRECIPITATION, "precipitacao.html"),
                (MonthlyChart::TEMPERATURE, "temperatura.html"),
            ] {
                let path = out_dir.join(file);
                chart.write(&climate.aggregates, &path)?;
                charts.push(path);
            }
        }

        Ok(RenderedReport { map, charts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::types::period::DateWindow;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client(server: &MockServer) -> MuniClima {
        MuniClima::with_config(
            ClientConfig::builder()
                .ibge_base_url(server.uri())
                .power_base_url(server.uri())
                .build(),
        )
        .unwrap()
    }

    async fn mount_directory(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/localidades/estados/MT/municipios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 5103403, "nome": "Cuiabá" },
                { "id": 5108402, "nome": "Várzea Grande" }
            ])))
            .mount(server)
            .await;
    }

    async fn mount_boundaries(server: &MockServer) {
        let square = |x: f64, y: f64| {
            json!([[[x, y], [x + 0.4, y], [x + 0.4, y + 0.4], [x, y + 0.4], [x, y]]])
        };
        Mock::given(method("GET"))
            .and(path("/api/v4/malhas/estados/MT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "codarea": "5103403" },
                        "geometry": { "type": "Polygon", "coordinates": square(-56.2, -15.8) }
                    },
                    {
                        "type": "Feature",
                        "properties": { "codarea": "5108402" },
                        "geometry": { "type": "Polygon", "coordinates": square(-56.6, -15.8) }
                    }
                ]
            })))
            .mount(server)
            .await;
    }

    fn climate_payload(range: DateRange) -> serde_json::Value {
        let mut prec = serde_json::Map::new();
        let mut temp = serde_json::Map::new();
        for (i, day) in range.iter_days().enumerate() {
            let key = day.format("%Y%m%d").to_string();
            prec.insert(key.clone(), json!(i as f64));
            temp.insert(key, json!(25.0));
        }
        json!({
            "header": { "fill_value": -999.0 },
            "properties": { "parameter": { "PRECTOTCORR": prec, "T2M": temp } }
        })
    }

    #[tokio::test]
    async fn test_full_selection_renders_map_and_charts() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_boundaries(&server).await;
        let range = DateRange::new(date(2024, 1, 30), date(2024, 2, 2)).unwrap();
        Mock::given(method("GET"))
            .and(path("/api/temporal/daily/point"))
            .respond_with(ResponseTemplate::new(200).set_body_json(climate_payload(range)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let mut session = Session::new(&client);
        session.select_state(State::MT).await.unwrap();
        session
            .select_dates(&[range.start, range.end])
            .await
            .unwrap();
        assert!(session.climate().is_none());

        session.select_municipality("Cuiabá").await.unwrap();
        let center = session.map_center().unwrap();
        assert!((center.lon() - -56.0).abs() < 1e-9);
        assert!((center.lat() - -15.6).abs() < 1e-9);

        let climate = session.climate().unwrap();
        assert_eq!(climate.series.samples.len(), 4);
        assert_eq!(climate.aggregates.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let report = session
            .render(dir.path(), date(2024, 5, 1).and_hms_opt(8, 0, 0).unwrap())
            .unwrap();
        assert!(report.map.exists());
        assert_eq!(report.charts.len(), 2);
        assert!(report.charts.iter().all(|p| p.exists()));
    }

    #[tokio::test]
    async fn test_invalid_dates_fetch_nothing() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_boundaries(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/temporal/daily/point"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let mut session = Session::new(&client);
        session.select_state(State::MT).await.unwrap();
        session.select_dates(&[date(2024, 1, 1)]).await.unwrap();

        assert_eq!(session.dates(), Err(&DateSelectionError::Incomplete(1)));
        let last = session.status().last().unwrap();
        assert_eq!(last.level, StatusLevel::Warning);
        assert!(last.message.starts_with(DATE_WARNING));

        session.select_municipality_code(5_108_402).await.unwrap();
        assert!(session.climate().is_none());

        let dir = tempfile::tempdir().unwrap();
        let report = session
            .render(dir.path(), date(2024, 5, 1).and_hms_opt(8, 0, 0).unwrap())
            .unwrap();
        assert!(report.map.exists());
        assert!(report.charts.is_empty());
    }

    #[tokio::test]
    async fn test_directory_failure_is_a_warning() {
        let server = MockServer::start().await;
        mount_boundaries(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/localidades/estados/MT/municipios"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut session = Session::new(&client);
        session.select_state(State::MT).await.unwrap();

        assert!(session.directory().unwrap().municipalities.is_empty());
        assert!(session.boundaries().is_some());
        assert_eq!(session.status()[0].level, StatusLevel::Warning);

        let err = session.select_municipality("Cuiabá").await.unwrap_err();
        assert!(matches!(err, MuniClimaError::UnknownMunicipality { .. }));
    }

    #[tokio::test]
    async fn test_boundary_failure_is_hard_and_changing_state_clears_selection() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_boundaries(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/localidades/estados/RO/municipios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/malhas/estados/RO"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut session = Session::new(&client);
        session.select_dates(&[date(2023, 1, 1)]).await.unwrap();
        session.select_state(State::MT).await.unwrap();
        session.select_municipality("Cuiabá").await.unwrap();
        assert!(session.municipality().is_some());

        let err = session.select_state(State::RO).await.unwrap_err();
        assert!(err.is_hard_fetch_failure());
        assert_eq!(session.state(), Some(State::RO));
        assert!(session.municipality().is_none());
        assert!(session.map_center().is_none());
        assert!(session.boundaries().is_none());
        assert_eq!(session.status().last().unwrap().level, StatusLevel::Error);
    }

    #[tokio::test]
    async fn test_default_range_outside_window_fetches_nothing() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_boundaries(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/temporal/daily/point"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = MuniClima::with_config(
            ClientConfig::builder()
                .ibge_base_url(server.uri())
                .power_base_url(server.uri())
                .date_window(DateWindow {
                    min: date(2021, 1, 1),
                    max: date(2021, 12, 31),
                    default_start: date(1990, 1, 1),
                    default_end: date(2030, 1, 1),
                })
                .build(),
        )
        .unwrap();
        let mut session = Session::new(&client);

        assert!(matches!(
            session.dates(),
            Err(DateSelectionError::OutOfWindow { .. })
        ));
        assert_eq!(session.status()[0].level, StatusLevel::Warning);

        session.select_state(State::MT).await.unwrap();
        session.select_municipality("Cuiabá").await.unwrap();
        assert!(session.climate().is_none());
    }

    #[tokio::test]
    async fn test_malformed_mesh_is_hard_failure() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v4/malhas/estados/MT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": []
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut session = Session::new(&client);
        let err = session.select_state(State::MT).await.unwrap_err();

        assert!(err.is_hard_fetch_failure());
        assert!(session.boundaries().is_none());
        assert_eq!(session.status().last().unwrap().level, StatusLevel::Error);
    }

    #[tokio::test]
    async fn test_outlines_cover_listed_municipalities() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_boundaries(&server).await;

        let client = client(&server);
        let mut session = Session::new(&client);
        session.select_state(State::MT).await.unwrap();

        let boundaries = session.boundaries().unwrap();
        for municipality in &session.directory().unwrap().municipalities {
            assert!(boundaries.get(municipality.id).is_some());
            assert!(State::MT.contains_municipality(municipality.id));
        }
    }
}
