mod aggregate;
mod cache;
mod climate;
mod config;
mod error;
mod fetch;
mod geography;
mod municlima;
mod render;
mod session;
mod types;

pub use config::ClientConfig;
pub use error::MuniClimaError;
pub use municlima::*;
pub use session::*;

pub use types::boundary::{Boundary, BoundarySet, Crs};
pub use types::climate::{ClimateSample, LonLat, Variable};
pub use types::municipality::Municipality;
pub use types::period::{DateRange, DateSelectionError, DateWindow, Month};
pub use types::state::State;

pub use aggregate::daily_frame::DailyClimateFrame;
pub use aggregate::monthly::*;
pub use climate::series_fetcher::{ClimateSeriesFetcher, DailyClimateSeries};
pub use geography::boundary_fetcher::BoundaryFetcher;
pub use geography::directory_fetcher::{Directory, DirectoryFetcher};

pub use render::charts::{MonthlyChart, MONTH_LABELS};
pub use render::map::{MapView, DEFAULT_ZOOM};
pub use render::table::{daily_table, monthly_table};

pub use cache::MemoCache;
pub use fetch::FetchError;

pub use climate::error::ClimateDataError;
pub use geography::error::{BoundaryError, DirectoryFailure, SoftFetchFailure};
pub use render::error::RenderError;
