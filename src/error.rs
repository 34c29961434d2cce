use crate::climate::error::ClimateDataError;
use crate::geography::error::BoundaryError;
use crate::render::error::RenderError;
use crate::types::period::DateSelectionError;
use crate::types::state::State;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MuniClimaError {
    /// Hard fetch failure of the boundary service.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// Hard fetch failure of the climate service, or of aggregating its data.
    #[error(transparent)]
    ClimateData(#[from] ClimateDataError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Unsupported state code '{0}'")]
    UnknownState(String),

    #[error("Municipality '{name}' not found in {state}")]
    UnknownMunicipality { state: State, name: String },

    #[error("Invalid date selection: {0}")]
    InvalidDateSelection(#[from] DateSelectionError),

    #[error("No state selected")]
    NoStateSelected,

    #[error("No municipality selected")]
    NoMunicipalitySelected,

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] toml::de::Error),
}

impl MuniClimaError {
    /// Whether a remote service failed, or answered with an unusable payload,
    /// in a way that ends the current selection.
    ///
    /// Lookups inside a valid payload and rejected inputs are not fetch failures.
    pub fn is_hard_fetch_failure(&self) -> bool {
        match self {
            MuniClimaError::Boundary(e) => !matches!(
                e,
                BoundaryError::UnknownMunicipality { .. } | BoundaryError::EmptyGeometry(_)
            ),
            MuniClimaError::ClimateData(e) => !matches!(
                e,
                ClimateDataError::InvalidCoordinate(_) | ClimateDataError::InvertedRange { .. }
            ),
            _ => false,
        }
    }
}
