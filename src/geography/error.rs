use crate::fetch::FetchError;
use crate::types::state::State;
use thiserror::Error;

/// Hard failures of the boundary fetcher. The selection that triggered the
/// request cannot be rendered.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Failed to fetch boundaries for {state}")]
    Fetch {
        state: State,
        #[source]
        source: FetchError,
    },

    #[error("Boundary payload for {state} is not valid GeoJSON")]
    GeoJsonParse {
        state: State,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("Boundary payload for {0} is not a FeatureCollection")]
    NotFeatureCollection(State),

    #[error("Boundary payload for {0} contains no features")]
    Empty(State),

    #[error("Feature #{index} for {state} has no usable 'codarea' property")]
    MissingCode { state: State, index: usize },

    #[error("Boundary {0} has no polygonal geometry")]
    NotPolygonal(u32),

    #[error("Unsupported coordinate reference system '{0}'")]
    UnsupportedCrs(String),

    #[error("Boundary {0} has an empty geometry, no centroid can be computed")]
    EmptyGeometry(u32),

    #[error("No boundary for municipality {municipality} in {state}")]
    UnknownMunicipality { state: State, municipality: u32 },
}

/// The directory request failed and an empty list was returned instead.
///
/// This is a report, not an error: the caller keeps going with no
/// municipalities and shows the reason to the user.
#[derive(Debug, Error)]
#[error("Municipality list for {state} unavailable: {reason}")]
pub struct SoftFetchFailure {
    pub state: State,
    pub reason: DirectoryFailure,
}

#[derive(Debug, Error)]
pub enum DirectoryFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Directory payload is not a list of municipalities")]
    Decode(#[from] serde_json::Error),
}
