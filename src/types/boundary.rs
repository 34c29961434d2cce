//! Municipality boundaries as delivered by the IBGE mesh service.

use crate::geography::error::BoundaryError;
use crate::types::climate::LonLat;
use crate::types::state::State;
use geo::{Centroid, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use log::debug;
use std::fmt;

/// Name of the feature property holding the municipality code.
const CODE_PROPERTY: &str = "codarea";

/// Coordinate reference system of the boundary coordinates.
///
/// Both supported systems are geographic longitude/latitude in degrees and
/// agree to well under a meter, so centroids computed in either can be used
/// directly as query points for the climate service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Crs {
    /// SIRGAS 2000 (EPSG:4674), the IBGE reference system.
    #[default]
    Sirgas2000,
    /// WGS 84 (EPSG:4326 / OGC CRS84).
    Wgs84,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Sirgas2000 => 4674,
            Crs::Wgs84 => 4326,
        }
    }

    /// Resolves a CRS name as found in a GeoJSON `crs` member, e.g.
    /// `EPSG:4674` or `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn from_name(name: &str) -> Result<Self, BoundaryError> {
        let upper = name.to_ascii_uppercase();
        if upper.ends_with(":4674") {
            Ok(Crs::Sirgas2000)
        } else if upper.ends_with(":4326") || upper.ends_with("CRS84") {
            Ok(Crs::Wgs84)
        } else {
            Err(BoundaryError::UnsupportedCrs(name.to_string()))
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// The outline of one municipality.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// IBGE municipality code, taken from the `codarea` property.
    pub id: u32,
    pub geometry: MultiPolygon<f64>,
    pub crs: Crs,
}

impl Boundary {
    /// Area-weighted centroid of the outline, used to center the map and as
    /// the query point for the climate series.
    pub fn centroid(&self) -> Result<LonLat, BoundaryError> {
        self.geometry
            .centroid()
            .map(|p| LonLat(p.x(), p.y()))
            .ok_or(BoundaryError::EmptyGeometry(self.id))
    }

    /// The boundary as a GeoJSON feature carrying its `codarea` property.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert(
            CODE_PROPERTY.to_string(),
            JsonValue::String(self.id.to_string()),
        );
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// All municipality boundaries of a state, in payload order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySet {
    pub state: State,
    pub crs: Crs,
    boundaries: Vec<Boundary>,
}

impl BoundarySet {
    /// Parses the mesh payload and normalizes its CRS.
    ///
    /// A payload without a `crs` member is tagged as SIRGAS 2000, which is
    /// what the mesh service serves.
    pub fn from_geojson(state: State, text: &str) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|e| BoundaryError::GeoJsonParse {
                state,
                source: Box::new(e),
            })?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(BoundaryError::NotFeatureCollection(state));
        };

        let crs = declared_crs(&collection)?.unwrap_or_default();
        debug!(
            "Parsing {} boundary features for {} ({})",
            collection.features.len(),
            state,
            crs
        );

        let boundaries = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| boundary_from_feature(state, index, feature, crs))
            .collect::<Result<Vec<_>, _>>()?;

        if boundaries.is_empty() {
            return Err(BoundaryError::Empty(state));
        }

        Ok(Self {
            state,
            crs,
            boundaries,
        })
    }

    pub fn get(&self, id: u32) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.id == id)
    }

    /// Like [`BoundarySet::get`], but a missing municipality is an error.
    pub fn require(&self, id: u32) -> Result<&Boundary, BoundaryError> {
        self.get(id).ok_or(BoundaryError::UnknownMunicipality {
            state: self.state,
            municipality: id,
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.boundaries.iter().map(|b| b.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.iter()
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

fn declared_crs(collection: &FeatureCollection) -> Result<Option<Crs>, BoundaryError> {
    let name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(JsonValue::as_str);
    name.map(Crs::from_name).transpose()
}

fn boundary_from_feature(
    state: State,
    index: usize,
    feature: Feature,
    crs: Crs,
) -> Result<Boundary, BoundaryError> {
    // The mesh service sends the code as a string; accept a number as well.
    let id = feature
        .properties
        .as_ref()
        .and_then(|props| props.get(CODE_PROPERTY))
        .and_then(|value| match value {
            JsonValue::String(s) => s.parse::<u32>().ok(),
            JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        })
        .ok_or(BoundaryError::MissingCode { state, index })?;

    let geometry = feature.geometry.ok_or(BoundaryError::NotPolygonal(id))?;
    let geometry: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|_| BoundaryError::NotPolygonal(id))?;
    let geometry = match geometry {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        _ => return Err(BoundaryError::NotPolygonal(id)),
    };

    Ok(Boundary { id, geometry, crs })
}
