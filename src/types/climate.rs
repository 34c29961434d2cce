use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Represents a geographical coordinate as longitude and latitude in degrees.
///
/// Longitude is the first element (index 0), and latitude is the second
/// (index 1), matching the x/y order of the boundary geometries.
///
/// # Examples
///
/// ```
/// use municlima::LonLat;
///
/// let cuiaba = LonLat(-56.0967, -15.6014);
/// assert_eq!(cuiaba.lon(), -56.0967);
/// assert_eq!(cuiaba.lat(), -15.6014);
/// assert!(cuiaba.is_valid());
/// assert!(!LonLat(200.0, 0.0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat(pub f64, pub f64);

impl LonLat {
    pub fn lon(self) -> f64 {
        self.0
    }

    pub fn lat(self) -> f64 {
        self.1
    }

    /// Whether both components are finite and inside the geographic range.
    pub fn is_valid(self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-180.0..=180.0).contains(&self.0)
            && (-90.0..=90.0).contains(&self.1)
    }

    /// Bit-exact key so coordinates can take part in request memoization.
    pub(crate) fn cache_key(self) -> (u64, u64) {
        (self.0.to_bits(), self.1.to_bits())
    }
}

impl Display for LonLat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.0, self.1)
    }
}

/// One day of the climate series.
#[derive(Debug, PartialEq, Clone)]
pub struct ClimateSample {
    pub date: NaiveDate,
    pub precipitation: Option<f64>, // PRECTOTCORR (mm/day)
    pub temperature: Option<f64>,   // T2M (°C)
}

/// The two daily variables requested from the climate service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// Bias-corrected total precipitation, mm/day.
    Precipitation,
    /// Air temperature at 2 meters, daily mean in °C.
    Temperature,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::Precipitation, Variable::Temperature];

    /// Parameter name in the climate service API.
    pub fn parameter(self) -> &'static str {
        match self {
            Variable::Precipitation => "PRECTOTCORR",
            Variable::Temperature => "T2M",
        }
    }

    /// Column name in the daily and aggregated frames.
    pub fn column(self) -> &'static str {
        match self {
            Variable::Precipitation => "prec",
            Variable::Temperature => "temp",
        }
    }

    pub(crate) fn value(self, sample: &ClimateSample) -> Option<f64> {
        match self {
            Variable::Precipitation => sample.precipitation,
            Variable::Temperature => sample.temperature,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parameter())
    }
}
