//! The federative units (UF) that can be selected as a region.

use crate::error::MuniClimaError;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A Brazilian state or the Federal District, identified by its UF abbreviation.
///
/// Parsing is case-insensitive, so `"mt"` and `"MT"` both resolve to
/// [`State::MT`]. Anything else is not a supported region code.
///
/// # Examples
///
/// ```
/// use municlima::State;
///
/// let state: State = "mt".parse().unwrap();
/// assert_eq!(state, State::MT);
/// assert_eq!(state.ibge_code(), 51);
/// assert_eq!(state.to_string(), "MT");
/// assert!("XX".parse::<State>().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum State {
    AC,
    AL,
    AM,
    AP,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MG,
    MS,
    MT,
    PA,
    PB,
    PE,
    PI,
    PR,
    RJ,
    RN,
    RO,
    RR,
    RS,
    SC,
    SE,
    SP,
    TO,
}

impl State {
    /// Two-digit IBGE code of the state; municipality codes start with it.
    pub fn ibge_code(self) -> u8 {
        match self {
            State::RO => 11,
            State::AC => 12,
            State::AM => 13,
            State::RR => 14,
            State::PA => 15,
            State::AP => 16,
            State::TO => 17,
            State::MA => 21,
            State::PI => 22,
            State::CE => 23,
            State::RN => 24,
            State::PB => 25,
            State::PE => 26,
            State::AL => 27,
            State::SE => 28,
            State::BA => 29,
            State::MG => 31,
            State::ES => 32,
            State::RJ => 33,
            State::SP => 35,
            State::PR => 41,
            State::SC => 42,
            State::RS => 43,
            State::MS => 50,
            State::MT => 51,
            State::GO => 52,
            State::DF => 53,
        }
    }

    /// Whether a seven-digit municipality code belongs to this state.
    pub fn contains_municipality(self, code: u32) -> bool {
        code / 100_000 == u32::from(self.ibge_code())
    }

    /// Parses a UF abbreviation, reporting the rejected input on failure.
    pub fn from_code(code: &str) -> Result<State, MuniClimaError> {
        code.trim()
            .parse()
            .map_err(|_| MuniClimaError::UnknownState(code.to_string()))
    }

    /// All supported states in alphabetical order.
    pub fn all() -> impl Iterator<Item = State> {
        State::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_states_have_distinct_codes() {
        let codes: HashSet<u8> = State::all().map(State::ibge_code).collect();
        assert_eq!(State::all().count(), 27);
        assert_eq!(codes.len(), 27);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("sp".parse::<State>().unwrap(), State::SP);
        assert_eq!("Rj".parse::<State>().unwrap(), State::RJ);
        assert!("".parse::<State>().is_err());
        assert!("BR".parse::<State>().is_err());
        assert_eq!(State::from_code(" go ").unwrap(), State::GO);
        assert!(matches!(
            State::from_code("BR"),
            Err(MuniClimaError::UnknownState(code)) if code == "BR"
        ));
    }

    #[test]
    fn test_contains_municipality() {
        assert!(State::MT.contains_municipality(5_103_403)); // Cuiabá
        assert!(!State::SP.contains_municipality(5_103_403));
    }
}
