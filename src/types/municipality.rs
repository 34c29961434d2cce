use crate::types::state::State;

/// A municipality as listed by the IBGE localities directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Municipality {
    /// Seven-digit IBGE code (e.g. `5103403` for Cuiabá).
    pub id: u32,
    pub name: String,
    pub state: State,
}
