use crate::cache::MemoCache;
use crate::fetch::get_text;
use crate::geography::error::{DirectoryFailure, SoftFetchFailure};
use crate::types::municipality::Municipality;
use crate::types::state::State;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Entry of the IBGE localities listing; the nested region data is ignored.
#[derive(Debug, Deserialize)]
struct RawMunicipality {
    id: u32,
    nome: String,
}

/// Municipalities of a state, possibly empty because the listing failed.
#[derive(Debug, Clone)]
pub struct Directory {
    pub state: State,
    pub municipalities: Vec<Municipality>,
    /// Set when the list is empty because the request failed.
    pub failure: Option<std::sync::Arc<SoftFetchFailure>>,
}

impl Directory {
    pub fn by_name(&self, name: &str) -> Option<&Municipality> {
        self.municipalities.iter().find(|m| m.name == name)
    }

    pub fn by_id(&self, id: u32) -> Option<&Municipality> {
        self.municipalities.iter().find(|m| m.id == id)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.municipalities.iter().map(|m| m.name.as_str())
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Lists the municipalities of a state from the IBGE localities API.
pub struct DirectoryFetcher {
    client: Client,
    base_url: String,
    cache: Mutex<MemoCache<State, Vec<Municipality>>>,
}

impl DirectoryFetcher {
    pub fn new(client: Client, base_url: &str, cache_capacity: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(MemoCache::new(cache_capacity)),
        }
    }

    pub(crate) fn url(&self, state: State) -> String {
        format!(
            "{}/api/v1/localidades/estados/{}/municipios",
            self.base_url, state
        )
    }

    /// Returns the municipalities of `state` in the order the service lists them.
    ///
    /// Never fails: when the listing cannot be obtained the directory is empty
    /// and carries a [`SoftFetchFailure`] describing why.
    pub async fn fetch(&self, state: State) -> Directory {
        {
            let mut cache = self.cache.lock().await;
            if let Some(municipalities) = cache.get(&state) {
                info!("Memo hit for {} municipality list", state);
                return Directory {
                    state,
                    municipalities,
                    failure: None,
                };
            }
        }

        match self.try_fetch(state).await {
            Ok(municipalities) => {
                info!("Listed {} municipalities for {}", municipalities.len(), state);
                self.cache
                    .lock()
                    .await
                    .insert(state, municipalities.clone());
                Directory {
                    state,
                    municipalities,
                    failure: None,
                }
            }
            Err(reason) => {
                let failure = SoftFetchFailure { state, reason };
                warn!("{}; continuing with an empty list", failure);
                Directory {
                    state,
                    municipalities: Vec::new(),
                    failure: Some(std::sync::Arc::new(failure)),
                }
            }
        }
    }

    async fn try_fetch(&self, state: State) -> Result<Vec<Municipality>, DirectoryFailure> {
        let text = get_text(&self.client, &self.url(state), &[] as &[(&str, &str)]).await?;
        let raw: Vec<RawMunicipality> = serde_json::from_str(&text)?;
        Ok(raw
            .into_iter()
            .map(|m| Municipality {
                id: m.id,
                name: m.nome,
                state,
            })
            .collect())
    }
}
