use crate::cache::MemoCache;
use crate::fetch::get_text;
use crate::geography::error::BoundaryError;
use crate::types::boundary::BoundarySet;
use crate::types::state::State;
use log::info;
use reqwest::Client;
use tokio::sync::Mutex;

/// Fetches municipality outlines for a whole state from the IBGE mesh API.
pub struct BoundaryFetcher {
    client: Client,
    base_url: String,
    cache: Mutex<MemoCache<State, BoundarySet>>,
}

impl BoundaryFetcher {
    pub fn new(client: Client, base_url: &str, cache_capacity: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(MemoCache::new(cache_capacity)),
        }
    }

    pub(crate) fn url(&self, state: State) -> String {
        format!("{}/api/v4/malhas/estados/{}", self.base_url, state)
    }

    /// Returns the boundaries of every municipality of `state`.
    ///
    /// Any failure is final for this selection; nothing is retried and
    /// failures are not memoized.
    pub async fn fetch(&self, state: State) -> Result<BoundarySet, BoundaryError> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&state) {
                info!("Memo hit for {} boundaries", state);
                return Ok(cached);
            }
        }

        let url = self.url(state);
        let text = get_text(
            &self.client,
            &url,
            &[
                ("formato", "application/vnd.geo+json"),
                ("intrarregiao", "Municipio"),
                ("qualidade", "intermediaria"),
            ],
        )
        .await
        .map_err(|source| BoundaryError::Fetch { state, source })?;

        let set = BoundarySet::from_geojson(state, &text)?;
        info!("Loaded {} municipality boundaries for {}", set.len(), state);

        self.cache.lock().await.insert(state, set.clone());
        Ok(set)
    }
}
