//! Plain HTTP GET with the status check every fetcher shares.

use log::{info, warn};
use reqwest::{Client, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    Body(String, #[source] reqwest::Error),
}

/// Sends a GET and turns anything but a success status into an error.
pub(crate) async fn get_checked<Q>(
    client: &Client,
    url: &str,
    query: &Q,
) -> Result<Response, FetchError>
where
    Q: Serialize + ?Sized,
{
    info!("Requesting {}", url);

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

    match response.error_for_status() {
        Ok(resp) => Ok(resp),
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            Err(if let Some(status) = e.status() {
                FetchError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                FetchError::NetworkRequest(url.to_string(), e)
            })
        }
    }
}

/// Fetches a URL and returns the body as text.
pub(crate) async fn get_text<Q>(client: &Client, url: &str, query: &Q) -> Result<String, FetchError>
where
    Q: Serialize + ?Sized,
{
    get_checked(client, url, query)
        .await?
        .text()
        .await
        .map_err(|e| FetchError::Body(url.to_string(), e))
}
