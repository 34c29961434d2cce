use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to plot for '{0}'")]
    NoData(&'static str),

    #[error("Failed to build chart table: {0}")]
    Table(#[from] PolarsError),

    #[error("Failed to serialize map geometry")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to create output directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    Write(PathBuf, #[source] std::io::Error),
}
