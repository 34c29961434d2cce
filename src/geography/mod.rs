pub mod boundary_fetcher;
pub mod directory_fetcher;
pub mod error;
