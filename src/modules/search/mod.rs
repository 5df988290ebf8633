pub mod client;
pub mod fetcher;
pub mod models;
pub mod query;

pub use client::{HttpSearchBackend, SearchBackend};
pub use fetcher::PageFetcher;
pub use models::{Record, SearchHit};
