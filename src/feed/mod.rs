pub mod fetcher;
pub mod parser;

pub use fetcher::{FeedFetcher, FetchOutcome, RawDocument};
