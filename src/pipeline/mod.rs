pub mod aggregator;
pub mod downloader;
pub mod driver;
#[cfg(test)]
pub mod mock;
pub mod page_fetcher;
pub mod paginator;
