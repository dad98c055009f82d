use tracing::{debug, warn};

use crate::{
    models::state::PageResult,
    pipeline::page_fetcher::PageFetcher,
    utils::errors::StateResult,
};

/// Walks every page of a listing in order. All or nothing: the first
/// failed page aborts the walk and nothing collected so far is returned.
pub struct Paginator<F: PageFetcher> {
    fetcher: F,
}

impl<F: PageFetcher> Paginator<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn collect_all(&self) -> StateResult<Vec<F::Item>> {
        let first = self.fetcher.fetch_page(1)?;
        self.collect_from(first)
    }

    /// Continues a walk whose first page has already been fetched.
    pub fn collect_from(&self, first: PageResult<F::Item>) -> StateResult<Vec<F::Item>> {
        let total_pages = first.total_pages;
        let mut items = first.items;
        debug!("Listing {} spans {} page(s)", self.fetcher.kind(), total_pages);

        for page in 2..=total_pages {
            let next = self.fetcher.fetch_page(page)?;
            debug!(
                "Fetched page {}/{} of {}",
                next.current_page,
                total_pages,
                self.fetcher.kind()
            );
            if next.total_pages != total_pages {
                warn!(
                    "Listing {} changed from {} to {} pages mid-walk",
                    self.fetcher.kind(),
                    total_pages,
                    next.total_pages
                );
            }
            items.extend(next.items);
        }

        Ok(items)
    }
}
