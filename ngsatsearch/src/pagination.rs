//! Paged result aggregation.
//!
//! The first page carries the provider's total-result count; remaining pages
//! are requested at increasing zero-based offsets and concatenated in request
//! order. Providers already sort by acquisition time, so no re-sort happens.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::CatalogResult;
use crate::scene::SceneIdentifier;

/// Results per page used by every backend.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Total number of results the provider reports for the whole query.
    pub total: usize,
    pub identifiers: Vec<SceneIdentifier>,
}

/// Something that can fetch one page of an already-built query.
pub trait PageSource {
    /// Fetches `rows` results starting at zero-based `offset`.
    fn fetch_page(&self, offset: usize, rows: usize) -> CatalogResult<Page>;
}

impl<F> PageSource for F
where
    F: Fn(usize, usize) -> CatalogResult<Page>,
{
    fn fetch_page(&self, offset: usize, rows: usize) -> CatalogResult<Page> {
        self(offset, rows)
    }
}

/// Drives a [`PageSource`] until every result is collected.
#[derive(Debug, Clone, Copy)]
pub struct PaginatedSearch {
    page_size: usize,
}

impl Default for PaginatedSearch {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginatedSearch {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Collects all identifiers, dropping repeats while keeping the first
    /// occurrence in server order.
    pub fn collect<S: PageSource + ?Sized>(&self, source: &S) -> CatalogResult<Vec<SceneIdentifier>> {
        let first = source.fetch_page(0, self.page_size)?;
        let total = first.total;
        debug!(total, page_size = self.page_size, "first page received");

        let mut seen = HashSet::new();
        let mut identifiers = Vec::with_capacity(first.identifiers.len());
        append_unique(&mut identifiers, &mut seen, first.identifiers);

        let mut offset = self.page_size;
        while offset < total {
            let page = source.fetch_page(offset, self.page_size)?;
            debug!(offset, received = page.identifiers.len(), "page received");
            if page.identifiers.is_empty() {
                warn!(offset, total, "provider returned an empty page before the reported total");
                break;
            }
            append_unique(&mut identifiers, &mut seen, page.identifiers);
            offset += self.page_size;
        }

        Ok(identifiers)
    }
}

fn append_unique(
    out: &mut Vec<SceneIdentifier>,
    seen: &mut HashSet<SceneIdentifier>,
    page: Vec<SceneIdentifier>,
) {
    for identifier in page {
        if seen.insert(identifier.clone()) {
            out.push(identifier);
        }
    }
}
