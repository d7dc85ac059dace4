use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when neither the caller nor the config picks one.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 20;
/// Largest page size the backend accepts.
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Violations of the page invariants detected while building a [`Page`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("page holds {len} items but page size is {page_size}")]
    TooManyItems { len: usize, page_size: u32 },
    #[error("page holds {len} items but total is zero")]
    ItemsWithoutTotal { len: usize },
}

/// One server-returned slice of a resource collection.
///
/// Invariants: `items.len() <= page_size`; `total_pages == ceil(total /
/// page_size)` when `total > 0`, otherwise `total_pages == 1` and `items` is
/// empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Builds a page, recomputing `total_pages` from `total`.
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        if items.len() > page_size as usize {
            return Err(PageError::TooManyItems {
                len: items.len(),
                page_size,
            });
        }
        if total == 0 && !items.is_empty() {
            return Err(PageError::ItemsWithoutTotal { len: items.len() });
        }

        Ok(Self {
            items,
            page: page.max(1),
            page_size,
            total,
            total_pages: Self::total_pages_for(total, page_size),
        })
    }

    /// An empty page carrying the requested position.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: page.max(1),
            page_size: page_size.max(1),
            total: 0,
            total_pages: 1,
        }
    }

    /// Slices a complete collection locally, for endpoints that return a bare
    /// list instead of a page envelope.
    pub fn from_full_list(all: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = all.len() as u64;
        let skip = (page as usize - 1).saturating_mul(page_size as usize);
        let items = all.into_iter().skip(skip).take(page_size as usize).collect();

        Self {
            items,
            page,
            page_size,
            total,
            total_pages: Self::total_pages_for(total, page_size),
        }
    }

    pub fn total_pages_for(total: u64, page_size: u32) -> u32 {
        if total == 0 {
            return 1;
        }
        let pages = total.div_ceil(u64::from(page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` when the requested page lies past the last one.
    pub fn is_past_end(&self) -> bool {
        self.page > self.total_pages
    }

    /// Converts every item, keeping the pagination metadata.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        })
    }

    /// Page numbers for a pager widget; `None` marks an elided gap.
    pub fn links(&self) -> Vec<Option<u32>> {
        get_pages(self.total_pages as usize, self.page as usize, 2, 2, 4, 2)
            .into_iter()
            .map(|page| page.and_then(|p| u32::try_from(p).ok()))
            .collect()
    }
}
