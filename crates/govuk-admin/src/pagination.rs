//! Pagination parameters for the GOV.UK pagination component.
//!
//! The list view pages from zero and reports the total number of pages; the
//! component wants 1-indexed page numbers, `previous`/`next` links, and
//! ellipses bridging the gaps in a windowed list of page links.

use serde::Serialize;
use thiserror::Error;

/// Class string attached to every pagination block.
pub const PAGINATION_CLASSES: &str = "govuk-!-text-align-center";

/// Page links shown on each side of the current page.
const PAGES_AROUND_CURRENT: usize = 2;

/// Page counts at or below this are listed in full.
const FULL_LIST_MAX_PAGES: usize = 3;

/// Inputs outside the builder's contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("pagination needs at least one page")]
    NoPages,

    #[error("page {page} is out of range for {total_pages} pages")]
    OutOfRange { page: usize, total_pages: usize },
}

/// A single `previous` or `next` link.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
}

/// One entry of the `items` list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PageItem {
    /// Numbered page link (1-indexed).
    Page {
        number: usize,
        current: bool,
        href: String,
    },
    /// Gap marker between non-consecutive page links.
    Ellipsis { ellipsis: bool },
}

impl PageItem {
    fn page(index: usize, current: usize, href: String) -> Self {
        PageItem::Page {
            number: index + 1,
            current: index == current,
            href,
        }
    }

    fn ellipsis() -> Self {
        PageItem::Ellipsis { ellipsis: true }
    }

    /// Displayed page number, `None` for ellipses.
    pub fn number(&self) -> Option<usize> {
        match self {
            PageItem::Page { number, .. } => Some(*number),
            PageItem::Ellipsis { .. } => None,
        }
    }

    /// Whether this item is the current page.
    pub fn is_current(&self) -> bool {
        matches!(self, PageItem::Page { current: true, .. })
    }

    /// Whether this item is an ellipsis.
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PageItem::Ellipsis { .. })
    }
}

/// The `params` argument of the pagination component.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,

    pub items: Vec<PageItem>,

    pub classes: &'static str,
}

/// Build pagination params for `current` (0-indexed) out of `total_pages`.
///
/// `page_url` is called once for each link emitted, never for pages hidden
/// behind an ellipsis.
pub fn build<F>(
    current: usize,
    total_pages: usize,
    mut page_url: F,
) -> Result<PaginationParams, PaginationError>
where
    F: FnMut(usize) -> String,
{
    if total_pages == 0 {
        return Err(PaginationError::NoPages);
    }
    if current >= total_pages {
        return Err(PaginationError::OutOfRange {
            page: current,
            total_pages,
        });
    }

    let last = total_pages - 1;

    let previous = (current != 0).then(|| PageLink {
        href: page_url(current - 1),
    });
    let next = (current != last).then(|| PageLink {
        href: page_url(current + 1),
    });

    let items = if total_pages <= FULL_LIST_MAX_PAGES {
        (0..total_pages)
            .map(|index| PageItem::page(index, current, page_url(index)))
            .collect()
    } else {
        let mut items = Vec::new();
        let mut previous_index: Option<usize> = None;
        for index in window(current, last) {
            let follows_gap = match previous_index {
                Some(prev) => prev + 1 < index,
                None => index > 0,
            };
            if follows_gap {
                items.push(PageItem::ellipsis());
            }
            items.push(PageItem::page(index, current, page_url(index)));
            previous_index = Some(index);
        }
        items
    };

    Ok(PaginationParams {
        previous,
        next,
        items,
        classes: PAGINATION_CLASSES,
    })
}

/// Sorted, deduplicated page indexes to show around `current`.
fn window(current: usize, last: usize) -> Vec<usize> {
    let mut pages = vec![0, current, last];
    for offset in 1..=PAGES_AROUND_CURRENT {
        pages.push(current.saturating_sub(offset));
        pages.push((current + offset).min(last));
    }
    pages.sort_unstable();
    pages.dedup();
    pages
}
