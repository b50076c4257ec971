//! Bounded walking of page-numbered GitHub listings.

use crate::error::Result;
use std::future::Future;
use std::ops::ControlFlow;

/// How a page walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWalk {
    /// Number of non-empty pages handed to the visitor.
    pub pages: u32,
    /// False when `max_pages` was reached before the listing ended.
    pub complete: bool,
}

/// Fetches pages `1..=max_pages` in order, handing each non-empty page to `visit`.
///
/// The walk ends at the first empty page, when `visit` breaks, or at the page
/// cap. A fetch or visit error ends the walk and is returned as is, so an
/// error is never mistaken for the end of the listing.
pub async fn walk_pages<T, F, Fut, V>(
    max_pages: u32,
    mut fetch: F,
    mut visit: V,
) -> Result<PageWalk>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    V: FnMut(Vec<T>) -> Result<ControlFlow<()>>,
{
    for page in 1..=max_pages {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            return Ok(PageWalk {
                pages: page - 1,
                complete: true,
            });
        }

        if visit(batch)?.is_break() {
            return Ok(PageWalk {
                pages: page,
                complete: true,
            });
        }
    }

    Ok(PageWalk {
        pages: max_pages,
        complete: false,
    })
}
