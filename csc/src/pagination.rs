//! Paginated listing with concurrent rendering.
//!
//! A fetch loop walks the continuation tokens strictly in order: fetch N+1 is
//! issued with the token returned by fetch N.  Each fetched page is handed to
//! its own render task and the loop moves on without waiting for it, so the
//! rendering of page N and the fetching of page N+1 overlap.  All of it runs
//! inside one [`TaskGroup`]: the first fetch or render error ends the listing
//! and stops further fetches.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::cancel::Cancellation;
use crate::error::CscError;
use crate::task_group::TaskGroup;

/// Pagination state owned by one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Token for the first fetch; empty starts from the beginning.
    pub starting_token: String,
    /// Page size hint; zero lets the controller decide.
    pub max_entries: u32,
    /// Follow continuation tokens past the first page.
    pub auto_page: bool,
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Empty when there are no further pages.
    pub next_token: String,
}

/// Fetch pages with `fetch` and render every item with `render`.
///
/// `fetch` receives the continuation token for the page to retrieve.  Items
/// of one page are rendered in their original order; items of different
/// pages may be rendered concurrently.
pub async fn paginate<T, F, Fut, R>(
    state: PaginationState,
    mut fetch: F,
    render: R,
    cancel: &Cancellation,
) -> Result<(), CscError>
where
    T: Send + Sync + 'static,
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<T>, CscError>> + Send + 'static,
    R: Fn(&T) -> Result<(), CscError> + Send + Sync + 'static,
{
    let group = TaskGroup::new(cancel.clone());
    let handle = group.handle();
    let render = Arc::new(render);

    group.spawn(async move {
        let mut token = state.starting_token;
        let mut page_no = 0usize;
        loop {
            let page = tokio::select! {
                biased;
                _ = handle.stopped() => return Ok(()),
                page = fetch(token.clone()) => page?,
            };
            page_no += 1;
            debug!(
                page = page_no,
                items = page.items.len(),
                next_token = %page.next_token,
                "fetched page"
            );

            let Page { items, next_token } = page;
            let render = Arc::clone(&render);
            let render_handle = handle.clone();
            handle.spawn(async move {
                for item in &items {
                    if render_handle.is_stopped() {
                        break;
                    }
                    render(item)?;
                }
                Ok(())
            });

            if !state.auto_page || next_token.is_empty() {
                return Ok(());
            }
            token = next_token;
        }
    });

    group.wait().await
}
