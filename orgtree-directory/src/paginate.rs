//! Draining of paginated listings.

use std::future::Future;

use crate::context::CallContext;
use crate::error::{DirectoryError, DirectoryResult};
use crate::types::{Operation, Page};

/// Fetch every page of a listing and concatenate the items.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's token afterwards, until a page comes back without one. Each page is
/// fetched under `ctx`. The first failing page aborts the listing; failures
/// after the first page are wrapped in [`DirectoryError::Pagination`]. A page
/// handing back the token it was requested with is an
/// [`DirectoryError::InvalidResponse`].
///
/// # Example
///
/// ```rust,no_run
/// use orgtree_directory::{collect_pages, CallContext, DirectoryClient, Operation};
///
/// async fn roots(client: &dyn DirectoryClient) {
///     let ctx = CallContext::new();
///     let roots = collect_pages(&ctx, Operation::ListRoots, |token| client.list_roots(token))
///         .await
///         .unwrap();
///     println!("{} roots", roots.len());
/// }
/// ```
pub async fn collect_pages<T, F, Fut>(
    ctx: &CallContext,
    operation: Operation,
    mut fetch: F,
) -> DirectoryResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = DirectoryResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut page = 0usize;

    loop {
        let sent = token.take();
        let current = match ctx.call(operation, fetch(sent.clone())).await {
            Ok(current) => current,
            Err(e) if page == 0 => return Err(e),
            Err(e) => {
                return Err(DirectoryError::Pagination {
                    operation,
                    page,
                    source: Box::new(e),
                })
            }
        };

        page += 1;
        let next = current.next_token().map(str::to_string);
        items.extend(current.items);

        match next {
            Some(next) if sent.as_deref() == Some(next.as_str()) => {
                return Err(DirectoryError::invalid_response(
                    operation,
                    format!("pagination token repeated on page {}: {}", page, next),
                ));
            }
            Some(next) => token = Some(next),
            None => break,
        }
    }

    tracing::trace!(operation = %operation, pages = page, items = items.len(), "Listing drained");
    Ok(items)
}
