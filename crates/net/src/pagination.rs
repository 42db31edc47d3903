//! Cursor-based listing
//!
//! The lister knows nothing about HTTP: it asks a page fetcher for the page
//! at a URL and follows the returned cursor until there is none.

use provmirror_errors::Error;
use std::future::Future;

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absolute URL of the next page
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Walk every page starting at `start`, concatenating items in page order
///
/// # Errors
///
/// Returns the first page failure unchanged.
pub async fn list_all<T, F, Fut>(start: impl Into<String>, mut fetch_page: F) -> Result<Vec<T>, Error>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut items = Vec::new();
    let mut next = Some(start.into());
    let mut pages = 0usize;

    while let Some(url) = next.take() {
        let page = fetch_page(url).await?;
        pages += 1;
        items.extend(page.items);
        next = page.next;
    }

    tracing::debug!(pages, items = items.len(), "listing complete");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use provmirror_errors::NetworkError;
    use std::collections::HashMap;

    #[tokio::test]
    async fn follows_cursor_in_order() {
        let pages: HashMap<&str, Page<u32>> = HashMap::from([
            (
                "p1",
                Page {
                    items: vec![1, 2],
                    next: Some("p2".into()),
                },
            ),
            (
                "p2",
                Page {
                    items: vec![3],
                    next: Some("p3".into()),
                },
            ),
            ("p3", Page::last(vec![4, 5])),
        ]);

        let mut visited = Vec::new();
        let items = list_all("p1", |url| {
            visited.push(url.clone());
            let page = pages[url.as_str()].clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(visited, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn first_failure_is_propagated() {
        let mut calls = 0;
        let result: Result<Vec<u32>, Error> = list_all("p1", |url| {
            calls += 1;
            async move {
                if url == "p1" {
                    Ok(Page {
                        items: vec![1],
                        next: Some("p2".into()),
                    })
                } else {
                    Err(NetworkError::Timeout { url }.into())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Network(NetworkError::Timeout { .. }))));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn empty_listing() {
        let items: Vec<u32> = list_all("p1", |_| async { Ok(Page::last(Vec::new())) })
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
