//! Paginated list envelope and a walker over every page.

use std::marker::PhantomData;

use futures::Stream;
use serde::Deserialize;
use serde::Serialize;

use crate::PartyRegClient;
use crate::error::Error;
use crate::model::Resource;

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_records: u64,
    pub page_size: u32,
    /// One-based.
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}

/// Which page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// One-based.
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 100;

    pub fn first(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn next(self) -> Self {
        Self {
            page_number: self.page_number + 1,
            ..self
        }
    }

    pub(crate) fn query(self) -> [(&'static str, String); 2] {
        [
            ("page_number", self.page_number.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_SIZE)
    }
}

/// Walks a collection page by page.
///
/// # Example
///
/// ```ignore
/// let mut pages = client.pages::<Party>(50);
/// while let Some(page) = pages.next_page().await? {
///     for party in page {
///         println!("{}", party.location.formatted_address);
///     }
/// }
/// ```
pub struct Pages<R> {
    client: PartyRegClient,
    next: Option<PageRequest>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Pages<R> {
    pub(crate) fn new(client: PartyRegClient, page_size: u32) -> Self {
        Self {
            client,
            next: Some(PageRequest::first(page_size)),
            _resource: PhantomData,
        }
    }

    /// Fetches the next page, or `None` after the last one.
    pub async fn next_page(&mut self) -> Result<Option<Vec<R>>, Error> {
        let Some(request) = self.next else {
            return Ok(None);
        };

        let page = self.client.list_page::<R>(request).await?;
        self.next = (page.has_next() && !page.items.is_empty()).then(|| request.next());
        Ok(Some(page.items))
    }

    /// Every remaining row, in order.
    pub async fn collect_all(mut self) -> Result<Vec<R>, Error> {
        let mut rows = Vec::new();
        while let Some(page) = self.next_page().await? {
            rows.extend(page);
        }
        Ok(rows)
    }

    /// The remaining pages as a stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<R>, Error>> {
        futures::stream::try_unfold(self, |mut pages| async move {
            Ok::<_, Error>(pages.next_page().await?.map(|page| (page, pages)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses() {
        let json = r#"{"items":[1,2,3],"total_records":53,"page_size":25,"page_number":2,"total_pages":3}"#;
        let page: PaginatedResponse<i32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.has_next());

        let last = PaginatedResponse::<i32> {
            page_number: 3,
            ..page
        };
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_request_query() {
        let request = PageRequest::first(25).next();
        assert_eq!(
            request.query(),
            [("page_number", "2".to_string()), ("page_size", "25".to_string())]
        );
        assert_eq!(PageRequest::first(0).page_size, 1);
    }
}
