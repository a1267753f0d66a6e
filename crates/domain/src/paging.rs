use rentdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Largest page size the client asks for.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Zero-based page request sent to list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Creates a validated page request.
    pub fn new(page: u32, size: u32) -> AppResult<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }

        Ok(Self { page, size })
    }

    /// Returns the zero-based page index.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the request for the following page.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }
}

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Items in the whole remote collection.
    pub total_elements: u64,
    /// Pages in the whole remote collection.
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Returns whether pages remain after the given request.
    #[must_use]
    pub fn has_more_after(&self, request: PageRequest) -> bool {
        request.page().saturating_add(1) < self.total_pages
    }

    /// Maps every item, keeping the paging counters.
    pub fn try_map<U, E>(self, mapper: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            content: self
                .content
                .into_iter()
                .map(mapper)
                .collect::<Result<Vec<_>, E>>()?,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest};

    #[test]
    fn page_size_bounds_are_enforced() {
        assert!(PageRequest::new(0, 0).is_err());
        assert!(PageRequest::new(0, 501).is_err());
        assert!(PageRequest::new(3, 20).is_ok());
    }

    #[test]
    fn last_page_has_no_successor() {
        let page: Page<u8> = Page {
            content: Vec::new(),
            total_elements: 25,
            total_pages: 3,
        };
        let request = PageRequest::new(1, 10).unwrap_or_else(|_| unreachable!());
        assert!(page.has_more_after(request));
        assert!(!page.has_more_after(request.next()));
    }
}
