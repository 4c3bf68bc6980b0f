use crate::errors::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&page_size=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// A resolved page: 1-based number and size within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageParams {
    /// Apply defaults; `page_size` is clamped to [`MAX_PAGE_SIZE`] and 0
    /// falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn resolve(&self) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::BadRequest("Invalid page.".to_string()));
        }

        let size = match self.page_size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };

        Ok(PageRequest { page, size })
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }
}

/// One page of results with links to its neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page for `path`, which must not already carry a query string
    /// other than `extra_query` (e.g. `"q=site"`).
    ///
    /// A page past the end is a 404, except page 1 of an empty list.
    pub fn new(
        path: &str,
        extra_query: Option<&str>,
        request: PageRequest,
        count: i64,
        results: Vec<T>,
    ) -> Result<Self, AppError> {
        if request.page > 1 && request.offset() >= count {
            return Err(AppError::NotFound("Invalid page.".to_string()));
        }

        let link = |page: u32| {
            let mut url = format!("{}?", path);
            if let Some(extra) = extra_query.filter(|q| !q.is_empty()) {
                url.push_str(extra);
                url.push('&');
            }
            url.push_str(&format!("page={}&page_size={}", page, request.size));
            url
        };

        let next = (request.offset() + request.limit() < count).then(|| link(request.page + 1));
        let previous = (request.page > 1).then(|| link(request.page - 1));

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }
}
