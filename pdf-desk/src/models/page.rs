use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page request sent as `?page=&size=&search=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl PageQuery {
    pub fn first(size: u32) -> Self {
        Self {
            page: 1,
            size,
            search: None,
        }
    }

    /// Same query with a new search term. A new search always starts over at
    /// page 1; blank text clears the search.
    pub fn with_search(&self, search: &str) -> Self {
        Self {
            page: 1,
            size: self.size,
            search: normalize_search(search),
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Query string pairs, omitting an absent search.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

pub(crate) fn normalize_search(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One page of results as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u64,
}

impl<T> PageResult<T> {
    pub fn empty(query: &PageQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: query.page,
            size: query.size,
            pages: 0,
        }
    }

    /// Verify `pages == ceil(total / size)` and `items.len() <= size`.
    pub fn check(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("page size must be positive".to_string());
        }
        if self.page == 0 {
            return Err("page number must be positive".to_string());
        }
        let expected_pages = self.total.div_ceil(u64::from(self.size));
        if self.pages != expected_pages {
            return Err(format!(
                "pages is {} but {} items at {} per page make {}",
                self.pages, self.total, self.size, expected_pages
            ));
        }
        if self.items.len() > self.size as usize {
            return Err(format!(
                "{} items exceed the page size of {}",
                self.items.len(),
                self.size
            ));
        }
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
