use serde::Deserialize;
use utoipa::ToSchema;

const fn default_page() -> u64 {
    1
}

#[derive(Debug, Deserialize, ToSchema, PartialEq, Eq, Clone, Copy)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    pub page_size: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_default_page_size(default_page())
    }
}

impl Pagination {
    pub fn with_default_page_size(page: u64) -> Self {
        Self {
            page,
            page_size: None,
        }
    }

    pub fn with_page_size(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size: Some(page_size),
        }
    }

    pub fn page_size_or(&self, default_page_size: u64) -> u64 {
        self.page_size.unwrap_or(default_page_size)
    }

    /// Number of records to skip to reach the requested page. Pages start at 1, page 0 is treated as 1.
    pub fn offset(&self, default_page_size: u64) -> Option<u64> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.page_size_or(default_page_size))
    }
}
