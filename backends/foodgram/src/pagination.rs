use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,  // <- if not set, is 1
    pub limit: Option<i64>, // <- if not set, is the configured page size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn new(params: PageParams, default_size: i64) -> Self {
        let size = params.limit.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE);
        let number = params.page.unwrap_or(1).max(1);
        Self { number, size }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub results: Vec<T>,
}
