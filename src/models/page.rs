//! Page-number pagination for list endpoints

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// `?page=N` query string (1-based)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// A validated page of a list with a fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
    pub num_pages: i64,
}

impl PageRequest {
    /// Resolve the requested page against the total number of rows.
    ///
    /// Page 1 always exists, even for an empty list; any other page outside
    /// `1..=num_pages` is not found.
    pub fn resolve(page: Option<i64>, per_page: i64, total: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let num_pages = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): that page contains no results",
                page
            )));
        }

        Ok(Self {
            page,
            per_page,
            num_pages,
        })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// One page of results together with the totals needed to navigate
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}
