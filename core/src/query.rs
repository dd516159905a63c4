//! Query parameters behind the list view.
//!
//! # Design
//! Setters never fetch anything themselves. Each returns a [`ParamsChanged`]
//! token that the caller (normally the sync controller) must turn into
//! exactly one refetch, so there is no hidden reactivity.

use crate::error::SyncError;

/// Page, search text and deleted toggle for the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    page: u32,
    search: String,
    include_deleted: bool,
}

/// Proof that parameters changed and a refetch is owed.
#[must_use = "a parameter change must be followed by a refetch"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamsChanged;

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            include_deleted: false,
        }
    }
}

impl QueryParams {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn include_deleted(&self) -> bool {
        self.include_deleted
    }

    /// Fails with `InvalidPage` for anything below 1 and leaves the current
    /// page untouched.
    pub fn set_page(&mut self, page: i64) -> Result<ParamsChanged, SyncError> {
        if page < 1 {
            return Err(SyncError::InvalidPage(page));
        }
        self.page = u32::try_from(page).map_err(|_| SyncError::InvalidPage(page))?;
        Ok(ParamsChanged)
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> ParamsChanged {
        self.search = search.into();
        ParamsChanged
    }

    pub fn set_include_deleted(&mut self, include_deleted: bool) -> ParamsChanged {
        self.include_deleted = include_deleted;
        ParamsChanged
    }
}
