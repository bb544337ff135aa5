//! Page metadata of paginated listings.

use crate::error::{Error, Result};
use crate::Tree;
use serde::{Deserialize, Serialize};

/// Position of one page within a listing. Pages are numbered from 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Page size requested
    pub size: u64,
    /// Elements matching the request
    pub total_elements: u64,
    /// Elements before filtering
    #[serde(default)]
    pub total_unfiltered_elements: u64,
    pub total_pages: u64,
    /// Current page number
    pub number: u64,
}

impl PageInfo {
    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }

    /// Number of the following page.
    pub fn next_number(&self) -> Result<u64> {
        if self.is_last() {
            return Err(Error::OperationNotPermitted("Last page reached".to_string()));
        }
        Ok(self.number + 1)
    }

    /// Number of the preceding page.
    pub fn previous_number(&self) -> Result<u64> {
        if self.is_first() {
            return Err(Error::OperationNotPermitted("First page reached".to_string()));
        }
        Ok(self.number - 1)
    }
}

/// A page as returned by listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub elements: Vec<Tree>,
    pub page: PageInfo,
}
