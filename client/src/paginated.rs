//! One page of a listing, with explicit navigation to its neighbours.

use crate::error::Result;
use crate::node::Node;
use crate::transport::Request;
use contacthub_engine::{PageInfo, Tree};
use std::ops::Index;

/// Elements of the current page plus what is needed to fetch the others.
///
/// Navigation never mutates the list; it re-issues the original request
/// with another page number and returns a new list.
#[derive(Debug, Clone)]
pub struct PaginatedList<T> {
    elements: Vec<T>,
    page: PageInfo,
    node: Node,
    request: Request,
    convert: fn(Tree) -> T,
}

impl<T> PaginatedList<T> {
    pub(crate) fn new(
        elements: Vec<T>,
        page: PageInfo,
        node: Node,
        request: Request,
        convert: fn(Tree) -> T,
    ) -> Self {
        Self {
            elements,
            page,
            node,
            request,
            convert,
        }
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page
    }

    /// Current page number, from 0.
    pub fn number(&self) -> u64 {
        self.page.number
    }

    /// Page size as reported by the API.
    pub fn size(&self) -> u64 {
        self.page.size
    }

    pub fn total_pages(&self) -> u64 {
        self.page.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.page.total_elements
    }

    /// Fetch the following page. Fails on the last page.
    pub fn next_page(&self) -> Result<Self> {
        let number = self.page.next_number()?;
        self.fetch(number)
    }

    /// Fetch the preceding page. Fails on the first page.
    pub fn previous_page(&self) -> Result<Self> {
        let number = self.page.previous_number()?;
        self.fetch(number)
    }

    fn fetch(&self, number: u64) -> Result<Self> {
        let request = self.request.clone().with_param("page", number);
        self.node.fetch_page(request, self.convert)
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }
}

impl<T> Index<usize> for PaginatedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<'a, T> IntoIterator for &'a PaginatedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
