//! Route table.
//!
//! # Responsibilities
//! - Hold an app's pages ordered by template specificity
//! - Return the first page whose template matches a path
//!
//! # Design Decisions
//! - Sorted once at construction, never mutated afterwards (shared without locks)
//! - Linear scan, first match wins; correctness rests on the total order of templates

use std::collections::HashMap;

use crate::page::Page;
use crate::routing::UriTemplate;

/// A page matched for a path, with the variables its template extracted.
#[derive(Debug, Clone)]
pub struct RouteMatch<'t> {
    pub page: &'t Page,
    pub variables: HashMap<String, String>,
}

/// Immutable, specificity-ordered collection of pages.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    pages: Vec<Page>,
}

impl RouteTable {
    /// Build a table from pages in any order.
    pub fn new(mut pages: Vec<Page>) -> Self {
        pages.sort_by(|a, b| a.template().compare(b.template()));
        Self { pages }
    }

    /// First page whose template matches `path`.
    pub fn find(&self, path: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.template().matches(path))
    }

    /// Like [`find`](Self::find), also extracting the template variables.
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.pages.iter().find_map(|page| {
            page.template()
                .extract(path)
                .map(|variables| RouteMatch { page, variables })
        })
    }

    /// Templates in the order they are tried.
    pub fn templates(&self) -> impl Iterator<Item = &UriTemplate> {
        self.pages.iter().map(Page::template)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<Page> for RouteTable {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
