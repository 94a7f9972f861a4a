//! Product listing request model.
//!
//! A listing request is three independent parts:
//!
//! - [`CatalogFilter`] - an AND of typed [`CatalogPredicate`] clauses
//! - [`ProductOrder`] - a sort key from a closed set
//! - [`PageRequest`] - a 1-based page number and page size
//!
//! None of these know about SQL. The storefront renders them into a
//! parameterized query; keeping them here lets the rules (which filters are
//! vacuous, which sort keys exist, where a page window starts) be tested
//! without a database.

mod filter;
mod order;
mod page;

pub use filter::{CatalogFilter, CatalogPredicate};
pub use order::{OrderError, ProductOrder, SortKey};
pub use page::{PageError, PageRequest};

/// A complete product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Conjunction of predicates every returned product satisfies.
    pub filter: CatalogFilter,
    /// Sort order of the full result set, before slicing.
    pub order: ProductOrder,
    /// Window into the ordered result set.
    pub page: PageRequest,
}

impl CatalogQuery {
    /// Unfiltered catalog in id order.
    #[must_use]
    pub fn all(page: PageRequest) -> Self {
        Self {
            filter: CatalogFilter::default(),
            order: ProductOrder::default(),
            page,
        }
    }
}
