//! Threadline Core - Shared types library.
//!
//! This crate provides the types used across all Threadline components:
//! - `storefront` - Public JSON API for the catalog, cart, reviews and checkout
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Catalog predicates, sort keys and page windows are
//! described here and rendered into SQL by the storefront.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, review scores and cart quantities
//! - [`catalog`] - Product listing filters, ordering and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::{
    CatalogFilter, CatalogPredicate, CatalogQuery, OrderError, PageError, PageRequest,
    ProductOrder, SortKey,
};
pub use types::*;
