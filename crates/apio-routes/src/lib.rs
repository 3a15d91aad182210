//! # Apio Routes
//!
//! The request side of a resource: which functions answer single item,
//! collection page, filtered page and binary requests for a model type.
//!
//! - [`Routes`] / [`RoutesBuilder`] - Per-resource table of request functions
//! - [`Pagination`], [`PageItems`], [`Page`] - Collection paging
//! - [`SingleModel`] - Result of a single item request
//! - [`Filter`], [`FilterParams`] - Typed filters over raw query parameters

#![doc(html_root_url = "https://docs.rs/apio-routes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod filter;
mod identifier;
mod pagination;
mod routes;

pub use filter::{Filter, FilterParams};
pub use identifier::parse_identifier;
pub use pagination::{
    Page, PageItems, Pagination, PaginationDefaults, SingleModel, ITEMS_PER_PAGE_PARAM,
    PAGE_NUMBER_PARAM,
};
pub use routes::{FilteredPageFunction, PageFunction, Routes, RoutesBuilder, SingleModelFunction};
