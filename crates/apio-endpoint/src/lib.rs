//! # Apio Endpoint
//!
//! Turns resource declarations into something requests can be dispatched
//! against.
//!
//! - [`Resource`] - An author's declaration of path, representor and routes
//! - [`ResourceRegistry`] - Two-phase startup assembly of every resource
//! - [`RoutesResolver`], [`RoutesTable`] - Path to routes lookup
//! - [`RootEndpoint`] - Dispatch of item, page, filtered page and binary
//!   requests
//!
//! Dispatch is synchronous and returns [`Try`](apio_core::Try) values. Each
//! dispatch emits a `tracing` event and records the `apio_dispatch_total`
//! counter and `apio_dispatch_duration_seconds` histogram.

#![doc(html_root_url = "https://docs.rs/apio-endpoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod registry;
mod resolver;
mod resource;
mod root;

pub use registry::{ResourceRegistry, ResourceRegistryBuilder};
pub use resolver::{resolve_routes, ErasedRoutes, RoutesResolver, RoutesTable};
pub use resource::Resource;
pub use root::{no_endpoint, RootEndpoint};
