//! # Apio
//!
//! **Declarative hypermedia resources with path-based dispatch**
//!
//! Each domain type is described once as a resource:
//!
//! - a **representor**, the fields, links, related models and related
//!   collections a renderer exposes for it
//! - **routes**, the functions answering single item, page, filtered page
//!   and binary requests
//!
//! The [`ResourceRegistry`](endpoint::ResourceRegistry) assembles every
//! resource at startup and wires bidirectional relations between them. The
//! [`RootEndpoint`](endpoint::RootEndpoint) then resolves a path and an
//! identifier to the right function, reporting every failure as a typed
//! [`ApioError`](core::ApioError) inside a [`Try`](core::Try).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apio::prelude::*;
//!
//! let config = ConfigLoader::new().with_env_prefix("APIO").load()?;
//! init_telemetry(&config.telemetry.to_telemetry_config())?;
//!
//! let registry = ResourceRegistry::builder()
//!     .resource(FolderResource::new(store.clone()))
//!     .resource(DocumentResource::new(store))
//!     .build()?;
//! let endpoint = RootEndpoint::new(registry);
//!
//! let page = endpoint.collection_page::<Folder>("folders", Pagination::default());
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! path ─► RoutesResolver ─► Routes<T> ─► slot ─► author function ─► Try<_>
//!            (absent)         (wrong T)   (empty)      (Err / panic)
//!               └──────── NotFound ─────────┘      BadRequest / ServerError
//! ```

#![doc(html_root_url = "https://docs.rs/apio/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Errors, Try and type tags
pub use apio_core as core;

// Representation model
pub use apio_representor as representor;

// Per-resource request functions
pub use apio_routes as routes;

// Registry and dispatcher
pub use apio_endpoint as endpoint;

// Configuration
pub use apio_config as config;

// Logging and metrics
pub use apio_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use apio::prelude::*;
///
/// let pagination = Pagination::new(10, 2);
/// assert_eq!(pagination.start_position(), 10);
/// ```
pub mod prelude {
    pub use apio_core::{
        ApioError, ApioResult, BinaryFunction, BinaryStream, ErrorCategory, ResourceType, Try,
    };

    pub use apio_representor::{
        Language, Number, RelatedCollection, RelatedModel, RelationKind, Representor,
        RepresentorBuilder,
    };

    pub use apio_routes::{
        Filter, FilterParams, Page, PageItems, Pagination, PaginationDefaults, Routes,
        RoutesBuilder, SingleModel,
    };

    pub use apio_endpoint::{
        Resource, ResourceRegistry, RootEndpoint, RoutesResolver, RoutesTable,
    };

    pub use apio_config::{ApioConfig, ConfigError, ConfigLoader};

    pub use apio_telemetry::{init_telemetry, TelemetryConfig};
}
