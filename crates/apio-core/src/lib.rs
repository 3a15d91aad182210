//! # Apio Core
//!
//! Core types shared by every Apio crate:
//!
//! - [`Try`] - Success/failure value threaded through every dispatch
//! - [`ApioError`] - Standard error type, classified by [`ErrorCategory`]
//! - [`ResourceType`] - Runtime tag naming an entity or identifier type
//! - [`AnyValue`] - Type-erased value produced by relation extractors
//! - [`BinaryStream`] - Unread binary content handed to the transport

#![doc(html_root_url = "https://docs.rs/apio-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod functional;
mod types;

pub use error::{ApioError, ApioResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use functional::Try;
pub use types::{AnyValue, BinaryFunction, BinaryStream, ResourceType};
