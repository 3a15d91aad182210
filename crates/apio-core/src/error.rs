//! Error types for Apio.
//!
//! This module provides the [`ApioError`] type, the single error type threaded
//! through every [`Try`](crate::Try) chain in the framework.
//!
//! # Categories
//!
//! | `ErrorCategory` | Raised when | Status |
//! |---|---|---|
//! | `NotFound` | no routes for a path, no slot of the requested kind, entity absent | 404 |
//! | `BadRequest` | an identifier or filter parameter failed to parse | 400 |
//! | `ServerError` | an extractor or data-layer function failed unexpectedly | 500 |
//! | `Validation` | a builder invariant was violated at startup | 500 |
//! | `NoSuchElement` | internal absence signal, translated before it leaves the core | 500 |
//!
//! Only the transport edge turns an error into a response, once, through
//! [`ApioError::status_code`] and [`ApioError::to_envelope`].

use std::any::Any;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApioError`].
pub type ApioResult<T> = Result<T, ApioError>;

/// Categories of errors for classification and matching.
///
/// [`Try::map_fail_matching`](crate::Try::map_fail_matching) selects failures
/// by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Resource or endpoint not found.
    NotFound,
    /// Malformed request parameter.
    BadRequest,
    /// Unexpected failure inside an extractor or data-layer call.
    ServerError,
    /// Construction-time invariant violation.
    Validation,
    /// Generic absence of an optional value.
    NoSuchElement,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::ServerError | Self::Validation | Self::NoSuchElement => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ServerError => "server_error",
            Self::Validation => "validation",
            Self::NoSuchElement => "no_such_element",
        }
    }
}

/// Standard error type for Apio.
///
/// # Example
///
/// ```
/// use apio_core::{ApioError, ErrorCategory};
///
/// fn find_folder(id: i64) -> Result<String, ApioError> {
///     if id < 0 {
///         return Err(ApioError::not_found_resource("Folder", id.to_string()));
///     }
///     Ok(format!("folder-{id}"))
/// }
///
/// let err = find_folder(-1).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// ```
#[derive(Error, Debug)]
pub enum ApioError {
    /// Resource or endpoint not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// A request parameter could not be parsed.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
        /// The offending parameter, when known.
        parameter: Option<String>,
    },

    /// Unexpected failure while extracting or fetching.
    #[error("Server error: {message}")]
    ServerError {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A builder invariant was violated.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// An optional value was absent.
    #[error("No such element: {what}")]
    NoSuchElement {
        /// What was looked up.
        what: String,
    },
}

impl ApioError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_type} with ID '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            parameter: None,
        }
    }

    /// Creates a bad request error for a named parameter.
    #[must_use]
    pub fn invalid_parameter(parameter: impl Into<String>, details: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self::BadRequest {
            message: format!("invalid parameter '{parameter}': {}", details.into()),
            parameter: Some(parameter),
        }
    }

    /// Creates a server error.
    #[must_use]
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a server error with a source error.
    pub fn server_error_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::ServerError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates the absence signal for an optional lookup.
    #[must_use]
    pub fn no_such_element(what: impl Into<String>) -> Self {
        Self::NoSuchElement { what: what.into() }
    }

    /// Converts a panic payload into a server error.
    ///
    /// Extractor functions are supplied by resource authors; a panic inside
    /// one is reported like any other unexpected failure.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::server_error(format!("extractor panicked: {detail}"))
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::BadRequest { .. } => ErrorCategory::BadRequest,
            Self::ServerError { .. } => ErrorCategory::ServerError,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NoSuchElement { .. } => ErrorCategory::NoSuchElement,
        }
    }

    /// Returns `true` if this error belongs to `category`.
    #[must_use]
    pub fn is(&self, category: ErrorCategory) -> bool {
        self.category() == category
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::ServerError { .. } | Self::NoSuchElement { .. } => "SERVER_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound {
                resource_type: Some(rt),
                resource_id: Some(rid),
                ..
            } => Some(serde_json::json!({
                "resource_type": rt,
                "resource_id": rid
            })),
            Self::BadRequest {
                parameter: Some(parameter),
                ..
            } => Some(serde_json::json!({ "parameter": parameter })),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ApioError {
    fn from(error: std::io::Error) -> Self {
        Self::server_error_with_source("I/O failure", error)
    }
}

/// Serializable error envelope for the transport edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_resource() {
        let error = ApioError::not_found_resource("DigitalDocument", "42");
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_invalid_parameter() {
        let error = ApioError::invalid_parameter("id", "expected integer");
        assert_eq!(error.category(), ErrorCategory::BadRequest);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let details = error.to_envelope().error.details.unwrap();
        assert_eq!(details["parameter"], "id");
    }

    #[test]
    fn test_server_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let error = ApioError::server_error_with_source("cannot open stream", io);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_from_panic_payloads() {
        let error = ApioError::from_panic(Box::new("boom"));
        assert!(error.to_string().contains("boom"));

        let error = ApioError::from_panic(Box::new(String::from("owned boom")));
        assert!(error.to_string().contains("owned boom"));

        let error = ApioError::from_panic(Box::new(7_u8));
        assert!(error.is(ErrorCategory::ServerError));
    }

    #[test]
    fn test_error_envelope_serialization() {
        let error = ApioError::not_found("No endpoint found at path people");
        let json = serde_json::to_string(&error.to_envelope()).expect("serialization should work");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("\"category\":\"not_found\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::NotFound,
            ErrorCategory::BadRequest,
            ErrorCategory::ServerError,
            ErrorCategory::Validation,
            ErrorCategory::NoSuchElement,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
