//
//  buildkite-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Buildkite REST API
//!
//! This module provides the types shared by every request and resource module:
//! the unified error type, the server's error body, pagination primitives and
//! the builder validation helper.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`ErrorResponse`] / [`FieldError`] - The body Buildkite sends with a rejected request
//! - Pagination types (re-exported from the `pagination` submodule)
//! - [`validation`] - Ordered required-field checks used by every builder
//!
//! # Example
//!
//! ```rust
//! use buildkite_cli::api::common::ApiError;
//!
//! fn describe<T>(result: Result<T, ApiError>) -> String {
//!     match result {
//!         Ok(_) => "ok".to_string(),
//!         Err(ApiError::InvalidRequest { response, .. }) => {
//!             format!("rejected: {} ({} field errors)", response.message, response.errors.len())
//!         }
//!         Err(e) => format!("failed: {e}"),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;
pub mod validation;

pub use pagination::*;

/// Result alias used throughout the API layer.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Unified error type for all Buildkite API operations.
///
/// # Variants
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `BuilderValidation` | A builder's `build()` found a required field missing |
/// | `Parse` | A cursor URL did not contain a usable `page`/`per_page` |
/// | `LinkAbsent` | A paging link accessor was used without the link present |
/// | `Navigation` | A page walk was requested but the link is absent |
/// | `InvalidRequest` | The server answered non-2xx with an error body |
/// | `Http` | The server answered non-2xx with anything else |
/// | `Transport` | The HTTP transport itself failed |
/// | `Json` | A request or response body could not be (de)serialized |
/// | `InvalidBaseUrl` | The configured API base URL is not a URL |
///
/// # Notes
///
/// - Validation and cursor errors are raised before any request is sent
/// - Transport failures are wrapped, never reinterpreted; the original error
///   is reachable through [`std::error::Error::source`]
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field was never supplied before `build()`.
    #[error("{field} is required")]
    BuilderValidation {
        /// Name of the first missing field, in the builder's declared order.
        field: &'static str,
    },

    /// Malformed cursor input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A paging link was read without checking that it exists.
    #[error("No `{0}` link on this page")]
    LinkAbsent(LinkRelation),

    /// A page walk had nowhere to go.
    #[error("Cannot navigate: no `{0}` page")]
    Navigation(LinkRelation),

    /// The server rejected the request and explained why.
    ///
    /// The parsed [`ErrorResponse`] keeps the per-field errors so callers can
    /// inspect them programmatically.
    #[error("Request rejected ({status}): {}", .response.message)]
    InvalidRequest {
        /// HTTP status code of the response.
        status: u16,
        /// The parsed error body.
        response: ErrorResponse,
    },

    /// The server answered with a non-success status and an unrecognised body.
    #[error("API error ({status}): {body}")]
    Http {
        /// HTTP status code of the response.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// The transport failed to deliver the request or read the response.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl ApiError {
    /// Builds the error for a non-success response.
    ///
    /// Bodies shaped like [`ErrorResponse`] become
    /// [`ApiError::InvalidRequest`]; anything else becomes [`ApiError::Http`].
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(response) => Self::InvalidRequest { status, response },
            Err(_) => Self::Http {
                status,
                body: body.to_string(),
            },
        }
    }

    /// The HTTP status code, for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidRequest { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// The body Buildkite returns when it rejects a request.
///
/// ```json
/// {"message": "Validation Failed", "errors": [{"field": "commit", "code": "missing"}]}
/// ```
///
/// A body without `errors` parses to an empty list.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::common::ErrorResponse;
///
/// let response: ErrorResponse = serde_json::from_str(r#"{"message":"Error Happened"}"#).unwrap();
/// assert_eq!(response.message, "Error Happened");
/// assert!(response.errors.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human readable summary of the failure.
    pub message: String,

    /// Field level details, empty when the server sent none.
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The request field that failed validation.
    #[serde(default)]
    pub field: String,

    /// Machine readable failure code, e.g. `missing` or `invalid`.
    #[serde(default)]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_with_field_errors() {
        let response: ErrorResponse = serde_json::from_str(
            r#"{"message":"Validation Failed","errors":[{"field":"commit","code":"missing"}]}"#,
        )
        .unwrap();
        assert_eq!(response.message, "Validation Failed");
        assert_eq!(
            response.errors,
            vec![FieldError {
                field: "commit".to_string(),
                code: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_error_response_without_errors_key() {
        let response: ErrorResponse = serde_json::from_str(r#"{"message":"Error Happened"}"#).unwrap();
        assert_eq!(response.message, "Error Happened");
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_from_response_parses_error_body() {
        let err = ApiError::from_response(422, r#"{"message":"Validation Failed","errors":[{"field":"branch","code":"missing"}]}"#);
        match err {
            ApiError::InvalidRequest { status, response } => {
                assert_eq!(status, 422);
                assert_eq!(response.errors[0].field, "branch");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_response_falls_back_to_generic() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::from_response(404, r#"{"message":"No build found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Request rejected (404): No build found");
    }
}
