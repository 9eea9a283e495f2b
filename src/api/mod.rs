//
//  buildkite-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! Typed access to the Buildkite REST API v2 at `api.buildkite.com/v2`.
//!
//! ## Architecture
//!
//! - [`request`]: The [`ApiRequest`](request::ApiRequest) and
//!   [`PageableRequest`](request::PageableRequest) traits plus query parameters
//! - [`resources`]: Response types, identifier builders and one request per operation
//! - [`transport`]: The HTTP seam and its `reqwest` implementation
//! - [`client`]: [`BuildkiteClient`], which sends requests and walks pages
//! - [`common`]: Errors, pagination cursors and links, builder validation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use buildkite_cli::api::BuildkiteClient;
//! use buildkite_cli::api::resources::{BuildIdentifier, PipelineIdentifier};
//! use buildkite_cli::api::transport::ReqwestTransport;
//!
//! # async fn example() -> Result<(), buildkite_cli::api::ApiError> {
//! let transport = ReqwestTransport::new(Some("bkua_token".to_string()), None)?;
//! let client = BuildkiteClient::new("https://api.buildkite.com/v2", Arc::new(transport))?;
//!
//! let build = BuildIdentifier::new(PipelineIdentifier::new("acme", "web")?, 42)?;
//! let build = client.get_build(&build).await?;
//! println!("{} {}", build.number, build.state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiError`]. Builders fail before any request is
//! sent; a non-2xx response becomes `InvalidRequest` when its body carries a
//! Buildkite error message, `Http` otherwise.

/// The Buildkite API client and page walking.
pub mod client;

/// Retrieve-all, newest builds and bulk retry.
mod composite;

/// Errors, pagination primitives and builder validation.
pub mod common;

/// Request descriptors.
pub mod request;

/// Resource types and per-operation requests.
pub mod resources;

/// HTTP transport abstraction.
pub mod transport;

pub use client::BuildkiteClient;
pub use common::{ApiError, PageOptions, PagedResponse, PagingLinks};
