//
//  buildkite-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Buildkite CLI Library
//!
//! A typed client for the Buildkite REST API and the `bk` command-line tool
//! built on top of it.
//!
//! ## Overview
//!
//! The library turns typed, validated options into API requests, sends them
//! through a pluggable transport, and parses responses into strongly-typed
//! records. List endpoints come back as pages carrying their `Link` header
//! cursors, so callers can walk forward, backward, or jump to either end
//! without re-supplying filters.
//!
//! ## Module Structure
//!
//! - [`api`]: Requests, resources, pagination and the [`BuildkiteClient`](api::BuildkiteClient)
//! - [`cli`]: Command-line interface definitions using clap
//! - [`config`]: Configuration file management
//! - [`output`]: Output formatting (table and JSON)
//! - [`util`]: Formatting helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use buildkite_cli::api::BuildkiteClient;
//! use buildkite_cli::api::resources::{
//!     BuildFilters, BuildState, ListBuildsRequest, OrganizationIdentifier,
//! };
//! use buildkite_cli::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = Config::load()?;
//! config.apply_env();
//! let client = BuildkiteClient::from_config(&config)?;
//!
//! let filters = BuildFilters::builder().state(BuildState::Failed).build();
//! let failed = client
//!     .retrieve_all_pages(ListBuildsRequest::for_organization(
//!         OrganizationIdentifier::new("acme")?,
//!         filters,
//!     ))
//!     .await?;
//! println!("{} failed builds", failed.len());
//! # Ok(())
//! # }
//! ```

/// API client, request descriptors and resources.
pub mod api;

/// Command-line interface definitions.
pub mod cli;

/// Configuration file management.
///
/// - Linux: `~/.config/bk/config.toml`
/// - macOS: `~/Library/Application Support/bk/config.toml`
/// - Windows: `%APPDATA%\bk\config.toml`
pub mod config;

/// Output formatting for tables and JSON.
pub mod output;

/// Utility functions and helpers.
pub mod util;

pub use cli::Cli;
pub use config::Config;

/// Application name, used for the binary and the configuration directory.
pub const APP_NAME: &str = "bk";

/// The current version of the CLI, from Cargo.toml.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::VERSION;
///
/// println!("bk version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Example
///
/// ```rust,no_run
/// use buildkite_cli::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::NOT_FOUND);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The API rejected the token (401/403).
    pub const AUTH_ERROR: i32 = 4;

    /// The requested resource does not exist (404).
    pub const NOT_FOUND: i32 = 8;

    /// A bulk operation finished with some items failed.
    pub const PARTIAL_FAILURE: i32 = 16;

    /// API rate limit exceeded (429).
    pub const RATE_LIMIT: i32 = 32;
}
