//
//  buildkite-cli
//  api/resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Buildkite REST API resources
//!
//! One module per resource family. Each module holds the response types, the
//! identifier and options builders, and one request struct per operation.
//!
//! # Modules
//!
//! - [`builds`] - Builds, build filters, create/cancel/rebuild
//! - [`jobs`] - Job retry and unblock, bulk retry options
//! - [`pipelines`] - Pipelines
//! - [`organizations`] - Organizations and custom emojis
//! - [`annotations`] - Build annotations
//! - [`account`] - Access token, user, meta and ping

pub mod account;
pub mod annotations;
pub mod builds;
pub mod jobs;
pub mod organizations;
pub mod pipelines;

pub use account::*;
pub use annotations::*;
pub use builds::*;
pub use jobs::*;
pub use organizations::*;
pub use pipelines::*;
