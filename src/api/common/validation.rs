//
//  buildkite-cli
//  api/common/validation.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Required-field checks shared by every options builder.
//!
//! Builders accumulate values without checking them and call [`validate`]
//! from `build()` with their requirements in a fixed order. The first unmet
//! requirement wins, so the reported field is deterministic.
//!
//! ```rust
//! use buildkite_cli::api::common::validation::{validate, Requirement};
//! use buildkite_cli::api::common::ApiError;
//!
//! let pipeline = Some("deploy".to_string());
//! let organization: Option<String> = None;
//!
//! let err = validate(&[
//!     Requirement::slug("pipeline", pipeline.as_deref()),
//!     Requirement::slug("organization", organization.as_deref()),
//! ])
//! .unwrap_err();
//!
//! assert!(matches!(err, ApiError::BuilderValidation { field: "organization" }));
//! ```

use super::{ApiError, Result};

/// One named precondition of a builder.
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    field: &'static str,
    satisfied: bool,
}

impl Requirement {
    pub fn new(field: &'static str, satisfied: bool) -> Self {
        Self { field, satisfied }
    }

    /// Satisfied when the value is present.
    pub fn present<T>(field: &'static str, value: Option<&T>) -> Self {
        Self::new(field, value.is_some())
    }

    /// Satisfied when the value is present and not blank.
    pub fn slug(field: &'static str, value: Option<&str>) -> Self {
        Self::new(field, value.is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Runs the requirements in order and reports the first unmet one.
///
/// # Errors
///
/// Returns [`ApiError::BuilderValidation`] naming the first requirement that
/// is not satisfied.
pub fn validate(requirements: &[Requirement]) -> Result<()> {
    match requirements.iter().find(|r| !r.satisfied) {
        Some(unmet) => Err(ApiError::BuilderValidation { field: unmet.field }),
        None => Ok(()),
    }
}
