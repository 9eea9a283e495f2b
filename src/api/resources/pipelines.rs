//
//  buildkite-cli
//  api/resources/pipelines.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipeline types and requests.
//!
//! A pipeline belongs to an organization and is addressed by the pair of
//! slugs `(organization, pipeline)`, captured by [`PipelineIdentifier`].
//!
//! # Example
//!
//! ```rust
//! use buildkite_cli::api::resources::pipelines::{ListPipelinesRequest, PipelineIdentifier};
//! use buildkite_cli::api::resources::OrganizationIdentifier;
//! use buildkite_cli::api::common::PageOptions;
//! use buildkite_cli::api::request::ApiRequest;
//!
//! let id = PipelineIdentifier::builder()
//!     .organization("acme")
//!     .pipeline("web")
//!     .build()?;
//! assert_eq!(id.path(), "/organizations/acme/pipelines/web");
//!
//! let org = OrganizationIdentifier::new("acme")?;
//! let request = ListPipelinesRequest::new(org).with_page(PageOptions::new(2, 50));
//! assert_eq!(request.query_params().first("page"), Some("2"));
//! # Ok::<(), buildkite_cli::api::ApiError>(())
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::organizations::OrganizationIdentifier;
use crate::api::common::validation::{validate, Requirement};
use crate::api::common::{PageOptions, Result};
use crate::api::request::{ApiRequest, HttpMethod, PageableRequest, QueryParams};

/// A Buildkite pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub id: String,
    pub graphql_id: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub default_branch: Option<String>,

    /// Branch filter pattern, e.g. `main release/*`.
    pub branch_configuration: Option<String>,
    pub visibility: Option<String>,
    pub provider: Option<Provider>,
    pub builds_url: Option<String>,
    pub badge_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub scheduled_builds_count: u64,
    pub running_builds_count: u64,
    pub scheduled_jobs_count: u64,
    pub running_jobs_count: u64,
    pub waiting_jobs_count: u64,
    pub env: BTreeMap<String, serde_json::Value>,
    pub tags: Vec<String>,

    /// Raw step definitions; their shape varies by step type.
    pub steps: Vec<serde_json::Value>,
}

/// The source code provider a pipeline is connected to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    /// Provider name, e.g. `github` or `bitbucket`.
    pub id: String,
    pub webhook_url: Option<String>,
    pub settings: serde_json::Value,
}

/// The `(organization, pipeline)` slug pair that addresses a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineIdentifier {
    organization: String,
    pipeline: String,
}

impl PipelineIdentifier {
    pub fn builder() -> PipelineIdentifierBuilder {
        PipelineIdentifierBuilder::default()
    }

    /// Shorthand for a builder with both slugs set.
    pub fn new(organization: impl Into<String>, pipeline: impl Into<String>) -> Result<Self> {
        Self::builder()
            .organization(organization)
            .pipeline(pipeline)
            .build()
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// `/organizations/{org}/pipelines/{pipeline}`
    pub fn path(&self) -> String {
        format!(
            "/organizations/{}/pipelines/{}",
            self.organization, self.pipeline
        )
    }
}

/// Builder for [`PipelineIdentifier`].
///
/// Validation order: pipeline, organization.
#[derive(Debug, Clone, Default)]
pub struct PipelineIdentifierBuilder {
    organization: Option<String>,
    pipeline: Option<String>,
}

impl PipelineIdentifierBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    /// Validates and builds the identifier.
    ///
    /// # Errors
    ///
    /// [`ApiError::BuilderValidation`](crate::api::ApiError::BuilderValidation)
    /// naming `pipeline` or `organization`, checked in that order.
    pub fn build(self) -> Result<PipelineIdentifier> {
        validate(&[
            Requirement::slug("pipeline", self.pipeline.as_deref()),
            Requirement::slug("organization", self.organization.as_deref()),
        ])?;

        Ok(PipelineIdentifier {
            organization: self.organization.unwrap_or_default(),
            pipeline: self.pipeline.unwrap_or_default(),
        })
    }
}

/// `GET /organizations/{org}/pipelines`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPipelinesRequest {
    organization: OrganizationIdentifier,
    page: PageOptions,
}

impl ListPipelinesRequest {
    pub fn new(organization: OrganizationIdentifier) -> Self {
        Self {
            organization,
            page: PageOptions::default(),
        }
    }

    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }
}

impl ApiRequest for ListPipelinesRequest {
    type Output = Vec<Pipeline>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("{}/pipelines", self.organization.path())
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (name, value) in self.page.query_pairs() {
            params.insert(name, value);
        }
        params
    }
}

impl PageableRequest for ListPipelinesRequest {
    fn page_options(&self) -> PageOptions {
        self.page
    }

    fn with_page_options(&self, options: PageOptions) -> Self {
        self.clone().with_page(options)
    }
}

/// `GET /organizations/{org}/pipelines/{pipeline}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPipelineRequest {
    pipeline: PipelineIdentifier,
}

impl GetPipelineRequest {
    pub fn new(pipeline: PipelineIdentifier) -> Self {
        Self { pipeline }
    }
}

impl ApiRequest for GetPipelineRequest {
    type Output = Pipeline;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        self.pipeline.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_identifier_requires_pipeline_first() {
        let err = PipelineIdentifier::builder().build().unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "pipeline" }));
    }

    #[test]
    fn test_identifier_requires_organization() {
        let err = PipelineIdentifier::builder().pipeline("web").build().unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "organization" }));
        assert_eq!(err.to_string(), "organization is required");
    }

    #[test]
    fn test_builders_are_independent() {
        let a = PipelineIdentifier::builder().organization("acme");
        let b = a.clone().pipeline("web");
        assert!(a.build().is_err());
        assert_eq!(b.build().unwrap().path(), "/organizations/acme/pipelines/web");
    }

    #[test]
    fn test_list_pipelines_regenerates_page_params() {
        let request = ListPipelinesRequest::new(OrganizationIdentifier::new("acme").unwrap());
        let moved = request.with_page_options(PageOptions::new(4, 10));

        assert_eq!(request.query_params().first("page"), Some("1"));
        assert_eq!(moved.query_params().first("page"), Some("4"));
        assert_eq!(moved.query_params().first("per_page"), Some("10"));
        assert_eq!(moved.path(), "/organizations/acme/pipelines");
    }

    #[test]
    fn test_pipeline_tolerates_unknown_and_missing_fields() {
        let pipeline: Pipeline = serde_json::from_str(
            r#"{"id":"p1","slug":"web","name":"Web","created_at":"2024-03-01T10:00:00+02:00","brand_new_field":true}"#,
        )
        .unwrap();
        assert_eq!(pipeline.slug, "web");
        assert!(pipeline.steps.is_empty());
        assert_eq!(
            pipeline.created_at.unwrap().to_rfc3339(),
            "2024-03-01T08:00:00+00:00"
        );
    }
}
