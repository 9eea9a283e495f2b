//
//  buildkite-cli
//  api/resources/jobs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Job types and requests.
//!
//! Jobs are the steps of a build. They are addressed by the build they belong
//! to plus their UUID. Two operations act on a single job:
//!
//! - [`RetryJobRequest`] re-runs a failed or timed out command job
//! - [`UnblockJobRequest`] releases a block step, optionally with field values
//!
//! [`RetryJobsOptions`] describes a retry of several jobs of one build; it is
//! executed by [`BuildkiteClient::retry_jobs`](crate::api::BuildkiteClient::retry_jobs)
//! and reports per-job outcomes in a [`BulkOperationResult`].

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builds::{BuildIdentifier, Creator};
use super::pipelines::PipelineIdentifier;
use crate::api::common::validation::{validate, Requirement};
use crate::api::common::{ApiError, Result};
use crate::api::request::{ApiRequest, HttpMethod};

/// A job within a build.
///
/// `job_type` distinguishes command steps (`script`) from `waiter`, `manual`
/// (block) and `trigger` steps; several fields only exist for command jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub id: String,
    pub graphql_id: Option<String>,

    #[serde(rename = "type")]
    pub job_type: String,
    pub name: Option<String>,
    pub step_key: Option<String>,
    pub state: Option<String>,
    pub web_url: Option<String>,
    pub log_url: Option<String>,
    pub command: Option<String>,
    pub soft_failed: bool,
    pub exit_status: Option<i32>,
    pub agent_query_rules: Vec<String>,
    pub retried: bool,
    pub retried_in_job_id: Option<String>,
    pub retries_count: Option<u32>,
    pub retryable: bool,
    pub unblockable: bool,
    pub unblocked_by: Option<Creator>,
    pub parallel_group_index: Option<u32>,
    pub parallel_group_total: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub runnable_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub unblocked_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Display label: the step name, else the command, else the job type.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.command.as_deref())
            .unwrap_or(&self.job_type)
    }
}

/// A build plus a job UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobIdentifier {
    build: BuildIdentifier,
    job_id: String,
}

impl JobIdentifier {
    pub fn builder() -> JobIdentifierBuilder {
        JobIdentifierBuilder::default()
    }

    pub fn new(build: BuildIdentifier, job_id: impl Into<String>) -> Result<Self> {
        let pipeline = build.pipeline();
        Self::builder()
            .organization(pipeline.organization())
            .pipeline(pipeline.pipeline())
            .build_number(build.number())
            .job_id(job_id)
            .build()
    }

    pub fn build_id(&self) -> &BuildIdentifier {
        &self.build
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// `/organizations/{org}/pipelines/{pipeline}/builds/{number}/jobs/{job}`
    pub fn path(&self) -> String {
        format!("{}/jobs/{}", self.build.path(), self.job_id)
    }
}

/// Builder for [`JobIdentifier`].
///
/// Validation order: pipeline, organization, build number, job id.
#[derive(Debug, Clone, Default)]
pub struct JobIdentifierBuilder {
    organization: Option<String>,
    pipeline: Option<String>,
    build_number: Option<u64>,
    job_id: Option<String>,
}

impl JobIdentifierBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    pub fn build_number(mut self, number: u64) -> Self {
        self.build_number = Some(number);
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn build(self) -> Result<JobIdentifier> {
        validate(&[
            Requirement::slug("pipeline", self.pipeline.as_deref()),
            Requirement::slug("organization", self.organization.as_deref()),
            Requirement::new("build_number", self.build_number.is_some_and(|n| n > 0)),
            Requirement::slug("job_id", self.job_id.as_deref()),
        ])?;

        let build = BuildIdentifier::builder()
            .organization(self.organization.unwrap_or_default())
            .pipeline(self.pipeline.unwrap_or_default())
            .number(self.build_number.unwrap_or_default())
            .build()?;

        Ok(JobIdentifier {
            build,
            job_id: self.job_id.unwrap_or_default(),
        })
    }
}

/// `PUT …/builds/{number}/jobs/{job}/retry`
///
/// Returns the new job created by the retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryJobRequest {
    job: JobIdentifier,
}

impl RetryJobRequest {
    pub fn new(job: JobIdentifier) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &JobIdentifier {
        &self.job
    }
}

impl ApiRequest for RetryJobRequest {
    type Output = Job;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("{}/retry", self.job.path())
    }
}

/// Options for unblocking a block step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnblockJobOptions {
    job: JobIdentifier,
    body: UnblockJobBody,
}

impl UnblockJobOptions {
    pub fn builder() -> UnblockJobOptionsBuilder {
        UnblockJobOptionsBuilder::default()
    }

    pub fn job(&self) -> &JobIdentifier {
        &self.job
    }
}

/// JSON body of an unblock request.
///
/// `fields` is always sent, as `{}` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnblockJobBody {
    /// User id to record as the unblocker instead of the token's owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unblocker: Option<String>,
    pub fields: BTreeMap<String, String>,
}

/// Builder for [`UnblockJobOptions`].
///
/// Validation order: pipeline, organization, build number, job id.
#[derive(Debug, Clone, Default)]
pub struct UnblockJobOptionsBuilder {
    job: JobIdentifierBuilder,
    body: UnblockJobBody,
}

impl UnblockJobOptionsBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.job = self.job.organization(organization);
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.job = self.job.pipeline(pipeline);
        self
    }

    pub fn build_number(mut self, number: u64) -> Self {
        self.job = self.job.build_number(number);
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job = self.job.job_id(job_id);
        self
    }

    pub fn unblocker(mut self, user_id: impl Into<String>) -> Self {
        self.body.unblocker = Some(user_id.into());
        self
    }

    /// Sets one block step field value.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.fields.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<UnblockJobOptions> {
        Ok(UnblockJobOptions {
            job: self.job.build()?,
            body: self.body,
        })
    }
}

/// `PUT …/builds/{number}/jobs/{job}/unblock`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnblockJobRequest {
    options: UnblockJobOptions,
}

impl UnblockJobRequest {
    pub fn new(options: UnblockJobOptions) -> Self {
        Self { options }
    }
}

impl ApiRequest for UnblockJobRequest {
    type Output = Job;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("{}/unblock", self.options.job.path())
    }

    fn body(&self) -> Result<Option<String>> {
        Ok(Some(serde_json::to_string(&self.options.body)?))
    }
}

/// A retry of several jobs of one build.
///
/// Job ids keep their insertion order with duplicates removed, so each job is
/// retried at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryJobsOptions {
    build: BuildIdentifier,
    job_ids: Vec<String>,
    fail_fast: bool,
}

impl RetryJobsOptions {
    pub fn builder() -> RetryJobsOptionsBuilder {
        RetryJobsOptionsBuilder::default()
    }

    pub fn build_id(&self) -> &BuildIdentifier {
        &self.build
    }

    pub fn job_ids(&self) -> &[String] {
        &self.job_ids
    }

    /// Stop at the first failure instead of attempting every job.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// One retry request per job, in order.
    pub fn requests(&self) -> Result<Vec<RetryJobRequest>> {
        self.job_ids
            .iter()
            .map(|id| JobIdentifier::new(self.build.clone(), id.as_str()).map(RetryJobRequest::new))
            .collect()
    }
}

/// Builder for [`RetryJobsOptions`].
///
/// Validation order: pipeline, organization, build number, job ids.
#[derive(Debug, Clone, Default)]
pub struct RetryJobsOptionsBuilder {
    organization: Option<String>,
    pipeline: Option<String>,
    build_number: Option<u64>,
    job_ids: Vec<String>,
    fail_fast: bool,
}

impl RetryJobsOptionsBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    pub fn build_number(mut self, number: u64) -> Self {
        self.build_number = Some(number);
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_ids.push(job_id.into());
        self
    }

    pub fn job_ids<I, S>(mut self, job_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_ids.extend(job_ids.into_iter().map(Into::into));
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn build(self) -> Result<RetryJobsOptions> {
        let mut seen = HashSet::new();
        let job_ids: Vec<String> = self
            .job_ids
            .into_iter()
            .filter(|id| !id.trim().is_empty())
            .filter(|id| seen.insert(id.clone()))
            .collect();

        validate(&[
            Requirement::slug("pipeline", self.pipeline.as_deref()),
            Requirement::slug("organization", self.organization.as_deref()),
            Requirement::new("build_number", self.build_number.is_some_and(|n| n > 0)),
            Requirement::new("job_ids", !job_ids.is_empty()),
        ])?;

        let pipeline = PipelineIdentifier::new(
            self.organization.unwrap_or_default(),
            self.pipeline.unwrap_or_default(),
        )?;

        Ok(RetryJobsOptions {
            build: BuildIdentifier::new(pipeline, self.build_number.unwrap_or_default())?,
            job_ids,
            fail_fast: self.fail_fast,
        })
    }
}

/// Per-item outcome of a bulk operation, keyed by item id.
#[derive(Debug, Default)]
pub struct BulkOperationResult<T> {
    pub successes: BTreeMap<String, T>,
    pub failures: BTreeMap<String, ApiError>,
}

impl<T> BulkOperationResult<T> {
    pub fn new() -> Self {
        Self {
            successes: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of items attempted.
    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::prepare;

    #[test]
    fn test_job_identifier_validation_order() {
        let err = JobIdentifier::builder()
            .organization("acme")
            .pipeline("web")
            .job_id("j1")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "build_number" }));

        let err = JobIdentifier::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "job_id" }));
    }

    #[test]
    fn test_retry_job_path() {
        let job = JobIdentifier::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(4)
            .job_id("j1")
            .build()
            .unwrap();
        let prepared = prepare(&RetryJobRequest::new(job)).unwrap();
        assert_eq!(prepared.method, HttpMethod::Put);
        assert_eq!(
            prepared.path,
            "/organizations/acme/pipelines/web/builds/4/jobs/j1/retry"
        );
        assert_eq!(prepared.body, None);
    }

    #[test]
    fn test_unblock_body() {
        let options = UnblockJobOptions::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(4)
            .job_id("j2")
            .field("release", "v1.2")
            .build()
            .unwrap();
        let prepared = prepare(&UnblockJobRequest::new(options)).unwrap();

        assert_eq!(
            prepared.path,
            "/organizations/acme/pipelines/web/builds/4/jobs/j2/unblock"
        );
        let json: serde_json::Value = serde_json::from_str(&prepared.body.unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"fields": {"release": "v1.2"}}));
    }

    #[test]
    fn test_unblock_requires_job_id() {
        let err = UnblockJobOptions::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(4)
            .unblocker("user-1")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "job_id" }));
    }

    #[test]
    fn test_retry_jobs_dedupes_preserving_order() {
        let options = RetryJobsOptions::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(9)
            .job_ids(["b", "a", "b", "c", "a"])
            .build()
            .unwrap();
        assert_eq!(options.job_ids(), ["b", "a", "c"]);
        assert!(!options.fail_fast());

        let paths: Vec<String> = options
            .requests()
            .unwrap()
            .iter()
            .map(|r| r.job().job_id().to_string())
            .collect();
        assert_eq!(paths, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_retry_jobs_requires_job_ids_last() {
        let err = RetryJobsOptions::builder()
            .organization("acme")
            .pipeline("web")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "build_number" }));

        let err = RetryJobsOptions::builder()
            .organization("acme")
            .pipeline("web")
            .build_number(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "job_ids" }));
    }

    #[test]
    fn test_job_label_fallbacks() {
        let job: Job = serde_json::from_str(r#"{"id":"j","type":"waiter"}"#).unwrap();
        assert_eq!(job.label(), "waiter");

        let job: Job = serde_json::from_str(r#"{"id":"j","type":"script","command":"make test"}"#).unwrap();
        assert_eq!(job.label(), "make test");
    }
}
