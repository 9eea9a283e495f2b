//
//  buildkite-cli
//  api/resources/builds.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build types, filters and requests.
//!
//! A build is one run of a pipeline, addressed by its pipeline and its
//! sequential build number. This module provides:
//!
//! - [`Build`] and its nested records, as returned by the API
//! - [`BuildFilters`], the query filters for listing builds
//! - [`BuildIdentifier`] and [`CreateBuildOptions`], validated by builders
//! - One request type per build operation
//!
//! # Build Lifecycle
//!
//! ```text
//! scheduled -> running -> passed | failed | canceled
//!                     \-> blocked -> running -> ...
//!                     \-> failing -> failed
//! ```
//!
//! # Example
//!
//! ```rust
//! use buildkite_cli::api::resources::builds::{BuildFilters, BuildState, ListBuildsRequest};
//! use buildkite_cli::api::resources::OrganizationIdentifier;
//! use buildkite_cli::api::request::ApiRequest;
//!
//! let filters = BuildFilters::builder()
//!     .branches(["main", "release"])
//!     .state(BuildState::Failed)
//!     .build();
//!
//! let request = ListBuildsRequest::for_organization(OrganizationIdentifier::new("acme")?, filters);
//! let params = request.query_params();
//! assert_eq!(params.values("branch").count(), 2);
//! assert_eq!(params.first("state"), Some("failed"));
//! # Ok::<(), buildkite_cli::api::ApiError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::jobs::Job;
use super::organizations::OrganizationIdentifier;
use super::pipelines::{Pipeline, PipelineIdentifier};
use crate::api::common::validation::{validate, Requirement};
use crate::api::common::{PageOptions, Result};
use crate::api::request::{ApiRequest, HttpMethod, PageableRequest, QueryParams};

/// A Buildkite build.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::resources::builds::{Build, BuildState};
///
/// let build: Build = serde_json::from_str(r#"{
///     "id": "f62a1b4d",
///     "number": 42,
///     "state": "passed",
///     "branch": "main",
///     "commit": "abc123",
///     "created_at": "2024-01-15T10:00:00.000Z"
/// }"#).unwrap();
///
/// assert_eq!(build.number, 42);
/// assert_eq!(build.state, BuildState::Passed);
/// assert!(build.jobs.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    pub id: String,
    pub graphql_id: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,

    /// Sequential number within the pipeline.
    pub number: u64,
    pub state: BuildState,
    pub blocked: bool,
    pub message: Option<String>,
    pub commit: String,
    pub branch: String,

    /// What triggered the build: `webhook`, `api`, `ui`, `trigger_job`, `schedule`.
    pub source: Option<String>,
    pub creator: Option<Creator>,
    pub author: Option<Author>,
    pub env: BTreeMap<String, serde_json::Value>,
    pub meta_data: BTreeMap<String, String>,
    pub jobs: Vec<Job>,
    pub pull_request: Option<serde_json::Value>,
    pub pipeline: Option<Pipeline>,
    pub created_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Build {
    /// Seconds between start and finish, when both are known.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}

/// The state of a build.
///
/// `Finished` only appears as a filter value; it matches every terminal state.
/// Unrecognised states from the server deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Running,
    Scheduled,
    Passed,
    Failing,
    Failed,
    Blocked,
    Canceled,
    Canceling,
    Skipped,
    NotRun,
    Finished,
    #[default]
    #[serde(other)]
    Unknown,
}

impl BuildState {
    /// The value used on the wire and in the `state` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Scheduled => "scheduled",
            Self::Passed => "passed",
            Self::Failing => "failing",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Canceled => "canceled",
            Self::Canceling => "canceling",
            Self::Skipped => "skipped",
            Self::NotRun => "not_run",
            Self::Finished => "finished",
            Self::Unknown => "unknown",
        }
    }

    /// True once the build can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed | Self::Canceled | Self::Skipped | Self::NotRun
        )
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "scheduled" => Ok(Self::Scheduled),
            "passed" => Ok(Self::Passed),
            "failing" => Ok(Self::Failing),
            "failed" => Ok(Self::Failed),
            "blocked" => Ok(Self::Blocked),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "canceling" | "cancelling" => Ok(Self::Canceling),
            "skipped" => Ok(Self::Skipped),
            "not_run" => Ok(Self::NotRun),
            "finished" => Ok(Self::Finished),
            other => Err(format!("unknown build state: {other}")),
        }
    }
}

/// The user who created a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Creator {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The commit author attached to a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Filters for listing builds.
///
/// Every non-empty field becomes exactly one query parameter name:
///
/// | Field | Parameter |
/// |-------|-----------|
/// | branches | `branch` (one entry per branch) |
/// | commits | `commit` (one entry per commit) |
/// | states | `state` (one entry per state) |
/// | creator | `creator` |
/// | metadata | `metadata[<key>]` per entry |
/// | created_from / created_to / finished_from | same names, RFC 3339 UTC |
/// | include_retried_jobs | `include_retried_jobs` = `true`/`false` |
///
/// The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFilters {
    branches: BTreeSet<String>,
    commits: BTreeSet<String>,
    states: BTreeSet<BuildState>,
    creator: Option<String>,
    metadata: BTreeMap<String, String>,
    created_from: Option<DateTime<Utc>>,
    created_to: Option<DateTime<Utc>>,
    finished_from: Option<DateTime<Utc>>,
    include_retried_jobs: Option<bool>,
}

impl BuildFilters {
    pub fn builder() -> BuildFiltersBuilder {
        BuildFiltersBuilder::default()
    }

    pub fn branches(&self) -> &BTreeSet<String> {
        &self.branches
    }

    pub fn commits(&self) -> &BTreeSet<String> {
        &self.commits
    }

    pub fn states(&self) -> &BTreeSet<BuildState> {
        &self.states
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The query parameters these filters contribute, without paging.
    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();

        params.insert_all("branch", self.branches.iter().cloned());
        params.insert_all("commit", self.commits.iter().cloned());
        params.insert_all("state", self.states.iter().map(BuildState::as_str));
        params.insert_opt("creator", self.creator.as_deref());

        for (key, value) in &self.metadata {
            params.insert(format!("metadata[{key}]"), value.clone());
        }

        let dates = [
            ("created_from", self.created_from),
            ("created_to", self.created_to),
            ("finished_from", self.finished_from),
        ];
        for (name, date) in dates {
            if let Some(date) = date {
                params.insert(name, date.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
        }

        if let Some(include) = self.include_retried_jobs {
            params.insert("include_retried_jobs", include.to_string());
        }

        params
    }
}

/// Builder for [`BuildFilters`]. Nothing is required.
#[derive(Debug, Clone, Default)]
pub struct BuildFiltersBuilder {
    filters: BuildFilters,
}

impl BuildFiltersBuilder {
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.filters.branches.insert(branch.into());
        self
    }

    pub fn branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.branches.extend(branches.into_iter().map(Into::into));
        self
    }

    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.filters.commits.insert(commit.into());
        self
    }

    pub fn commits<I, S>(mut self, commits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.commits.extend(commits.into_iter().map(Into::into));
        self
    }

    pub fn state(mut self, state: BuildState) -> Self {
        self.filters.states.insert(state);
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = BuildState>) -> Self {
        self.filters.states.extend(states);
        self
    }

    /// Filter by creator user id.
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.filters.creator = Some(creator.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.metadata.insert(key.into(), value.into());
        self
    }

    pub fn created_from(mut self, date: DateTime<Utc>) -> Self {
        self.filters.created_from = Some(date);
        self
    }

    pub fn created_to(mut self, date: DateTime<Utc>) -> Self {
        self.filters.created_to = Some(date);
        self
    }

    pub fn finished_from(mut self, date: DateTime<Utc>) -> Self {
        self.filters.finished_from = Some(date);
        self
    }

    pub fn include_retried_jobs(mut self, include: bool) -> Self {
        self.filters.include_retried_jobs = Some(include);
        self
    }

    pub fn build(self) -> BuildFilters {
        self.filters
    }
}

/// Which builds a list request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildScope {
    /// Every build the token can see.
    All,
    /// Builds of one organization.
    Organization(OrganizationIdentifier),
    /// Builds of one pipeline.
    Pipeline(PipelineIdentifier),
}

/// `GET /builds`, `GET /organizations/{org}/builds` or
/// `GET /organizations/{org}/pipelines/{pipeline}/builds`.
///
/// Query parameters are the filters' parameters followed by `page` and
/// `per_page` from the request's cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBuildsRequest {
    scope: BuildScope,
    filters: BuildFilters,
    page: PageOptions,
}

impl ListBuildsRequest {
    pub fn new(scope: BuildScope, filters: BuildFilters) -> Self {
        Self {
            scope,
            filters,
            page: PageOptions::default(),
        }
    }

    pub fn all(filters: BuildFilters) -> Self {
        Self::new(BuildScope::All, filters)
    }

    pub fn for_organization(organization: OrganizationIdentifier, filters: BuildFilters) -> Self {
        Self::new(BuildScope::Organization(organization), filters)
    }

    pub fn for_pipeline(pipeline: PipelineIdentifier, filters: BuildFilters) -> Self {
        Self::new(BuildScope::Pipeline(pipeline), filters)
    }

    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }

    pub fn scope(&self) -> &BuildScope {
        &self.scope
    }

    pub fn filters(&self) -> &BuildFilters {
        &self.filters
    }
}

impl ApiRequest for ListBuildsRequest {
    type Output = Vec<Build>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        match &self.scope {
            BuildScope::All => "/builds".to_string(),
            BuildScope::Organization(org) => format!("{}/builds", org.path()),
            BuildScope::Pipeline(pipeline) => format!("{}/builds", pipeline.path()),
        }
    }

    fn query_params(&self) -> QueryParams {
        let mut params = self.filters.query_params();
        for (name, value) in self.page.query_pairs() {
            params.insert(name, value);
        }
        params
    }
}

impl PageableRequest for ListBuildsRequest {
    fn page_options(&self) -> PageOptions {
        self.page
    }

    fn with_page_options(&self, options: PageOptions) -> Self {
        self.clone().with_page(options)
    }
}

/// A pipeline plus a build number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildIdentifier {
    pipeline: PipelineIdentifier,
    number: u64,
}

impl BuildIdentifier {
    pub fn builder() -> BuildIdentifierBuilder {
        BuildIdentifierBuilder::default()
    }

    pub fn new(pipeline: PipelineIdentifier, number: u64) -> Result<Self> {
        Self::builder()
            .organization(pipeline.organization())
            .pipeline(pipeline.pipeline())
            .number(number)
            .build()
    }

    pub fn pipeline(&self) -> &PipelineIdentifier {
        &self.pipeline
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// `/organizations/{org}/pipelines/{pipeline}/builds/{number}`
    pub fn path(&self) -> String {
        format!("{}/builds/{}", self.pipeline.path(), self.number)
    }
}

/// Builder for [`BuildIdentifier`].
///
/// Validation order: pipeline, organization, build number.
#[derive(Debug, Clone, Default)]
pub struct BuildIdentifierBuilder {
    organization: Option<String>,
    pipeline: Option<String>,
    number: Option<u64>,
}

impl BuildIdentifierBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    pub fn number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn build(self) -> Result<BuildIdentifier> {
        validate(&[
            Requirement::slug("pipeline", self.pipeline.as_deref()),
            Requirement::slug("organization", self.organization.as_deref()),
            Requirement::new("build_number", self.number.is_some_and(|n| n > 0)),
        ])?;

        Ok(BuildIdentifier {
            pipeline: PipelineIdentifier::builder()
                .organization(self.organization.unwrap_or_default())
                .pipeline(self.pipeline.unwrap_or_default())
                .build()?,
            number: self.number.unwrap_or_default(),
        })
    }
}

/// `GET /organizations/{org}/pipelines/{pipeline}/builds/{number}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBuildRequest {
    build: BuildIdentifier,
    include_retried_jobs: bool,
}

impl GetBuildRequest {
    pub fn new(build: BuildIdentifier) -> Self {
        Self {
            build,
            include_retried_jobs: false,
        }
    }

    pub fn include_retried_jobs(mut self, include: bool) -> Self {
        self.include_retried_jobs = include;
        self
    }
}

impl ApiRequest for GetBuildRequest {
    type Output = Build;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        self.build.path()
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if self.include_retried_jobs {
            params.insert("include_retried_jobs", "true");
        }
        params
    }
}

/// Options for creating a build.
///
/// `commit` accepts a SHA or `HEAD`. Optional fields left unset are omitted
/// from the request body entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBuildOptions {
    pipeline: PipelineIdentifier,
    body: CreateBuildBody,
}

impl CreateBuildOptions {
    pub fn builder() -> CreateBuildOptionsBuilder {
        CreateBuildOptionsBuilder::default()
    }

    pub fn pipeline(&self) -> &PipelineIdentifier {
        &self.pipeline
    }
}

/// JSON body of a create-build request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateBuildBody {
    pub commit: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta_data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_checkout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_pipeline_branch_filters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_base_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_repository: Option<String>,
}

/// Builder for [`CreateBuildOptions`].
///
/// Validation order: pipeline, organization, commit, branch.
#[derive(Debug, Clone, Default)]
pub struct CreateBuildOptionsBuilder {
    organization: Option<String>,
    pipeline: Option<String>,
    commit: Option<String>,
    branch: Option<String>,
    body: CreateBuildBody,
}

impl CreateBuildOptionsBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    pub fn author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.body.author = Some(Author {
            name: name.into(),
            email: email.into(),
        });
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.env.insert(key.into(), value.into());
        self
    }

    pub fn meta_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.meta_data.insert(key.into(), value.into());
        self
    }

    pub fn clean_checkout(mut self, clean: bool) -> Self {
        self.body.clean_checkout = Some(clean);
        self
    }

    pub fn ignore_pipeline_branch_filters(mut self, ignore: bool) -> Self {
        self.body.ignore_pipeline_branch_filters = Some(ignore);
        self
    }

    /// Marks the build as a pull request build.
    pub fn pull_request(
        mut self,
        id: u64,
        base_branch: impl Into<String>,
        repository: Option<String>,
    ) -> Self {
        self.body.pull_request_id = Some(id);
        self.body.pull_request_base_branch = Some(base_branch.into());
        self.body.pull_request_repository = repository;
        self
    }

    pub fn build(self) -> Result<CreateBuildOptions> {
        validate(&[
            Requirement::slug("pipeline", self.pipeline.as_deref()),
            Requirement::slug("organization", self.organization.as_deref()),
            Requirement::slug("commit", self.commit.as_deref()),
            Requirement::slug("branch", self.branch.as_deref()),
        ])?;

        let pipeline = PipelineIdentifier::builder()
            .organization(self.organization.unwrap_or_default())
            .pipeline(self.pipeline.unwrap_or_default())
            .build()?;

        Ok(CreateBuildOptions {
            pipeline,
            body: CreateBuildBody {
                commit: self.commit.unwrap_or_default(),
                branch: self.branch.unwrap_or_default(),
                ..self.body
            },
        })
    }
}

/// `POST /organizations/{org}/pipelines/{pipeline}/builds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBuildRequest {
    options: CreateBuildOptions,
}

impl CreateBuildRequest {
    pub fn new(options: CreateBuildOptions) -> Self {
        Self { options }
    }
}

impl ApiRequest for CreateBuildRequest {
    type Output = Build;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        format!("{}/builds", self.options.pipeline.path())
    }

    fn body(&self) -> Result<Option<String>> {
        Ok(Some(serde_json::to_string(&self.options.body)?))
    }
}

/// `PUT …/builds/{number}/cancel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelBuildRequest {
    build: BuildIdentifier,
}

impl CancelBuildRequest {
    pub fn new(build: BuildIdentifier) -> Self {
        Self { build }
    }
}

impl ApiRequest for CancelBuildRequest {
    type Output = Build;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("{}/cancel", self.build.path())
    }
}

/// `PUT …/builds/{number}/rebuild`
///
/// Returns the new build, which gets its own number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildBuildRequest {
    build: BuildIdentifier,
}

impl RebuildBuildRequest {
    pub fn new(build: BuildIdentifier) -> Self {
        Self { build }
    }
}

impl ApiRequest for RebuildBuildRequest {
    type Output = Build;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("{}/rebuild", self.build.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::prepare;
    use crate::api::ApiError;
    use chrono::TimeZone;

    fn pipeline() -> PipelineIdentifier {
        PipelineIdentifier::new("acme", "web").unwrap()
    }

    #[test]
    fn test_filters_one_entry_per_value() {
        let filters = BuildFilters::builder()
            .branches(["a", "b"])
            .state(BuildState::Failed)
            .build();
        let params = filters.query_params();

        assert_eq!(params.values("branch").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(params.values("state").collect::<Vec<_>>(), vec!["failed"]);
        assert_eq!(params.len(), 3);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["branch", "state"]);
    }

    #[test]
    fn test_empty_filters_contribute_nothing() {
        assert!(BuildFilters::default().query_params().is_empty());
    }

    #[test]
    fn test_filters_full_mapping() {
        let from = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let filters = BuildFilters::builder()
            .commit("abc")
            .creator("user-1")
            .metadata("release", "v1")
            .metadata("env", "prod")
            .created_from(from)
            .created_to(from)
            .finished_from(from)
            .include_retried_jobs(false)
            .build();
        let params = filters.query_params();

        assert_eq!(params.first("commit"), Some("abc"));
        assert_eq!(params.first("creator"), Some("user-1"));
        assert_eq!(params.first("metadata[release]"), Some("v1"));
        assert_eq!(params.first("metadata[env]"), Some("prod"));
        assert_eq!(params.first("created_from"), Some("2024-01-02T03:04:05Z"));
        assert_eq!(params.first("created_to"), Some("2024-01-02T03:04:05Z"));
        assert_eq!(params.first("finished_from"), Some("2024-01-02T03:04:05Z"));
        assert_eq!(params.first("include_retried_jobs"), Some("false"));
    }

    #[test]
    fn test_list_builds_paths_and_paging() {
        let all = ListBuildsRequest::all(BuildFilters::default());
        assert_eq!(all.path(), "/builds");
        assert_eq!(all.query_params().first("per_page"), Some("30"));

        let acme = OrganizationIdentifier::new("acme").unwrap();
        let org = ListBuildsRequest::for_organization(acme, BuildFilters::default());
        assert_eq!(org.path(), "/organizations/acme/builds");

        let scoped = ListBuildsRequest::for_pipeline(pipeline(), BuildFilters::builder().branch("main").build())
            .with_page(PageOptions::new(3, 5));
        assert_eq!(scoped.path(), "/organizations/acme/pipelines/web/builds");
        let params = scoped.query_params();
        assert_eq!(params.first("page"), Some("3"));
        assert_eq!(params.first("per_page"), Some("5"));
        assert_eq!(params.first("branch"), Some("main"));
    }

    #[test]
    fn test_blank_organization_scope_is_rejected() {
        let err = OrganizationIdentifier::new("  ")
            .map(|org| ListBuildsRequest::for_organization(org, BuildFilters::default()))
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "organization" }));
    }

    #[test]
    fn test_partial_author_parses() {
        let build: Build = serde_json::from_str(r#"{"number":1,"author":{"name":"Ada"}}"#).unwrap();
        let author = build.author.unwrap();
        assert_eq!(author.name, "Ada");
        assert!(author.email.is_empty());
    }

    #[test]
    fn test_with_page_options_leaves_original_untouched() {
        let request = ListBuildsRequest::all(BuildFilters::default());
        let next = request.with_page_options(PageOptions::new(2, 30));
        assert_eq!(request.page_options().page(), 1);
        assert_eq!(next.page_options().page(), 2);
        assert_eq!(next.filters(), request.filters());
    }

    #[test]
    fn test_build_identifier_validation_order() {
        let err = BuildIdentifier::builder().organization("acme").number(3).build().unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "pipeline" }));

        let err = BuildIdentifier::builder().pipeline("web").number(3).build().unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "organization" }));

        let err = BuildIdentifier::builder().organization("acme").pipeline("web").build().unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "build_number" }));

        let id = BuildIdentifier::builder()
            .organization("acme")
            .pipeline("web")
            .number(12)
            .build()
            .unwrap();
        assert_eq!(id.path(), "/organizations/acme/pipelines/web/builds/12");
    }

    #[test]
    fn test_create_build_validation_order() {
        let err = CreateBuildOptions::builder()
            .organization("acme")
            .pipeline("web")
            .branch("main")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "commit" }));

        let err = CreateBuildOptions::builder()
            .organization("acme")
            .pipeline("web")
            .commit("HEAD")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "branch" }));
    }

    #[test]
    fn test_create_build_body_omits_unset_fields() {
        let options = CreateBuildOptions::builder()
            .organization("acme")
            .pipeline("web")
            .commit("HEAD")
            .branch("main")
            .message("Deploy")
            .build()
            .unwrap();
        let prepared = prepare(&CreateBuildRequest::new(options)).unwrap();

        assert_eq!(prepared.method, HttpMethod::Post);
        assert_eq!(prepared.path, "/organizations/acme/pipelines/web/builds");
        let body = prepared.body.unwrap();
        assert!(!body.contains("null"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"commit": "HEAD", "branch": "main", "message": "Deploy"})
        );
    }

    #[test]
    fn test_create_build_body_with_author_env_and_pull_request() {
        let options = CreateBuildOptions::builder()
            .organization("acme")
            .pipeline("web")
            .commit("abc")
            .branch("feature")
            .author("Ada", "ada@example.com")
            .env("DEPLOY", "1")
            .pull_request(7, "main", None)
            .build()
            .unwrap();
        let body = CreateBuildRequest::new(options).body().unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["author"]["email"], "ada@example.com");
        assert_eq!(json["env"]["DEPLOY"], "1");
        assert_eq!(json["pull_request_id"], 7);
        assert!(json.get("pull_request_repository").is_none());
    }

    #[test]
    fn test_cancel_and_rebuild_are_bodyless_puts() {
        let id = BuildIdentifier::new(pipeline(), 9).unwrap();
        let cancel = prepare(&CancelBuildRequest::new(id.clone())).unwrap();
        assert_eq!(cancel.method, HttpMethod::Put);
        assert_eq!(cancel.path, "/organizations/acme/pipelines/web/builds/9/cancel");
        assert_eq!(cancel.body, None);

        let rebuild = prepare(&RebuildBuildRequest::new(id)).unwrap();
        assert_eq!(rebuild.path, "/organizations/acme/pipelines/web/builds/9/rebuild");
    }

    #[test]
    fn test_build_state_parsing() {
        assert_eq!("FAILED".parse::<BuildState>().unwrap(), BuildState::Failed);
        assert_eq!("cancelled".parse::<BuildState>().unwrap(), BuildState::Canceled);
        assert!("bogus".parse::<BuildState>().is_err());

        let state: BuildState = serde_json::from_str(r#""some_future_state""#).unwrap();
        assert_eq!(state, BuildState::Unknown);
    }

    #[test]
    fn test_build_duration() {
        let build: Build = serde_json::from_str(
            r#"{"number":1,"started_at":"2024-01-01T10:00:00Z","finished_at":"2024-01-01T10:02:30Z"}"#,
        )
        .unwrap();
        assert_eq!(build.duration_secs(), Some(150));
    }
}
