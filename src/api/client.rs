//
//  buildkite-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Client Facade for the Buildkite API
//!
//! [`BuildkiteClient`] turns request values into HTTP calls through a
//! [`Transport`], interprets the status code, and parses the body with the
//! request's own parser.
//!
//! ## Features
//!
//! - One generic [`BuildkiteClient::send`] for every request type
//! - Paged fetches that return a [`PagedResponse`] with the parsed `Link` header
//! - Page walking (first/previous/next/last) from any page envelope
//! - Typed convenience methods per operation
//!
//! Multi-request operations (retrieve all pages, newest builds, bulk job
//! retry) live in the `composite` module as further methods on the client.

use std::sync::Arc;

use url::Url;

use super::common::{ApiError, LinkRelation, PageOptions, PagedResponse, PagingLinks, Result};
use super::request::{prepare, ApiRequest, PageableRequest};
use super::resources::{
    AccessToken, Annotation, Build, BuildIdentifier, CancelBuildRequest, CreateBuildOptions,
    CreateBuildRequest, Emoji, GetAccessTokenRequest, GetBuildRequest, GetMetaRequest,
    GetOrganizationRequest, GetPipelineRequest, GetUserRequest, Job, JobIdentifier,
    ListAnnotationsRequest, ListBuildsRequest, ListEmojisRequest, ListOrganizationsRequest,
    ListPipelinesRequest, Meta, Organization, OrganizationIdentifier, PingRequest, PingResponse,
    Pipeline, PipelineIdentifier, RebuildBuildRequest, RetryJobRequest, UnblockJobOptions,
    UnblockJobRequest, User,
};
use super::transport::{RawResponse, ReqwestTransport, Transport};
use crate::config::Config;

/// The Buildkite REST API client.
///
/// Each client owns its transport and base URL, both fixed at construction.
/// Every operation awaits one request at a time and the client holds no
/// mutable state, so a shared reference can drive independent page walks.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use buildkite_cli::api::BuildkiteClient;
/// use buildkite_cli::config::Config;
///
/// let mut config = Config::load()?;
/// config.apply_env();
/// let client = BuildkiteClient::from_config(&config)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Walking Pages
///
/// ```rust,no_run
/// use buildkite_cli::api::BuildkiteClient;
/// use buildkite_cli::api::resources::{BuildFilters, ListBuildsRequest, OrganizationIdentifier};
///
/// # async fn example(client: BuildkiteClient) -> Result<(), buildkite_cli::api::ApiError> {
/// let mut page = client
///     .list_builds(ListBuildsRequest::for_organization(
///         OrganizationIdentifier::new("acme")?,
///         BuildFilters::default(),
///     ))
///     .await?;
/// loop {
///     for build in page.items() {
///         println!("#{} {}", build.number, build.state);
///     }
///     if !page.has_next() {
///         break;
///     }
///     page = client.next_page(&page).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BuildkiteClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl std::fmt::Debug for BuildkiteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildkiteClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BuildkiteClient {
    /// Creates a client for `base_url` that sends through `transport`.
    ///
    /// Request paths are appended to the base URL, so it should include the
    /// API version segment, e.g. `https://api.buildkite.com/v2`.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidBaseUrl`] when `base_url` is not an absolute URL.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            transport,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client backed by [`ReqwestTransport`] from configuration.
    ///
    /// Uses `api.base_url`, `api.token` and `api.timeout_secs`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.api.token.clone(), config.api.timeout())?;
        Self::new(&config.api.base_url, Arc::new(transport))
    }

    /// The API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and parses its response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidRequest`] / [`ApiError::Http`] for non-2xx responses
    /// - [`ApiError::Transport`] when the transport fails
    /// - [`ApiError::Json`] when the body does not match the output type
    pub async fn send<R: ApiRequest>(&self, request: &R) -> Result<R::Output> {
        let response = self.execute(request).await?;
        request.parse_response(&response.body)
    }

    /// Sends a pageable request and wraps the items with the paging links.
    ///
    /// A response without a `Link` header yields empty links. The request is
    /// moved into the envelope so later navigation can derive from it.
    pub async fn fetch_page<R, T>(&self, request: R) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        let response = self.execute(&request).await?;
        let links = response
            .headers
            .get("link")
            .map(PagingLinks::parse)
            .unwrap_or_default();
        let items = request.parse_response(&response.body)?;

        Ok(PagedResponse::new(items, links, request))
    }

    /// Fetches the page after `page`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Navigation`] when `page` has no `next` link.
    pub async fn next_page<R, T>(&self, page: &PagedResponse<T, R>) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        self.navigate(page, LinkRelation::Next).await
    }

    /// Fetches the page before `page`.
    pub async fn previous_page<R, T>(&self, page: &PagedResponse<T, R>) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        self.navigate(page, LinkRelation::Prev).await
    }

    /// Fetches the first page of the result set `page` belongs to.
    pub async fn first_page<R, T>(&self, page: &PagedResponse<T, R>) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        self.navigate(page, LinkRelation::First).await
    }

    /// Fetches the last page of the result set `page` belongs to.
    pub async fn last_page<R, T>(&self, page: &PagedResponse<T, R>) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        self.navigate(page, LinkRelation::Last).await
    }

    /// Follows one link of `page`.
    ///
    /// The follow-up request is a copy of `page.request()` with the link's
    /// cursor; the original envelope is left as it was.
    async fn navigate<R, T>(
        &self,
        page: &PagedResponse<T, R>,
        relation: LinkRelation,
    ) -> Result<PagedResponse<T, R>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        let url = page
            .links()
            .get(relation)
            .ok_or(ApiError::Navigation(relation))?;
        let cursor = PageOptions::from_url(url)?;
        let request = page.request().with_page_options(cursor);

        tracing::debug!("Following {} link to page {}", relation, cursor.page());
        self.fetch_page(request).await
    }

    async fn execute<R: ApiRequest + ?Sized>(&self, request: &R) -> Result<RawResponse> {
        let prepared = prepare(request)?;
        let url = format!("{}{}", self.base_url, prepared.path);

        tracing::debug!(
            "{} {} ({} query params)",
            prepared.method,
            url,
            prepared.query.len()
        );

        let response = self
            .transport
            .send(
                prepared.method,
                &url,
                &prepared.query,
                prepared.body.as_deref(),
            )
            .await?;

        tracing::debug!("{} {} -> {}", prepared.method, url, response.status);

        if !response.is_success() {
            return Err(ApiError::from_response(response.status, &response.body));
        }

        Ok(response)
    }

    // Builds

    pub async fn list_builds(
        &self,
        request: ListBuildsRequest,
    ) -> Result<PagedResponse<Build, ListBuildsRequest>> {
        self.fetch_page(request).await
    }

    pub async fn get_build(&self, build: &BuildIdentifier) -> Result<Build> {
        self.send(&GetBuildRequest::new(build.clone())).await
    }

    pub async fn create_build(&self, options: CreateBuildOptions) -> Result<Build> {
        self.send(&CreateBuildRequest::new(options)).await
    }

    pub async fn cancel_build(&self, build: &BuildIdentifier) -> Result<Build> {
        self.send(&CancelBuildRequest::new(build.clone())).await
    }

    /// Re-runs a build; the result is the new build.
    pub async fn rebuild_build(&self, build: &BuildIdentifier) -> Result<Build> {
        self.send(&RebuildBuildRequest::new(build.clone())).await
    }

    pub async fn list_annotations(
        &self,
        request: ListAnnotationsRequest,
    ) -> Result<PagedResponse<Annotation, ListAnnotationsRequest>> {
        self.fetch_page(request).await
    }

    // Jobs

    pub async fn retry_job(&self, job: &JobIdentifier) -> Result<Job> {
        self.send(&RetryJobRequest::new(job.clone())).await
    }

    pub async fn unblock_job(&self, options: UnblockJobOptions) -> Result<Job> {
        self.send(&UnblockJobRequest::new(options)).await
    }

    // Pipelines

    pub async fn list_pipelines(
        &self,
        request: ListPipelinesRequest,
    ) -> Result<PagedResponse<Pipeline, ListPipelinesRequest>> {
        self.fetch_page(request).await
    }

    pub async fn get_pipeline(&self, pipeline: &PipelineIdentifier) -> Result<Pipeline> {
        self.send(&GetPipelineRequest::new(pipeline.clone())).await
    }

    // Organizations

    pub async fn list_organizations(
        &self,
        request: ListOrganizationsRequest,
    ) -> Result<PagedResponse<Organization, ListOrganizationsRequest>> {
        self.fetch_page(request).await
    }

    pub async fn get_organization(&self, organization: &OrganizationIdentifier) -> Result<Organization> {
        self.send(&GetOrganizationRequest::new(organization.clone()))
            .await
    }

    pub async fn list_emojis(&self, organization: &OrganizationIdentifier) -> Result<Vec<Emoji>> {
        self.send(&ListEmojisRequest::new(organization.clone())).await
    }

    // Account

    pub async fn access_token(&self) -> Result<AccessToken> {
        self.send(&GetAccessTokenRequest).await
    }

    pub async fn user(&self) -> Result<User> {
        self.send(&GetUserRequest).await
    }

    pub async fn meta(&self) -> Result<Meta> {
        self.send(&GetMetaRequest).await
    }

    pub async fn ping(&self) -> Result<PingResponse> {
        self.send(&PingRequest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resources::BuildFilters;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> BuildkiteClient {
        let transport = ReqwestTransport::new(Some("token".to_string()), None).unwrap();
        BuildkiteClient::new(&format!("{}/v2/", server.url()), Arc::new(transport)).unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        let transport = ReqwestTransport::new(None, None).unwrap();
        let err = BuildkiteClient::new("not a url", Arc::new(transport)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = Config::default();
        let client = BuildkiteClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.buildkite.com/v2");
    }

    #[tokio::test]
    async fn test_list_builds_parses_items_and_links() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/v2/organizations/acme/builds?page=2&per_page=2", server.url());
        let mock = server
            .mock("GET", "/v2/organizations/acme/builds")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("branch".into(), "main".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("Link", &format!("<{next}>; rel=\"next\""))
            .with_body(r#"[{"number":2,"state":"passed"},{"number":1,"state":"failed"}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = ListBuildsRequest::for_organization(
            OrganizationIdentifier::new("acme").unwrap(),
            BuildFilters::builder().branch("main").build(),
        )
        .with_page(PageOptions::new(1, 2));
        let page = client.list_builds(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.len(), 2);
        assert_eq!(page.items()[0].number, 2);
        assert!(page.has_next());
        assert!(!page.has_prev());
    }

    #[tokio::test]
    async fn test_rejected_request_surfaces_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/organizations/acme")
            .with_status(404)
            .with_body(r#"{"message":"No organization found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let org = OrganizationIdentifier::new("acme").unwrap();
        let err = client.get_organization(&org).await.unwrap_err();

        assert!(err.is_not_found());
        match err {
            ApiError::InvalidRequest { response, .. } => {
                assert_eq!(response.message, "No organization found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ping_with_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/ping")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.ping().await.unwrap(), PingResponse::default());
    }
}
