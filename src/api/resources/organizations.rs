//
//  buildkite-cli
//  api/resources/organizations.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Organization types and requests, including custom emojis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::validation::{validate, Requirement};
use crate::api::common::{PageOptions, Result};
use crate::api::request::{ApiRequest, HttpMethod, PageableRequest, QueryParams};

/// A Buildkite organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: String,
    pub graphql_id: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,
    pub name: String,
    pub slug: String,
    pub pipelines_url: Option<String>,
    pub agents_url: Option<String>,
    pub emojis_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A custom emoji defined by an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emoji {
    pub name: String,
    pub url: String,
    pub aliases: Vec<String>,
}

/// The slug of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrganizationIdentifier {
    organization: String,
}

impl OrganizationIdentifier {
    pub fn builder() -> OrganizationIdentifierBuilder {
        OrganizationIdentifierBuilder::default()
    }

    pub fn new(organization: impl Into<String>) -> Result<Self> {
        Self::builder().organization(organization).build()
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// `/organizations/{org}`
    pub fn path(&self) -> String {
        format!("/organizations/{}", self.organization)
    }
}

/// Builder for [`OrganizationIdentifier`].
#[derive(Debug, Clone, Default)]
pub struct OrganizationIdentifierBuilder {
    organization: Option<String>,
}

impl OrganizationIdentifierBuilder {
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn build(self) -> Result<OrganizationIdentifier> {
        validate(&[Requirement::slug(
            "organization",
            self.organization.as_deref(),
        )])?;

        Ok(OrganizationIdentifier {
            organization: self.organization.unwrap_or_default(),
        })
    }
}

/// `GET /organizations`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOrganizationsRequest {
    page: PageOptions,
}

impl ListOrganizationsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }
}

impl ApiRequest for ListOrganizationsRequest {
    type Output = Vec<Organization>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/organizations".to_string()
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (name, value) in self.page.query_pairs() {
            params.insert(name, value);
        }
        params
    }
}

impl PageableRequest for ListOrganizationsRequest {
    fn page_options(&self) -> PageOptions {
        self.page
    }

    fn with_page_options(&self, options: PageOptions) -> Self {
        self.clone().with_page(options)
    }
}

/// `GET /organizations/{org}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrganizationRequest {
    organization: OrganizationIdentifier,
}

impl GetOrganizationRequest {
    pub fn new(organization: OrganizationIdentifier) -> Self {
        Self { organization }
    }
}

impl ApiRequest for GetOrganizationRequest {
    type Output = Organization;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        self.organization.path()
    }
}

/// `GET /organizations/{org}/emojis`
///
/// Not paginated; the whole set comes back in one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEmojisRequest {
    organization: OrganizationIdentifier,
}

impl ListEmojisRequest {
    pub fn new(organization: OrganizationIdentifier) -> Self {
        Self { organization }
    }
}

impl ApiRequest for ListEmojisRequest {
    type Output = Vec<Emoji>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("{}/emojis", self.organization.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_blank_organization_is_missing() {
        let err = OrganizationIdentifier::new("   ").unwrap_err();
        assert!(matches!(err, ApiError::BuilderValidation { field: "organization" }));
    }

    #[test]
    fn test_organization_paths() {
        let org = OrganizationIdentifier::new("acme").unwrap();
        assert_eq!(GetOrganizationRequest::new(org.clone()).path(), "/organizations/acme");
        assert_eq!(ListEmojisRequest::new(org).path(), "/organizations/acme/emojis");
        assert_eq!(ListOrganizationsRequest::new().path(), "/organizations");
    }

    #[test]
    fn test_list_organizations_paging() {
        let request = ListOrganizationsRequest::new().with_page(PageOptions::new(2, 100));
        let params = request.query_params();
        assert_eq!(params.first("page"), Some("2"));
        assert_eq!(params.first("per_page"), Some("100"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_emoji_aliases_default_empty() {
        let emojis: Vec<Emoji> =
            serde_json::from_str(r#"[{"name":"rocket","url":"https://e.test/rocket.png"}]"#).unwrap();
        assert_eq!(emojis[0].name, "rocket");
        assert!(emojis[0].aliases.is_empty());
    }
}
