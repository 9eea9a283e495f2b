//
//  buildkite-cli
//  api/resources/annotations.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build annotations.
//!
//! Annotations are HTML snippets attached to a build by its steps, grouped by
//! `context` and styled by `style` (`success`, `info`, `warning`, `error`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builds::BuildIdentifier;
use crate::api::common::PageOptions;
use crate::api::request::{ApiRequest, HttpMethod, PageableRequest, QueryParams};

/// One annotation on a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    pub id: String,
    pub context: String,
    pub style: Option<String>,
    pub body_html: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// `GET …/builds/{number}/annotations`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAnnotationsRequest {
    build: BuildIdentifier,
    page: PageOptions,
}

impl ListAnnotationsRequest {
    pub fn new(build: BuildIdentifier) -> Self {
        Self {
            build,
            page: PageOptions::default(),
        }
    }

    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }
}

impl ApiRequest for ListAnnotationsRequest {
    type Output = Vec<Annotation>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("{}/annotations", self.build.path())
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (name, value) in self.page.query_pairs() {
            params.insert(name, value);
        }
        params
    }
}

impl PageableRequest for ListAnnotationsRequest {
    fn page_options(&self) -> PageOptions {
        self.page
    }

    fn with_page_options(&self, options: PageOptions) -> Self {
        self.clone().with_page(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resources::pipelines::PipelineIdentifier;

    #[test]
    fn test_annotations_path_and_cursor() {
        let build = BuildIdentifier::new(PipelineIdentifier::new("acme", "web").unwrap(), 7).unwrap();
        let request = ListAnnotationsRequest::new(build).with_page(PageOptions::new(2, 5));

        assert_eq!(
            request.path(),
            "/organizations/acme/pipelines/web/builds/7/annotations"
        );
        assert_eq!(request.page_options(), PageOptions::new(2, 5));
        assert_eq!(request.query_params().first("per_page"), Some("5"));
    }

    #[test]
    fn test_annotation_parses() {
        let annotation: Annotation = serde_json::from_str(
            r#"{"id":"a1","context":"junit","style":"error","body_html":"<p>2 failures</p>"}"#,
        )
        .unwrap();
        assert_eq!(annotation.context, "junit");
        assert_eq!(annotation.style.as_deref(), Some("error"));
    }
}
