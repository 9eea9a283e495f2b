//
//  buildkite-cli
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Descriptors
//!
//! Every API operation is a small struct implementing [`ApiRequest`]. The
//! struct knows its HTTP method, its fully resolved path, the query parameters
//! it derives from its options, its optional JSON body, and how to parse the
//! response body into its output type.
//!
//! List operations additionally implement [`PageableRequest`]: they carry a
//! [`PageOptions`] cursor and can produce a copy of themselves pointing at
//! another page. The copy is a new value; the original request is never
//! modified.
//!
//! ## Flow
//!
//! ```text
//! options builder -> request struct -> prepare() -> Transport::send -> parse_response
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;

use super::common::{PageOptions, Result};

/// HTTP methods used by the Buildkite API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters of a request.
///
/// A multimap ordered by parameter name, where each name maps to a set of
/// values. Multi-valued filters such as `branch` contribute one entry per
/// value under the same name; inserting the same value twice keeps one entry.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::request::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.insert("branch", "main");
/// params.insert("branch", "release");
/// params.insert("state", "failed");
///
/// assert_eq!(params.len(), 3);
/// assert_eq!(params.values("branch").count(), 2);
/// assert_eq!(params.first("state"), Some("failed"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one value under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(name.into())
            .or_default()
            .insert(value.into());
    }

    /// Adds every value under `name`. Adds nothing for an empty iterator.
    pub fn insert_all<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.insert(name, value);
        }
    }

    /// Adds `value` under `name` when it is present and not empty.
    pub fn insert_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.insert(name, value);
        }
    }

    /// Values for `name`, in sorted order.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .get(name)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// The first value for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Parameter names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every `(name, value)` entry, ordered by name then value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Total number of entries across all names.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One API call.
///
/// Implementors provide the method and path and, where relevant, query
/// parameters and a body. Response parsing defaults to deserializing the body
/// as JSON into [`ApiRequest::Output`]; requests whose endpoint returns
/// something else override [`ApiRequest::parse_response`].
///
/// # Invariants
///
/// - [`ApiRequest::path`] is fully resolved and relative to the API base URL
/// - GET requests carry no body ([`prepare`] drops one if present)
pub trait ApiRequest: Send + Sync {
    /// The parsed response type.
    type Output: DeserializeOwned;

    fn method(&self) -> HttpMethod;

    /// Path relative to the API base URL, starting with `/`.
    fn path(&self) -> String;

    fn query_params(&self) -> QueryParams {
        QueryParams::new()
    }

    /// The serialized JSON body, if the request has one.
    fn body(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn parse_response(&self, body: &str) -> Result<Self::Output> {
        Ok(serde_json::from_str(body)?)
    }
}

/// A list request that can be re-issued for another page.
///
/// Implementors fold their cursor into [`ApiRequest::query_params`], so the
/// `page`/`per_page` parameters always reflect [`PageableRequest::page_options`].
pub trait PageableRequest: ApiRequest + Clone {
    /// The cursor this request will send.
    fn page_options(&self) -> PageOptions;

    /// A copy of this request with a different cursor.
    fn with_page_options(&self, options: PageOptions) -> Self;
}

/// The wire-level parts of a request, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<String>,
}

/// Turns a request into its wire-level parts.
///
/// # Errors
///
/// Propagates body serialization failures.
pub fn prepare<R: ApiRequest + ?Sized>(request: &R) -> Result<PreparedRequest> {
    let method = request.method();
    let body = match method {
        HttpMethod::Get => None,
        HttpMethod::Post | HttpMethod::Put => request.body()?,
    };
    let path = request.path();
    debug_assert!(
        !path.contains('{') && !path.contains('}'),
        "unresolved placeholder in path: {path}"
    );

    Ok(PreparedRequest {
        method,
        path,
        query: request.query_params(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        method: HttpMethod,
    }

    impl ApiRequest for Echo {
        type Output = serde_json::Value;

        fn method(&self) -> HttpMethod {
            self.method
        }

        fn path(&self) -> String {
            "/echo".to_string()
        }

        fn body(&self) -> Result<Option<String>> {
            Ok(Some("{}".to_string()))
        }
    }

    #[test]
    fn test_get_never_carries_body() {
        let prepared = prepare(&Echo { method: HttpMethod::Get }).unwrap();
        assert_eq!(prepared.body, None);
    }

    #[test]
    fn test_put_keeps_body() {
        let prepared = prepare(&Echo { method: HttpMethod::Put }).unwrap();
        assert_eq!(prepared.body.as_deref(), Some("{}"));
        assert_eq!(prepared.path, "/echo");
    }

    #[test]
    fn test_default_parse_response() {
        let value = Echo { method: HttpMethod::Get }
            .parse_response(r#"{"a":1}"#)
            .unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_query_params_multimap() {
        let mut params = QueryParams::new();
        params.insert_all("branch", ["b", "a", "a"]);
        params.insert_opt("creator", None);
        params.insert_opt("commit", Some(""));
        params.insert("state", "failed");

        assert_eq!(params.len(), 3);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["branch", "state"]);
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("branch", "a"), ("branch", "b"), ("state", "failed")]
        );
        assert!(!params.contains("creator"));
    }
}
