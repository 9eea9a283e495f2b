//
//  buildkite-cli
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Types for Buildkite API Responses
//!
//! Buildkite paginates every list endpoint with `page` and `per_page` query
//! parameters and advertises neighbouring pages through an RFC 8288 `Link`
//! header. This module models both halves of that contract.
//!
//! # Overview
//!
//! | Type | Role |
//! |------|------|
//! | [`PageOptions`] | The (page, size) cursor sent with a request |
//! | [`PagingLinks`] | The first/prev/next/last URLs returned with a page |
//! | [`LinkRelation`] | Names one of the four link relations |
//! | [`PagedResponse`] | One page of items plus links and the request that produced it |
//!
//! # Example
//!
//! ```rust
//! use buildkite_cli::api::common::{PageOptions, PagingLinks};
//!
//! let links = PagingLinks::parse(
//!     r#"<https://api.buildkite.com/v2/builds?page=2&per_page=10>; rel="next", <https://api.buildkite.com/v2/builds?page=7&per_page=10>; rel="last""#,
//! );
//!
//! assert!(links.has_next());
//! let next = PageOptions::from_url(links.next().unwrap()).unwrap();
//! assert_eq!(next.page(), 2);
//! assert_eq!(links.total_entries().unwrap(), 70);
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ApiError, Result};

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Matches the `page` query parameter without matching `per_page`.
static PAGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[?&;])page=([^&#;]*)").unwrap());

/// Matches the `per_page` query parameter.
static PER_PAGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[?&;])per_page=([^&#;]*)").unwrap());

/// Matches one `<URL>; rel="REL"` segment of a `Link` header.
static LINK_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*<([^>]*)>\s*;\s*rel\s*=\s*"([^"]*)"\s*$"#).unwrap());

/// A page cursor: which page to fetch and how many entries it holds.
///
/// `PageOptions` is an immutable value. Construction never fails; out of range
/// inputs are clamped so that the invariants below always hold.
///
/// # Invariants
///
/// - `page()` is always `>= 1`
/// - `size()` is always in `1..=100`
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::common::PageOptions;
///
/// let options = PageOptions::new(-1, 500);
/// assert_eq!(options.page(), 1);
/// assert_eq!(options.size(), 100);
///
/// let default = PageOptions::default();
/// assert_eq!((default.page(), default.size()), (1, 30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageOptions {
    page: u32,
    size: u32,
}

impl PageOptions {
    /// Creates a cursor, clamping `page` to at least 1 and `size` into `1..=100`.
    pub fn new(page: i64, size: i64) -> Self {
        let page = page.clamp(1, i64::from(u32::MAX)) as u32;
        let size = size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
        Self { page, size }
    }

    /// Extracts a cursor from the `page` and `per_page` parameters of a URL.
    ///
    /// The raw query string is pattern matched rather than decoded, so any
    /// unrelated parameters may appear around the two that matter, in any
    /// order. The extracted values are clamped exactly as [`PageOptions::new`]
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] when either parameter is missing or is not
    /// an integer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildkite_cli::api::common::PageOptions;
    ///
    /// let options = PageOptions::from_url("https://x.test/builds?per_page=202&page=303&x=y").unwrap();
    /// assert_eq!(options.page(), 303);
    /// assert_eq!(options.size(), 100);
    ///
    /// assert!(PageOptions::from_url("https://x.test/builds?per_page=10").is_err());
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let page = capture_number(&PAGE_PARAM, url, "page")?;
        let size = capture_number(&PER_PAGE_PARAM, url, "per_page")?;
        Ok(Self::new(page, size))
    }

    /// The 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The number of entries per page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns a copy of this cursor pointing at another page.
    pub fn with_page(self, page: i64) -> Self {
        Self::new(page, i64::from(self.size))
    }

    /// The query entries this cursor contributes to a request.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.size.to_string()),
        ]
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn capture_number(pattern: &Regex, url: &str, name: &str) -> Result<i64> {
    let raw = pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ApiError::Parse(format!("no `{name}` parameter in {url}")))?;

    raw.parse::<i64>()
        .map_err(|_| ApiError::Parse(format!("`{name}` is not a number in {url}: {raw:?}")))
}

/// One of the four relations carried by a pagination `Link` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRelation {
    /// `rel="first"`
    First,
    /// `rel="prev"`
    Prev,
    /// `rel="next"`
    Next,
    /// `rel="last"`
    Last,
}

impl LinkRelation {
    /// The `rel` value as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Prev => "prev",
            Self::Next => "next",
            Self::Last => "last",
        }
    }

    fn from_rel(rel: &str) -> Option<Self> {
        match rel {
            "first" => Some(Self::First),
            "prev" => Some(Self::Prev),
            "next" => Some(Self::Next),
            "last" => Some(Self::Last),
            _ => None,
        }
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cursor URLs returned alongside one page of results.
///
/// Any of the four links may be absent: the first page has no `prev`, the
/// last page has no `next`, and Buildkite drops `first`/`last` when they would
/// point at the current page. Presence checks never fail; the accessors fail
/// with [`ApiError::LinkAbsent`] instead of handing back a missing value.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::common::PagingLinks;
///
/// let links = PagingLinks::parse(r#"<https://x.test/a?page=2&per_page=5>; rel="prev""#);
/// assert!(links.has_prev());
/// assert!(!links.has_next());
/// assert!(links.next().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingLinks {
    first: Option<String>,
    prev: Option<String>,
    next: Option<String>,
    last: Option<String>,
}

impl PagingLinks {
    /// Parses a `Link` header value.
    ///
    /// The value is split on `,` and every segment is matched against
    /// `<URL>; rel="REL"`. Parsing is best effort: segments that do not match
    /// are skipped, and relations other than first/prev/next/last are ignored.
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();

        for segment in header.split(',') {
            let Some(caps) = LINK_SEGMENT.captures(segment) else {
                tracing::trace!("Skipping malformed Link segment: {:?}", segment);
                continue;
            };

            let url = caps[1].to_string();
            match LinkRelation::from_rel(&caps[2]) {
                Some(LinkRelation::First) => links.first = Some(url),
                Some(LinkRelation::Prev) => links.prev = Some(url),
                Some(LinkRelation::Next) => links.next = Some(url),
                Some(LinkRelation::Last) => links.last = Some(url),
                None => {}
            }
        }

        links
    }

    /// Returns the URL for a relation, if present.
    pub fn get(&self, relation: LinkRelation) -> Option<&str> {
        match relation {
            LinkRelation::First => self.first.as_deref(),
            LinkRelation::Prev => self.prev.as_deref(),
            LinkRelation::Next => self.next.as_deref(),
            LinkRelation::Last => self.last.as_deref(),
        }
    }

    pub fn has_first(&self) -> bool {
        self.first.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_last(&self) -> bool {
        self.last.is_some()
    }

    /// The `first` URL, or [`ApiError::LinkAbsent`].
    pub fn first(&self) -> Result<&str> {
        self.require(LinkRelation::First)
    }

    /// The `prev` URL, or [`ApiError::LinkAbsent`].
    pub fn prev(&self) -> Result<&str> {
        self.require(LinkRelation::Prev)
    }

    /// The `next` URL, or [`ApiError::LinkAbsent`].
    pub fn next(&self) -> Result<&str> {
        self.require(LinkRelation::Next)
    }

    /// The `last` URL, or [`ApiError::LinkAbsent`].
    pub fn last(&self) -> Result<&str> {
        self.require(LinkRelation::Last)
    }

    /// Estimates the total number of entries in the paginated collection.
    ///
    /// The estimate is `page * per_page` of the `last` link. It is an upper
    /// bound, not an exact count: the last page may be only partially filled,
    /// so the real total lies between `(page - 1) * per_page + 1` and the
    /// returned value.
    ///
    /// # Errors
    ///
    /// - [`ApiError::LinkAbsent`] when there is no `last` link
    /// - [`ApiError::Parse`] when the `last` URL has no usable cursor
    pub fn total_entries(&self) -> Result<u64> {
        let last = PageOptions::from_url(self.last()?)?;
        Ok(u64::from(last.page()) * u64::from(last.size()))
    }

    fn require(&self, relation: LinkRelation) -> Result<&str> {
        self.get(relation).ok_or(ApiError::LinkAbsent(relation))
    }
}

/// One page of results returned by a pageable request.
///
/// Besides the parsed items and the paging links, the envelope keeps the
/// request value that produced it. Page navigation derives the follow-up
/// request from that value, so callers never have to re-supply filters.
///
/// # Type Parameters
///
/// - `T` - The item type of the page
/// - `R` - The request type that produced the page
///
/// # Notes
///
/// - Items keep the order the server returned them in
/// - An empty page with a `next` link is still navigable; "no items" and
///   "no such page" are distinct outcomes
#[derive(Debug, Clone)]
pub struct PagedResponse<T, R> {
    items: Vec<T>,
    links: PagingLinks,
    request: R,
}

impl<T, R> PagedResponse<T, R> {
    pub fn new(items: Vec<T>, links: PagingLinks, request: R) -> Self {
        Self {
            items,
            links,
            request,
        }
    }

    /// The items of this page, in server order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn links(&self) -> &PagingLinks {
        &self.links
    }

    /// The request that produced this page.
    pub fn request(&self) -> &R {
        &self.request
    }

    pub fn has_next(&self) -> bool {
        self.links.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.links.has_prev()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T, R> IntoIterator for PagedResponse<T, R> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_page_and_size() {
        assert_eq!(PageOptions::new(-1, 500), PageOptions::new(1, 100));
        let options = PageOptions::new(5, 0);
        assert_eq!((options.page(), options.size()), (5, 1));
        let options = PageOptions::new(0, 30);
        assert_eq!((options.page(), options.size()), (1, 30));
    }

    #[test]
    fn test_default_is_first_page_of_thirty() {
        let options = PageOptions::default();
        assert_eq!((options.page(), options.size()), (1, 30));
    }

    #[test]
    fn test_from_url_clamps_and_ignores_other_params() {
        let options = PageOptions::from_url("https://x.test/v2/builds?per_page=202&page=303&x=y").unwrap();
        assert_eq!((options.page(), options.size()), (303, 100));

        let options = PageOptions::from_url("https://x.test/v2/builds?branch=main&page=4&state=failed&per_page=2").unwrap();
        assert_eq!((options.page(), options.size()), (4, 2));
    }

    #[test]
    fn test_from_url_does_not_confuse_per_page_with_page() {
        let err = PageOptions::from_url("https://x.test/v2/builds?per_page=20").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_from_url_requires_both_parameters() {
        assert!(matches!(
            PageOptions::from_url("https://x.test/v2/builds?page=3"),
            Err(ApiError::Parse(_))
        ));
        assert!(matches!(
            PageOptions::from_url("https://x.test/v2/builds"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_from_url_rejects_non_numeric_values() {
        assert!(matches!(
            PageOptions::from_url("https://x.test/v2/builds?page=two&per_page=10"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_query_pairs() {
        let pairs = PageOptions::new(3, 15).query_pairs();
        assert_eq!(pairs[0], ("page", "3".to_string()));
        assert_eq!(pairs[1], ("per_page", "15".to_string()));
    }

    #[test]
    fn test_parse_next_and_last() {
        let links = PagingLinks::parse(r#"<https://x.test/u1>; rel="next", <https://x.test/u2>; rel="last""#);
        assert!(links.has_next());
        assert!(links.has_last());
        assert!(!links.has_prev());
        assert!(!links.has_first());
        assert_eq!(links.next().unwrap(), "https://x.test/u1");
        assert_eq!(links.last().unwrap(), "https://x.test/u2");
    }

    #[test]
    fn test_parse_skips_malformed_segments() {
        let links = PagingLinks::parse(
            r#"<https://x.test/u1>; rel="first", garbage without brackets, <https://x.test/u3>; rel=next, <https://x.test/u4> ;  rel = "prev" "#,
        );
        assert_eq!(links.first().unwrap(), "https://x.test/u1");
        assert_eq!(links.prev().unwrap(), "https://x.test/u4");
        assert!(!links.has_next());
    }

    #[test]
    fn test_parse_ignores_unknown_relations() {
        let links = PagingLinks::parse(r#"<https://x.test/u1>; rel="self""#);
        assert_eq!(links, PagingLinks::default());
    }

    #[test]
    fn test_absent_link_accessor_fails() {
        let links = PagingLinks::default();
        assert!(matches!(links.first(), Err(ApiError::LinkAbsent(LinkRelation::First))));
        assert!(matches!(links.prev(), Err(ApiError::LinkAbsent(LinkRelation::Prev))));
        assert!(matches!(links.next(), Err(ApiError::LinkAbsent(LinkRelation::Next))));
        assert!(matches!(links.last(), Err(ApiError::LinkAbsent(LinkRelation::Last))));
    }

    #[test]
    fn test_total_entries() {
        let links = PagingLinks::parse(r#"<https://x.test/builds?page=4&per_page=2>; rel="last""#);
        assert_eq!(links.total_entries().unwrap(), 8);

        let links = PagingLinks::parse(r#"<https://x.test/builds?page=4&per_page=2>; rel="next""#);
        assert!(matches!(
            links.total_entries(),
            Err(ApiError::LinkAbsent(LinkRelation::Last))
        ));
    }

    #[test]
    fn test_paged_response_accessors() {
        let page = PagedResponse::new(vec![1, 2, 3], PagingLinks::default(), ());
        assert_eq!(page.len(), 3);
        assert!(!page.has_next());
        assert_eq!(page.into_items(), vec![1, 2, 3]);
    }
}
