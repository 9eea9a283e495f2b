//
//  buildkite-cli
//  api/composite.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Multi-Request Operations
//!
//! Operations that orchestrate several API calls on top of the single-call
//! methods of [`BuildkiteClient`]:
//!
//! - [`BuildkiteClient::retrieve_all_pages`] walks `next` links to the end
//! - [`BuildkiteClient::retrieve_newest_builds`] jumps to the final page of
//!   `n` builds using the total estimated from the `last` link
//! - [`BuildkiteClient::retry_jobs`] retries several jobs, one at a time
//!
//! All of them issue their requests sequentially.

use std::collections::HashSet;

use super::client::BuildkiteClient;
use super::common::{ApiError, PageOptions, Result, MAX_PAGE_SIZE};
use super::request::PageableRequest;
use super::resources::{Build, BulkOperationResult, Job, ListBuildsRequest, RetryJobsOptions};

impl BuildkiteClient {
    /// Fetches every page of a result set and concatenates the items.
    ///
    /// Starts at the request's own cursor and follows `next` links until a
    /// page has none. Items keep server order within and across pages.
    ///
    /// # Errors
    ///
    /// Any error of a single page fetch, and [`ApiError::Parse`] when a
    /// `next` link points back at a cursor that was already fetched.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use buildkite_cli::api::BuildkiteClient;
    /// use buildkite_cli::api::common::PageOptions;
    /// use buildkite_cli::api::resources::{ListPipelinesRequest, OrganizationIdentifier};
    ///
    /// # async fn example(client: BuildkiteClient) -> Result<(), buildkite_cli::api::ApiError> {
    /// let org = OrganizationIdentifier::new("acme")?;
    /// let request = ListPipelinesRequest::new(org).with_page(PageOptions::new(1, 100));
    /// let pipelines = client.retrieve_all_pages(request).await?;
    /// println!("{} pipelines", pipelines.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn retrieve_all_pages<R, T>(&self, request: R) -> Result<Vec<T>>
    where
        R: PageableRequest<Output = Vec<T>>,
    {
        let mut items = Vec::new();
        let mut visited = HashSet::from([request.page_options()]);
        let mut page = self.fetch_page(request).await?;
        let mut pages = 1usize;

        loop {
            let next = if page.has_next() {
                let cursor = PageOptions::from_url(page.links().next()?)?;
                if !visited.insert(cursor) {
                    return Err(ApiError::Parse(format!(
                        "`next` link repeats page {} (per_page {})",
                        cursor.page(),
                        cursor.size()
                    )));
                }
                Some(self.next_page(&page).await?)
            } else {
                None
            };
            items.extend(page.into_items());

            match next {
                Some(next) => {
                    page = next;
                    pages += 1;
                }
                None => break,
            }
        }

        tracing::debug!("Retrieved {} item(s) over {} page(s)", items.len(), pages);
        Ok(items)
    }

    /// Fetches the page of `n` builds that sits at the end of the result set.
    ///
    /// A probe request with cursor `(1, 1)` learns the total from the `last`
    /// link. When the probe has no `last` link it already holds the whole
    /// result set and its items are returned. Otherwise the request is
    /// re-issued with cursor `(total / n, n)`.
    ///
    /// `n` is clamped into `1..=100`. The page number is clamped to at least 1.
    ///
    /// # Notes
    ///
    /// - The total is an upper bound (see
    ///   [`PagingLinks::total_entries`](super::common::PagingLinks::total_entries)),
    ///   and `total / n` only lands exactly on the final `n` builds when `n`
    ///   divides the total
    /// - Items are returned in server order, not reversed
    /// - Buildkite lists builds newest first, so page `total / n` sits at the
    ///   end of that order and holds the oldest builds of the result set,
    ///   not the most recent ones
    pub async fn retrieve_newest_builds(
        &self,
        n: u32,
        request: ListBuildsRequest,
    ) -> Result<Vec<Build>> {
        let size = n.clamp(1, MAX_PAGE_SIZE);
        let probe = self
            .fetch_page(request.with_page_options(PageOptions::new(1, 1)))
            .await?;

        if !probe.links().has_last() {
            return Ok(probe.into_items());
        }

        let total = probe.links().total_entries()?;
        let target = (total / u64::from(size)).max(1);
        tracing::debug!("Estimated {} builds, fetching page {} of size {}", total, target, size);

        let cursor = PageOptions::new(i64::try_from(target).unwrap_or(i64::MAX), i64::from(size));
        let page = self.fetch_page(request.with_page_options(cursor)).await?;
        Ok(page.into_items())
    }

    /// Retries each job in `options`, in order.
    ///
    /// With `fail_fast` the first failure is returned as the error and the
    /// remaining jobs are not attempted. Without it, every job is attempted
    /// and each outcome lands in exactly one of `successes` or `failures`,
    /// keyed by the job id that was retried.
    pub async fn retry_jobs(&self, options: &RetryJobsOptions) -> Result<BulkOperationResult<Job>> {
        let mut result = BulkOperationResult::new();

        for request in options.requests()? {
            let job_id = request.job().job_id().to_string();

            match self.send(&request).await {
                Ok(job) => {
                    result.successes.insert(job_id, job);
                }
                Err(e) if options.fail_fast() => return Err(e),
                Err(e) => {
                    tracing::warn!("Retry of job {} failed: {}", job_id, e);
                    result.failures.insert(job_id, e);
                }
            }
        }

        Ok(result)
    }
}
