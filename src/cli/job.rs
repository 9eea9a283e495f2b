//
//  buildkite-cli
//  cli/job.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Job commands: retry and unblock.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::resources::{Job, JobIdentifier, RetryJobsOptions, UnblockJobOptions};
use crate::output::{print_field, print_header, TableOutput, TableRow};
use crate::util::parse_key_value;

use super::GlobalOptions;

/// Some jobs of a bulk retry failed.
///
/// Returned after every job was attempted, so the process exits with the
/// partial failure code.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {attempted} job retries failed")]
pub struct PartialFailure {
    pub failed: usize,
    pub attempted: usize,
}

/// Manage jobs.
#[derive(Args, Debug)]
pub struct JobCommand {
    #[command(subcommand)]
    pub command: JobSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum JobSubcommand {
    /// Retry one or more jobs of a build
    Retry(RetryArgs),

    /// Unblock a block step
    Unblock(UnblockArgs),
}

#[derive(Args, Debug)]
pub struct RetryArgs {
    /// Build number
    pub build: u64,

    /// Job ids to retry
    #[arg(required = true)]
    pub job_ids: Vec<String>,

    /// Stop at the first failed retry
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args, Debug)]
pub struct UnblockArgs {
    /// Build number
    pub build: u64,

    /// Job id of the block step
    pub job: String,

    /// User id to unblock as
    #[arg(long)]
    pub unblocker: Option<String>,

    /// Block step field (KEY=VALUE, repeatable)
    #[arg(long, short = 'f', value_name = "KEY=VALUE")]
    pub field: Vec<String>,
}

/// JSON shape of a bulk retry.
#[derive(Debug, Serialize)]
struct RetrySummary<'a> {
    retried: Vec<&'a Job>,
    failed: Vec<RetryFailure>,
}

#[derive(Debug, Serialize)]
struct RetryFailure {
    job_id: String,
    error: String,
}

impl JobCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            JobSubcommand::Retry(args) => self.retry(args, global).await,
            JobSubcommand::Unblock(args) => self.unblock(args, global).await,
        }
    }

    async fn retry(&self, args: &RetryArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let build = global.build_id(&config, args.build)?;
        let options = RetryJobsOptions::builder()
            .organization(build.pipeline().organization())
            .pipeline(build.pipeline().pipeline())
            .build_number(build.number())
            .job_ids(args.job_ids.iter().cloned())
            .fail_fast(args.fail_fast)
            .build()?;
        let client = global.client(&config)?;

        if options.job_ids().len() == 1 {
            let job_id = JobIdentifier::new(build, options.job_ids()[0].as_str())?;
            let job = client
                .retry_job(&job_id)
                .await
                .with_context(|| format!("Failed to retry job {}", job_id.job_id()))?;
            let output = global.output();
            output.write_success(&format!("Retried {}", job.label()));
            return output.write(&job);
        }

        let result = client
            .retry_jobs(&options)
            .await
            .context("Failed to retry jobs")?;

        let output = global.output();
        if global.json {
            let summary = RetrySummary {
                retried: result.successes.values().collect(),
                failed: result
                    .failures
                    .iter()
                    .map(|(job_id, e)| RetryFailure {
                        job_id: job_id.clone(),
                        error: e.to_string(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            for (job_id, job) in &result.successes {
                output.write_success(&format!("Retried {} ({})", job.label(), job_id));
            }
            for (job_id, e) in &result.failures {
                output.write_error(&format!("Job {}: {}", job_id, e));
            }
        }

        if result.is_success() {
            Ok(())
        } else {
            Err(PartialFailure {
                failed: result.failures.len(),
                attempted: result.attempted(),
            }
            .into())
        }
    }

    async fn unblock(&self, args: &UnblockArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let build = global.build_id(&config, args.build)?;

        let mut builder = UnblockJobOptions::builder()
            .organization(build.pipeline().organization())
            .pipeline(build.pipeline().pipeline())
            .build_number(build.number())
            .job_id(args.job.clone());
        if let Some(unblocker) = &args.unblocker {
            builder = builder.unblocker(unblocker.clone());
        }
        for pair in &args.field {
            let (key, value) = parse_key_value(pair)?;
            builder = builder.field(key, value);
        }
        let options = builder.build()?;
        let client = global.client(&config)?;

        let job = client
            .unblock_job(options)
            .await
            .with_context(|| format!("Failed to unblock job {}", args.job))?;

        let output = global.output();
        output.write_success(&format!("Unblocked {}", job.label()));
        if global.json {
            output.write(&job)?;
        }
        Ok(())
    }
}

impl TableOutput for Job {
    fn print_table(&self, color: bool) {
        print_header(self.label());
        let row = self.row(color);
        print_field("ID", &row[0], color);
        print_field("Type", &self.job_type, color);
        print_field("State", &row[2], color);
        print_field("Exit status", &row[3], color);
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_partial_failure_message() {
        let err = PartialFailure {
            failed: 1,
            attempted: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 job retries failed");
    }

    #[test]
    fn test_retry_requires_job_ids() {
        assert!(Cli::try_parse_from(["bk", "job", "retry", "12"]).is_err());

        let cli = Cli::try_parse_from(["bk", "job", "retry", "12", "a", "b", "--fail-fast"]).unwrap();
        match cli.command {
            crate::cli::Commands::Job(JobCommand {
                command: JobSubcommand::Retry(args),
            }) => {
                assert_eq!(args.build, 12);
                assert_eq!(args.job_ids, vec!["a", "b"]);
                assert!(args.fail_fast);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
