//
//  buildkite-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod account;
mod build;
mod completion;
mod config;
mod job;
mod organization;
mod pipeline;

pub use account::{MetaCommand, PingCommand, TokenCommand, WhoamiCommand};
pub use build::BuildCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use job::{JobCommand, PartialFailure};
pub use organization::OrgCommand;
pub use pipeline::PipelineCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::resources::{BuildIdentifier, OrganizationIdentifier, PipelineIdentifier};
use crate::api::{BuildkiteClient, PageOptions};
use crate::config::Config;
use crate::output::{OutputFormat, OutputWriter};

/// Buildkite CLI - Work with Buildkite from the command line
#[derive(Parser, Debug)]
#[command(
    name = "bk",
    version,
    about = "Work with Buildkite from the command line",
    long_about = "bk is a CLI for the Buildkite REST API.\n\n\
                  It lists, creates, cancels and rebuilds builds, retries and unblocks jobs, \
                  and inspects pipelines and organizations.",
    propagate_version = true,
    after_help = "Use 'bk <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Organization slug
    #[arg(long, short = 'o', global = true, env = "BUILDKITE_ORGANIZATION")]
    pub org: Option<String>,

    /// Pipeline slug
    #[arg(long, short = 'p', global = true, env = "BUILDKITE_PIPELINE")]
    pub pipeline: Option<String>,

    /// API access token
    #[arg(long, global = true, env = "BUILDKITE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalOptions {
    /// Writer for the selected output format.
    pub fn output(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.json))
    }

    /// Loads configuration with environment and flag overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load().context("Failed to load configuration")?;
        config.apply_env();
        if let Some(token) = &self.token {
            config.api.token = Some(token.clone());
        }
        Ok(config)
    }

    /// API client for `config`.
    pub fn client(&self, config: &Config) -> Result<BuildkiteClient> {
        if config.api.token.is_none() {
            tracing::warn!("No API token configured; set BUILDKITE_API_TOKEN or pass --token");
        }
        BuildkiteClient::from_config(config).context("Failed to create API client")
    }

    /// `--org`, else the configured default.
    pub fn organization(&self, config: &Config) -> Option<String> {
        self.org
            .clone()
            .or_else(|| config.defaults.organization.clone())
    }

    /// `--pipeline`, else the configured default.
    pub fn pipeline(&self, config: &Config) -> Option<String> {
        self.pipeline
            .clone()
            .or_else(|| config.defaults.pipeline.clone())
    }

    /// The default page cursor from configuration, overridden by flags.
    pub fn page_options(&self, config: &Config, page: u32, per_page: Option<u32>) -> PageOptions {
        let size = per_page.unwrap_or(config.defaults.per_page);
        PageOptions::new(i64::from(page), i64::from(size))
    }

    pub fn organization_id(&self, config: &Config) -> Result<OrganizationIdentifier> {
        let mut builder = OrganizationIdentifier::builder();
        if let Some(org) = self.organization(config) {
            builder = builder.organization(org);
        }
        Ok(builder.build()?)
    }

    /// Pipeline identifier; `pipeline` overrides the global/configured slug.
    pub fn pipeline_id(&self, config: &Config, pipeline: Option<&str>) -> Result<PipelineIdentifier> {
        let mut builder = PipelineIdentifier::builder();
        if let Some(org) = self.organization(config) {
            builder = builder.organization(org);
        }
        if let Some(pipeline) = pipeline.map(str::to_string).or_else(|| self.pipeline(config)) {
            builder = builder.pipeline(pipeline);
        }
        Ok(builder.build()?)
    }

    pub fn build_id(&self, config: &Config, number: u64) -> Result<BuildIdentifier> {
        let mut builder = BuildIdentifier::builder().number(number);
        if let Some(org) = self.organization(config) {
            builder = builder.organization(org);
        }
        if let Some(pipeline) = self.pipeline(config) {
            builder = builder.pipeline(pipeline);
        }
        Ok(builder.build()?)
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List, view, create, cancel and rebuild builds
    #[command(visible_alias = "b")]
    Build(BuildCommand),

    /// Retry and unblock jobs
    Job(JobCommand),

    /// List and view pipelines
    Pipeline(PipelineCommand),

    /// List and view organizations
    #[command(visible_alias = "organization")]
    Org(OrgCommand),

    /// Show the user owning the API token
    Whoami(WhoamiCommand),

    /// Show the API token's scopes
    Token(TokenCommand),

    /// Show Buildkite service metadata
    Meta(MetaCommand),

    /// Check the API is reachable
    Ping(PingCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),
}
