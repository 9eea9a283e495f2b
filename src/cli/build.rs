//
//  buildkite-cli
//  cli/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build commands.
//!
//! Lists builds across every organization, one organization or one pipeline,
//! depending on which of `--org`/`--pipeline` are known, and acts on single
//! builds of a pipeline by number.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::resources::{
    Annotation, Build, BuildFilters, BuildScope, BuildState, CreateBuildOptions, Job,
    ListAnnotationsRequest, ListBuildsRequest, PipelineIdentifier,
};
use crate::config::Config;
use crate::output::{format_state, print_field, print_header, TableBuilder, TableOutput, TableRow};
use crate::util::{first_line, format_duration, format_relative_time, parse_datetime, parse_key_value, truncate};

use super::GlobalOptions;

/// Manage builds.
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(subcommand)]
    pub command: BuildSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BuildSubcommand {
    /// List builds
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a build and its jobs
    View(NumberArgs),

    /// Create a new build
    Create(CreateArgs),

    /// Cancel a running or scheduled build
    Cancel(NumberArgs),

    /// Rebuild a build
    Rebuild(NumberArgs),

    /// List a build's annotations
    Annotations(AnnotationsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by branch (repeatable)
    #[arg(long, short = 'b')]
    pub branch: Vec<String>,

    /// Filter by commit SHA (repeatable)
    #[arg(long, short = 'c')]
    pub commit: Vec<String>,

    /// Filter by state (repeatable)
    #[arg(long, short = 's')]
    pub state: Vec<BuildState>,

    /// Filter by creator user id
    #[arg(long)]
    pub creator: Option<String>,

    /// Filter by build meta-data (KEY=VALUE, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Only builds created on or after this date
    #[arg(long, value_name = "DATE")]
    pub created_from: Option<String>,

    /// Only builds created before this date
    #[arg(long, value_name = "DATE")]
    pub created_to: Option<String>,

    /// Only builds finished on or after this date
    #[arg(long, value_name = "DATE")]
    pub finished_from: Option<String>,

    /// Include retried jobs in the response
    #[arg(long)]
    pub include_retried_jobs: bool,

    /// Page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Builds per page (1-100)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Fetch every page
    #[arg(long, conflicts_with = "newest")]
    pub all: bool,

    /// Fetch the final page of N builds, located from the `last` link
    ///
    /// Buildkite lists builds newest first, so this page holds the oldest N
    /// builds matching the filters.
    #[arg(long, value_name = "N")]
    pub newest: Option<u32>,
}

#[derive(Args, Debug)]
pub struct NumberArgs {
    /// Build number
    pub number: u64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Commit SHA or HEAD
    #[arg(long, short = 'c', default_value = "HEAD")]
    pub commit: String,

    /// Branch to build
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Build message
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Environment variable (KEY=VALUE, repeatable)
    #[arg(long, short = 'e', value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Build meta-data (KEY=VALUE, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Force a fresh checkout
    #[arg(long)]
    pub clean_checkout: bool,

    /// Ignore the pipeline's branch filters
    #[arg(long)]
    pub ignore_branch_filters: bool,
}

#[derive(Args, Debug)]
pub struct AnnotationsArgs {
    /// Build number
    pub number: u64,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

impl BuildCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            BuildSubcommand::List(args) => self.list(args, global).await,
            BuildSubcommand::View(args) => self.view(args, global).await,
            BuildSubcommand::Create(args) => self.create(args, global).await,
            BuildSubcommand::Cancel(args) => self.cancel(args, global).await,
            BuildSubcommand::Rebuild(args) => self.rebuild(args, global).await,
            BuildSubcommand::Annotations(args) => self.annotations(args, global).await,
        }
    }

    /// Scope from the known slugs: pipeline, then organization, then everything.
    fn scope(&self, global: &GlobalOptions, config: &Config) -> Result<BuildScope> {
        match (global.organization(config), global.pipeline(config)) {
            (_, Some(_)) => Ok(BuildScope::Pipeline(global.pipeline_id(config, None)?)),
            (Some(_), None) => Ok(BuildScope::Organization(global.organization_id(config)?)),
            (None, None) => Ok(BuildScope::All),
        }
    }

    fn filters(&self, args: &ListArgs) -> Result<BuildFilters> {
        let mut builder = BuildFilters::builder()
            .branches(args.branch.iter().cloned())
            .commits(args.commit.iter().cloned())
            .states(args.state.iter().copied());

        if let Some(creator) = &args.creator {
            builder = builder.creator(creator.clone());
        }
        for pair in &args.meta {
            let (key, value) = parse_key_value(pair)?;
            builder = builder.metadata(key, value);
        }
        if let Some(date) = &args.created_from {
            builder = builder.created_from(parse_datetime(date)?);
        }
        if let Some(date) = &args.created_to {
            builder = builder.created_to(parse_datetime(date)?);
        }
        if let Some(date) = &args.finished_from {
            builder = builder.finished_from(parse_datetime(date)?);
        }
        if args.include_retried_jobs {
            builder = builder.include_retried_jobs(true);
        }

        Ok(builder.build())
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let request = ListBuildsRequest::new(self.scope(global, &config)?, self.filters(args)?)
            .with_page(global.page_options(&config, args.page, args.per_page));
        let client = global.client(&config)?;

        let builds = if let Some(n) = args.newest {
            client
                .retrieve_newest_builds(n, request)
                .await
                .context("Failed to fetch newest builds")?
        } else if args.all {
            client
                .retrieve_all_pages(request)
                .await
                .context("Failed to list builds")?
        } else {
            client
                .list_builds(request)
                .await
                .context("Failed to list builds")?
                .into_items()
        };

        global.output().write_list(&builds, "No builds found")
    }

    async fn view(&self, args: &NumberArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = global.build_id(&config, args.number)?;
        let client = global.client(&config)?;

        let build = client
            .get_build(&id)
            .await
            .with_context(|| format!("Failed to get build #{}", args.number))?;

        global.output().write(&build)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let pipeline = global.pipeline_id(&config, None)?;
        let options = self.create_options(args, &pipeline)?;
        let client = global.client(&config)?;

        let build = client
            .create_build(options)
            .await
            .context("Failed to create build")?;

        let output = global.output();
        output.write_success(&format!("Created build #{}", build.number));
        output.write(&build)
    }

    fn create_options(&self, args: &CreateArgs, pipeline: &PipelineIdentifier) -> Result<CreateBuildOptions> {
        let mut builder = CreateBuildOptions::builder()
            .organization(pipeline.organization())
            .pipeline(pipeline.pipeline())
            .commit(args.commit.clone());

        if let Some(branch) = &args.branch {
            builder = builder.branch(branch.clone());
        }
        if let Some(message) = &args.message {
            builder = builder.message(message.clone());
        }
        for pair in &args.env {
            let (key, value) = parse_key_value(pair)?;
            builder = builder.env(key, value);
        }
        for pair in &args.meta {
            let (key, value) = parse_key_value(pair)?;
            builder = builder.meta_data(key, value);
        }
        if args.clean_checkout {
            builder = builder.clean_checkout(true);
        }
        if args.ignore_branch_filters {
            builder = builder.ignore_pipeline_branch_filters(true);
        }

        Ok(builder.build()?)
    }

    async fn cancel(&self, args: &NumberArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = global.build_id(&config, args.number)?;
        let client = global.client(&config)?;

        let build = client
            .cancel_build(&id)
            .await
            .with_context(|| format!("Failed to cancel build #{}", args.number))?;

        let output = global.output();
        output.write_success(&format!("Build #{} is {}", build.number, build.state));
        if global.json {
            output.write(&build)?;
        }
        Ok(())
    }

    async fn rebuild(&self, args: &NumberArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = global.build_id(&config, args.number)?;
        let client = global.client(&config)?;

        let build = client
            .rebuild_build(&id)
            .await
            .with_context(|| format!("Failed to rebuild build #{}", args.number))?;

        let output = global.output();
        output.write_success(&format!("Rebuilt #{} as #{}", args.number, build.number));
        if global.json {
            output.write(&build)?;
        }
        Ok(())
    }

    async fn annotations(&self, args: &AnnotationsArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = global.build_id(&config, args.number)?;
        let client = global.client(&config)?;

        let request = ListAnnotationsRequest::new(id);
        let annotations = if args.all {
            client.retrieve_all_pages(request).await
        } else {
            client.list_annotations(request).await.map(|page| page.into_items())
        }
        .with_context(|| format!("Failed to list annotations of build #{}", args.number))?;

        global.output().write_list(&annotations, "No annotations")
    }
}

fn build_duration(build: &Build) -> String {
    build
        .duration_secs()
        .and_then(|secs| u64::try_from(secs).ok())
        .map(|secs| format_duration(Duration::from_secs(secs)))
        .unwrap_or_else(|| "-".to_string())
}

impl TableRow for Build {
    fn headers() -> Vec<&'static str> {
        vec!["#", "STATE", "BRANCH", "MESSAGE", "CREATED", "DURATION"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.number.to_string(),
            format_state(self.state.as_str(), color),
            self.branch.clone(),
            truncate(first_line(self.message.as_deref().unwrap_or_default()), 50),
            self.created_at
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
            build_duration(self),
        ]
    }
}

impl TableOutput for Build {
    fn print_table(&self, color: bool) {
        print_header(&format!(
            "Build #{} {}",
            self.number,
            first_line(self.message.as_deref().unwrap_or_default())
        ));
        print_field("State", &format_state(self.state.as_str(), color), color);
        print_field("Branch", &self.branch, color);
        print_field("Commit", &self.commit, color);
        if let Some(pipeline) = &self.pipeline {
            print_field("Pipeline", &pipeline.slug, color);
        }
        if let Some(creator) = &self.creator {
            print_field("Created by", &creator.name, color);
        }
        if let Some(created) = self.created_at {
            print_field("Created", &format_relative_time(created), color);
        }
        print_field("Duration", &build_duration(self), color);
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }
        for (key, value) in &self.meta_data {
            print_field(&format!("meta {}", key), value, color);
        }

        let jobs: Vec<&Job> = self.jobs.iter().filter(|j| j.job_type != "waiter").collect();
        if !jobs.is_empty() {
            println!();
            TableBuilder::new()
                .color(color)
                .headers(Job::headers())
                .rows(jobs.iter().map(|job| job.row(color)))
                .print();
        }
    }
}

impl TableRow for Job {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "STEP", "STATE", "EXIT"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate(self.label(), 40),
            format_state(self.state.as_deref().unwrap_or("-"), color),
            self.exit_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableRow for Annotation {
    fn headers() -> Vec<&'static str> {
        vec!["CONTEXT", "STYLE", "BODY"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let style = self.style.as_deref().unwrap_or("default");
        let style = match (color, style) {
            (true, "error") => console::style(style).red().to_string(),
            (true, "warning") => console::style(style).yellow().to_string(),
            (true, "success") => console::style(style).green().to_string(),
            _ => style.to_string(),
        };
        vec![
            self.context.clone(),
            style,
            truncate(first_line(self.body_html.trim()), 60),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resources::OrganizationIdentifier;
    use crate::api::ApiError;

    fn list_args() -> ListArgs {
        ListArgs {
            branch: vec!["main".to_string()],
            commit: vec![],
            state: vec![BuildState::Failed, BuildState::Canceled],
            creator: None,
            meta: vec!["release=v1".to_string()],
            created_from: Some("2024-01-01".to_string()),
            created_to: None,
            finished_from: None,
            include_retried_jobs: false,
            page: 1,
            per_page: None,
            all: false,
            newest: None,
        }
    }

    #[test]
    fn test_filters_from_args() {
        let filters = BuildCommand {
            command: BuildSubcommand::List(list_args()),
        }
        .filters(&list_args())
        .unwrap();
        let params = filters.query_params();

        assert_eq!(params.first("branch"), Some("main"));
        assert_eq!(params.values("state").count(), 2);
        assert_eq!(params.first("metadata[release]"), Some("v1"));
        assert_eq!(params.first("created_from"), Some("2024-01-01T00:00:00Z"));
        assert!(!params.contains("include_retried_jobs"));
    }

    #[test]
    fn test_scope_prefers_pipeline() {
        let cmd = BuildCommand {
            command: BuildSubcommand::List(list_args()),
        };
        let config = Config::default();

        let global = GlobalOptions::default();
        assert_eq!(cmd.scope(&global, &config).unwrap(), BuildScope::All);

        let global = GlobalOptions {
            org: Some("acme".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cmd.scope(&global, &config).unwrap(),
            BuildScope::Organization(OrganizationIdentifier::new("acme").unwrap())
        );

        let global = GlobalOptions {
            org: Some("acme".to_string()),
            pipeline: Some("web".to_string()),
            ..Default::default()
        };
        assert!(matches!(cmd.scope(&global, &config).unwrap(), BuildScope::Pipeline(_)));
    }

    #[test]
    fn test_blank_organization_scope_fails_validation() {
        let cmd = BuildCommand {
            command: BuildSubcommand::List(list_args()),
        };
        let global = GlobalOptions {
            org: Some("   ".to_string()),
            ..Default::default()
        };
        let err = cmd.scope(&global, &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::BuilderValidation { field: "organization" })
        ));
    }

    #[test]
    fn test_build_row() {
        let build: Build = serde_json::from_str(
            r#"{"number":7,"state":"passed","branch":"main","message":"Fix it\n\nbody"}"#,
        )
        .unwrap();
        let row = build.row(false);
        assert_eq!(row[0], "7");
        assert_eq!(row[1], "passed");
        assert_eq!(row[3], "Fix it");
        assert_eq!(row[5], "-");
    }
}
