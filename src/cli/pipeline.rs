//
//  buildkite-cli
//  cli/pipeline.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipeline commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::resources::{ListPipelinesRequest, Pipeline};
use crate::output::{format_bool, print_field, print_header, TableOutput, TableRow};
use crate::util::{format_relative_time, truncate};

use super::GlobalOptions;

/// List and view pipelines of an organization.
#[derive(Args, Debug)]
pub struct PipelineCommand {
    #[command(subcommand)]
    pub command: PipelineSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PipelineSubcommand {
    /// List pipelines
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View pipeline details
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Pipelines per page (1-100)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Pipeline slug (defaults to --pipeline)
    pub slug: Option<String>,
}

impl PipelineCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            PipelineSubcommand::List(args) => self.list(args, global).await,
            PipelineSubcommand::View(args) => self.view(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let org = global.organization_id(&config)?;
        let request = ListPipelinesRequest::new(org.clone())
            .with_page(global.page_options(&config, args.page, args.per_page));
        let client = global.client(&config)?;

        let pipelines = if args.all {
            client.retrieve_all_pages(request).await
        } else {
            client.list_pipelines(request).await.map(|page| page.into_items())
        }
        .with_context(|| format!("Failed to list pipelines of {}", org.organization()))?;

        global.output().write_list(&pipelines, "No pipelines found")
    }

    async fn view(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = global.pipeline_id(&config, args.slug.as_deref())?;
        let client = global.client(&config)?;

        let pipeline = client
            .get_pipeline(&id)
            .await
            .with_context(|| format!("Failed to get pipeline {}", id.pipeline()))?;

        global.output().write(&pipeline)
    }
}

impl TableRow for Pipeline {
    fn headers() -> Vec<&'static str> {
        vec!["SLUG", "NAME", "DEFAULT BRANCH", "RUNNING", "SCHEDULED"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.slug.clone(),
            truncate(&self.name, 40),
            self.default_branch.clone().unwrap_or_else(|| "-".to_string()),
            self.running_builds_count.to_string(),
            self.scheduled_builds_count.to_string(),
        ]
    }
}

impl TableOutput for Pipeline {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("Slug", &self.slug, color);
        if let Some(description) = &self.description {
            print_field("Description", description, color);
        }
        if let Some(repository) = &self.repository {
            print_field("Repository", repository, color);
        }
        if let Some(branch) = &self.default_branch {
            print_field("Default branch", branch, color);
        }
        if let Some(visibility) = &self.visibility {
            print_field("Visibility", visibility, color);
        }
        print_field(
            "Running",
            &format!(
                "{} builds, {} jobs",
                self.running_builds_count, self.running_jobs_count
            ),
            color,
        );
        print_field(
            "Scheduled",
            &format!(
                "{} builds, {} jobs",
                self.scheduled_builds_count, self.scheduled_jobs_count
            ),
            color,
        );
        print_field("Has steps", &format_bool(!self.steps.is_empty(), color), color);
        if let Some(created) = self.created_at {
            print_field("Created", &format_relative_time(created), color);
        }
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_row() {
        let pipeline: Pipeline = serde_json::from_str(
            r#"{"slug":"web","name":"Web","default_branch":"main","running_builds_count":2}"#,
        )
        .unwrap();
        assert_eq!(pipeline.row(false), vec!["web", "Web", "main", "2", "0"]);
    }
}
