//
//  buildkite-cli
//  cli/organization.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Organization commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::resources::{Emoji, ListOrganizationsRequest, Organization, OrganizationIdentifier};
use crate::config::Config;
use crate::output::{print_field, print_header, TableOutput, TableRow};
use crate::util::format_relative_time;

use super::GlobalOptions;

/// List and view organizations.
#[derive(Args, Debug)]
pub struct OrgCommand {
    #[command(subcommand)]
    pub command: OrgSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum OrgSubcommand {
    /// List organizations the token can access
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View an organization
    View(ViewArgs),

    /// List an organization's custom emojis
    Emojis(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Organizations per page (1-100)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Organization slug (defaults to --org)
    pub slug: Option<String>,
}

impl OrgCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            OrgSubcommand::List(args) => self.list(args, global).await,
            OrgSubcommand::View(args) => self.view(args, global).await,
            OrgSubcommand::Emojis(args) => self.emojis(args, global).await,
        }
    }

    /// The positional slug, else `--org` or the configured default.
    fn organization_id(
        &self,
        args: &ViewArgs,
        global: &GlobalOptions,
        config: &Config,
    ) -> Result<OrganizationIdentifier> {
        match &args.slug {
            Some(slug) => Ok(OrganizationIdentifier::new(slug.as_str())?),
            None => global.organization_id(config),
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let request = ListOrganizationsRequest::new()
            .with_page(global.page_options(&config, args.page, args.per_page));
        let client = global.client(&config)?;

        let organizations = if args.all {
            client.retrieve_all_pages(request).await
        } else {
            client.list_organizations(request).await.map(|page| page.into_items())
        }
        .context("Failed to list organizations")?;

        global.output().write_list(&organizations, "No organizations found")
    }

    async fn view(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = self.organization_id(args, global, &config)?;
        let client = global.client(&config)?;

        let organization = client
            .get_organization(&id)
            .await
            .with_context(|| format!("Failed to get organization {}", id.organization()))?;

        global.output().write(&organization)
    }

    async fn emojis(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let id = self.organization_id(args, global, &config)?;
        let client = global.client(&config)?;

        let emojis = client
            .list_emojis(&id)
            .await
            .with_context(|| format!("Failed to list emojis of {}", id.organization()))?;

        global.output().write_list(&emojis, "No custom emojis")
    }
}

impl TableRow for Organization {
    fn headers() -> Vec<&'static str> {
        vec!["SLUG", "NAME", "CREATED"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.slug.clone(),
            self.name.clone(),
            self.created_at
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableOutput for Organization {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("Slug", &self.slug, color);
        print_field("ID", &self.id, color);
        if let Some(created) = self.created_at {
            print_field("Created", &format_relative_time(created), color);
        }
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }
    }
}

impl TableRow for Emoji {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "ALIASES", "URL"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            format!(":{}:", self.name),
            self.aliases.join(", "),
            self.url.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_slug_wins() {
        let cmd = OrgCommand {
            command: OrgSubcommand::View(ViewArgs { slug: None }),
        };
        let args = ViewArgs {
            slug: Some("acme".to_string()),
        };
        let id = cmd
            .organization_id(&args, &GlobalOptions::default(), &Config::default())
            .unwrap();
        assert_eq!(id.path(), "/organizations/acme");
    }

    #[test]
    fn test_emoji_row() {
        let emoji: Emoji =
            serde_json::from_str(r#"{"name":"rocket","url":"https://e/r.png","aliases":["ship"]}"#).unwrap();
        assert_eq!(emoji.row(false)[0], ":rocket:");
        assert_eq!(emoji.row(false)[1], "ship");
    }
}
