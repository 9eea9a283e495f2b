//
//  buildkite-cli
//  cli/account.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Commands about the token, its user, and the service itself.

use anyhow::{Context, Result};
use clap::Args;

use crate::api::resources::{AccessToken, Meta, PingResponse, User};
use crate::output::{print_field, print_header, TableOutput};
use crate::util::format_relative_time;

use super::GlobalOptions;

/// Show the user owning the API token.
#[derive(Args, Debug)]
pub struct WhoamiCommand {}

/// Show the API token's description and scopes.
#[derive(Args, Debug)]
pub struct TokenCommand {}

/// Show Buildkite service metadata.
#[derive(Args, Debug)]
pub struct MetaCommand {}

/// Check the API is reachable.
#[derive(Args, Debug)]
pub struct PingCommand {}

impl WhoamiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let client = global.client(&global.load_config()?)?;
        let user = client.user().await.context("Failed to get the current user")?;
        global.output().write(&user)
    }
}

impl TokenCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let client = global.client(&global.load_config()?)?;
        let token = client
            .access_token()
            .await
            .context("Failed to get the access token")?;
        global.output().write(&token)
    }
}

impl MetaCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let client = global.client(&global.load_config()?)?;
        let meta = client.meta().await.context("Failed to get service metadata")?;
        global.output().write(&meta)
    }
}

impl PingCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let client = global.client(&global.load_config()?)?;
        let ping = client
            .ping()
            .await
            .with_context(|| format!("Failed to reach {}", client.base_url()))?;

        let output = global.output();
        if global.json {
            output.write(&ping)?;
        } else {
            output.write_success(&format!("{} is reachable", client.base_url()));
            if let Some(message) = &ping.message {
                output.write_info(message);
            }
        }
        Ok(())
    }
}

impl TableOutput for User {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("Email", &self.email, color);
        print_field("ID", &self.id, color);
        if let Some(created) = self.created_at {
            print_field("Member since", &format_relative_time(created), color);
        }
    }
}

impl TableOutput for AccessToken {
    fn print_table(&self, color: bool) {
        print_header(self.description.as_deref().unwrap_or("Access token"));
        print_field("UUID", &self.uuid, color);
        if let Some(user) = &self.user {
            print_field("Owner", &format!("{} <{}>", user.name, user.email), color);
        }
        if let Some(created) = self.created_at {
            print_field("Created", &format_relative_time(created), color);
        }
        println!();
        println!("Scopes:");
        for scope in &self.scopes {
            println!("  {}", scope);
        }
    }
}

impl TableOutput for Meta {
    fn print_table(&self, _color: bool) {
        println!("Webhook IPs:");
        for ip in &self.webhook_ips {
            println!("  {}", ip);
        }
    }
}

impl TableOutput for PingResponse {
    fn print_table(&self, _color: bool) {
        println!("{}", self.message.as_deref().unwrap_or("pong"));
    }
}
