//
//  buildkite-cli
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the configuration file by dotted key, such as
//! `defaults.organization` or `api.timeout_secs`.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::Config;

use super::GlobalOptions;

/// Every configuration key, in display order.
const KEYS: &[&str] = &[
    "api.base_url",
    "api.token",
    "api.timeout_secs",
    "defaults.organization",
    "defaults.pipeline",
    "defaults.per_page",
];

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global).await,
            ConfigSubcommand::Set(args) => self.set(args, global).await,
            ConfigSubcommand::List => self.list(global).await,
            ConfigSubcommand::Path => self.path(global).await,
        }
    }

    async fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        if !KEYS.contains(&args.key.as_str()) {
            bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                args.key,
                KEYS.join(", ")
            );
        }

        let config = Config::load()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }

        Ok(())
    }

    async fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        let mut config = Config::load()?;
        config.set(&args.key, args.value.clone())?;
        config.save()?;

        let shown = display_value(&args.key, Some(args.value.clone()));
        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": shown,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                shown.unwrap_or_default()
            );
        }

        Ok(())
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;
        let values: Vec<(&str, Option<String>)> = KEYS
            .iter()
            .map(|key| (*key, display_value(key, config.get(key))))
            .collect();

        if global.json {
            let map: serde_json::Map<String, serde_json::Value> = values
                .into_iter()
                .map(|(key, value)| (key.to_string(), serde_json::json!(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
            return Ok(());
        }

        for (key, value) in values {
            println!("{}: {}", style(key).cyan(), value.as_deref().unwrap_or("-"));
        }
        Ok(())
    }

    async fn path(&self, global: &GlobalOptions) -> Result<()> {
        let config_path = Config::config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": config_path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", config_path.display());
        }

        Ok(())
    }
}

/// The value as shown to the user; the token is masked.
fn display_value(key: &str, value: Option<String>) -> Option<String> {
    if key != "api.token" {
        return value;
    }
    value.map(|token| {
        let visible: String = token.chars().take(4).collect();
        format!("{}{}", visible, "*".repeat(token.chars().count().saturating_sub(4)))
    })
}
