//
//  bitbucket-context
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Command-Line Interface
//!
//! The `bbctx` commands, defined with the clap derive API. Each command
//! bootstraps the same stack — config file → site registry → resolver →
//! client manager → context — runs one refresh, then queries the context
//! and renders the answer as a table or JSON.

mod mirrors;
mod prs;
mod repos;
mod whoami;

pub use mirrors::MirrorsCommand;
pub use prs::PrsCommand;
pub use repos::ReposCommand;
pub use whoami::WhoamiCommand;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::api::ClientManager;
use crate::config::Config;
use crate::context::{BitbucketContext, SiteResolver};
use crate::git::libgit::Git2Provider;

#[derive(Parser, Debug)]
#[command(
    name = "bbctx",
    version,
    about = "Resolve local repositories to Bitbucket sites",
    long_about = "bbctx maps the git remotes of your local repositories onto \
                  authenticated Bitbucket Cloud and Server/Data Center sites, \
                  and answers questions against that mapping.",
    propagate_version = true,
    after_help = "Use 'bbctx <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options shared by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Repository paths to inspect; defaults to the current directory
    #[arg(long = "path", short = 'C', global = true, value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "BBCTX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List local repositories and the sites their remotes resolve to
    #[command(visible_alias = "ls")]
    Repos(ReposCommand),

    /// Recent pull requests across all Bitbucket repositories
    Prs(PrsCommand),

    /// Show the authenticated user on a site
    Whoami(WhoamiCommand),

    /// Mirror hosts known for a Server/Data Center site
    Mirrors(MirrorsCommand),

    /// Print the bbctx version
    Version,
}

/// The bootstrapped stack every command runs against.
pub struct CommandEnv {
    pub config: Config,
    pub context: BitbucketContext,
}

impl CommandEnv {
    /// Loads config, opens the repositories, builds the context, and
    /// runs the initial refresh.
    pub async fn bootstrap(global: &GlobalOptions) -> Result<Self> {
        let config = match &global.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        let paths = if global.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            global.paths.clone()
        };

        let registry = Arc::new(config.site_registry());
        let resolver = SiteResolver::new(registry);
        let clients = Arc::new(ClientManager::new(resolver.clone(), config.credentials()));
        let git = Arc::new(Git2Provider::discover(&paths)?);

        let context = BitbucketContext::new(
            git,
            resolver,
            clients,
            config.core.remote_preference.clone(),
        );
        context.refresh_repos().await?;

        Ok(Self { config, context })
    }
}

/// A table with the house styling applied.
pub(crate) fn create_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
