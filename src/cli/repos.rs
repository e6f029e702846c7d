//
//  bitbucket-context
//  cli/repos.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # `bbctx repos`
//!
//! Lists the inspected repositories together with the Bitbucket site and
//! repository each one's main remote resolved to.

use anyhow::Result;
use clap::Args;

use super::{create_table, CommandEnv, GlobalOptions};

#[derive(Args, Debug)]
pub struct ReposCommand {
    /// Only repositories resolving to Bitbucket Cloud
    #[arg(long)]
    pub cloud: bool,

    /// Include repositories that resolve to no site at all
    #[arg(long, short = 'a')]
    pub all: bool,
}

impl ReposCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let env = CommandEnv::bootstrap(global).await?;

        let repos = if self.cloud {
            env.context.get_bitbucket_cloud_repositories()
        } else if self.all {
            env.context.get_all_repositories()
        } else {
            env.context.get_bitbucket_repositories()
        };

        if global.json {
            println!("{}", serde_json::to_string_pretty(&repos)?);
            return Ok(());
        }

        let mut table = create_table(vec!["Root", "Remote", "Host", "Repository"]);
        for repo in &repos {
            let main = &repo.main_site_remote;
            let (host, full_name) = match &main.site {
                Some(site) => (site.details.host.clone(), site.full_name()),
                None => ("-".to_string(), "-".to_string()),
            };
            let remote_name = if main.remote.name.is_empty() {
                "-".to_string()
            } else {
                main.remote.name.clone()
            };
            table.add_row(vec![repo.root_uri.clone(), remote_name, host, full_name]);
        }
        println!("{table}");
        Ok(())
    }
}
