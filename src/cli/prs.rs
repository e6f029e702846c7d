//
//  bitbucket-context
//  cli/prs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # `bbctx prs`
//!
//! Lists recent pull requests across every repository whose main remote
//! resolves to a Bitbucket site. All-or-nothing: if any one repository's
//! fetch fails the command fails, matching the aggregate's semantics.

use anyhow::Result;
use clap::Args;

use super::{create_table, CommandEnv, GlobalOptions};

#[derive(Args, Debug)]
pub struct PrsCommand {}

impl PrsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let env = CommandEnv::bootstrap(global).await?;
        let prs = env.context.recent_pull_requests_for_all_repos().await?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&prs)?);
            return Ok(());
        }

        let mut table = create_table(vec!["ID", "Repository", "Title", "State", "Author", "Updated"]);
        for pr in &prs {
            table.add_row(vec![
                format!("#{}", pr.id),
                pr.repository_full_name.clone(),
                pr.title.clone(),
                pr.state.to_string(),
                pr.author
                    .as_ref()
                    .map(|a| a.display_name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                pr.updated_on.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }
        println!("{table}");
        Ok(())
    }
}
