//
//  bitbucket-context
//  cli/whoami.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # `bbctx whoami`
//!
//! Shows the authenticated user on one configured site.

use anyhow::Result;
use clap::Args;

use crate::error::ContextError;
use crate::sites::{Product, SiteRegistry};

use super::{CommandEnv, GlobalOptions};

#[derive(Args, Debug)]
pub struct WhoamiCommand {
    /// Hostname of the site to query (e.g. bitbucket.org)
    #[arg(long)]
    pub site: String,
}

impl WhoamiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let env = CommandEnv::bootstrap(global).await?;

        let site = env
            .config
            .site_registry()
            .get_site_for_hostname(Product::Bitbucket, &self.site)
            .ok_or_else(|| ContextError::UnknownSite(self.site.clone()))?;

        let user = env.context.current_user(&site).await?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&user)?);
            return Ok(());
        }

        println!("{} ({})", user.display_name, user.id);
        if !user.url.is_empty() {
            println!("{}", user.url);
        }
        Ok(())
    }
}
