//
//  bitbucket-context
//  cli/mirrors.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # `bbctx mirrors`
//!
//! Prints the mirror hosts recorded for a Server/Data Center site during
//! the refresh. Best-effort data: an empty answer means "none known",
//! whether because the site has no mirrors or the fetch failed.

use anyhow::Result;
use clap::Args;

use super::{CommandEnv, GlobalOptions};

#[derive(Args, Debug)]
pub struct MirrorsCommand {
    /// Hostname of the Server/Data Center site
    pub host: String,
}

impl MirrorsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let env = CommandEnv::bootstrap(global).await?;
        let mirrors = env.context.get_mirrors(&self.host);

        if global.json {
            println!("{}", serde_json::to_string_pretty(&mirrors)?);
            return Ok(());
        }

        if mirrors.is_empty() {
            println!("No mirrors known for {}", self.host);
        } else {
            for mirror in mirrors {
                println!("{mirror}");
            }
        }
        Ok(())
    }
}
