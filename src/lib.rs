//
//  bitbucket-context
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Context Library
//!
//! Resolves local git repositories onto authenticated Bitbucket Cloud and
//! Server/Data Center sites, and maintains a cached, refreshable workspace
//! view on top of that mapping.
//!
//! ## Overview
//!
//! This library powers the `bbctx` CLI. Given a set of local repositories
//! and a set of authenticated sites, it answers:
//!
//! - Which remotes of which repositories point at Bitbucket?
//! - Which site and repository does a given remote resolve to?
//! - Who is the authenticated user on a site? (cached)
//! - What are the recent pull requests across all repositories? (cached)
//! - Which mirror hosts serve a Server/Data Center site? (best effort)
//!
//! ## Module Structure
//!
//! - [`context`]: the orchestrator, URL parser, resolver, and TTL cache
//! - [`sites`]: site model and hostname registry
//! - [`git`]: host git integration contract and the `git2` backend
//! - [`api`]: Bitbucket API contract, HTTP client, per-site client cache
//! - [`auth`]: credential types applied to outgoing requests
//! - [`config`]: TOML configuration (sites, credentials, preferences)
//! - [`cli`]: the `bbctx` command definitions
//! - [`error`]: the typed error taxonomy and connectivity sentinel
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bitbucket_context::api::ClientManager;
//! use bitbucket_context::config::Config;
//! use bitbucket_context::context::{BitbucketContext, SiteResolver};
//! use bitbucket_context::git::libgit::Git2Provider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let resolver = SiteResolver::new(Arc::new(config.site_registry()));
//! let clients = Arc::new(ClientManager::new(resolver.clone(), config.credentials()));
//! let git = Arc::new(Git2Provider::discover(&[".".into()])?);
//!
//! let context = BitbucketContext::new(git, resolver, clients, config.core.remote_preference);
//! context.refresh_repos().await?;
//!
//! for repo in context.get_bitbucket_repositories() {
//!     println!("{}", repo.root_uri);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Differences
//!
//! | Feature | Cloud | Server/DC |
//! |---------|-------|-----------|
//! | API version | 2.0 | 1.0 |
//! | Organization | Workspaces | Projects |
//! | Personal repos | — | `~user` addressing |
//! | Mirror hosts | No | Optional |

/// API client contract, HTTP implementation, and per-site client cache.
pub mod api;

/// Credential types applied to outgoing requests.
pub mod auth;

/// Command-line interface definitions for `bbctx`.
pub mod cli;

/// TOML configuration management.
pub mod config;

/// The context orchestrator with its URL parser, resolver, and cache.
pub mod context;

/// Typed error taxonomy, including the connectivity sentinel.
pub mod error;

/// Host git integration contract and the libgit2 backend.
pub mod git;

/// Site model and hostname registry.
pub mod sites;

/// Re-export of the main CLI struct.
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Re-export of the context orchestrator.
pub use context::BitbucketContext;

/// Application name constant, used for config paths and display.
pub const APP_NAME: &str = "bbctx";

/// Application version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Standardized exit codes following Unix conventions, allowing scripts
/// to programmatically detect the outcome of CLI operations.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error; details on stderr.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// Authentication required or failed.
    pub const AUTH_ERROR: i32 = 4;

    /// The requested resource does not exist or is not accessible.
    pub const NOT_FOUND: i32 = 8;
}
