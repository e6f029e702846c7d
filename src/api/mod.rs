//
//  bitbucket-context
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! The contract the context layer consumes to talk to Bitbucket, its
//! HTTP implementation, and the per-site client cache.
//!
//! ## Supported Platforms
//!
//! - **Bitbucket Cloud**: API v2.0 at `api.bitbucket.org`
//! - **Bitbucket Server/Data Center**: API v1.0 at your custom host,
//!   plus the mirroring plugin for mirror-host discovery
//!
//! ## Architecture
//!
//! - [`BitbucketApi`]: the minimal async contract — current user, recent
//!   pull requests, mirror hosts
//! - [`client`]: reqwest-backed implementation with auth and error
//!   mapping
//! - [`cloud`] / [`server`]: per-platform wire types and their mapping
//!   into the domain types
//! - [`manager`]: site resolution plus per-site client caching behind
//!   the [`ClientProvider`] seam
//!
//! ## Error Handling
//!
//! Connectivity failures — including "no site configured for this
//! remote/hostname" — surface as the shared
//! [`ContextError::BitbucketUnreachable`](crate::error::ContextError)
//! sentinel. HTTP-level errors carry the human-readable message from the
//! response payload instead.

pub mod client;
pub mod cloud;
pub mod manager;
pub mod server;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

use crate::context::BitbucketSite;
use crate::sites::DetailedSiteInfo;

pub use client::HttpBitbucketApi;
pub use manager::{ClientManager, ClientProvider};
pub use types::{PullRequest, PullRequestState, User};

/// The Bitbucket operations the context layer depends on.
///
/// One implementor per site; obtained through a [`ClientProvider`].
#[async_trait]
pub trait BitbucketApi: Send + Sync {
    /// The user the site's credential authenticates as.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the backend answered but produced no user (e.g. a
    /// Server site with no recorded user slug). Callers decide whether
    /// that is fatal; the context layer fails closed on it.
    async fn current_user(&self, site: &DetailedSiteInfo) -> Result<Option<User>>;

    /// The most recent pull requests of one repository, any state,
    /// newest first.
    async fn recent_pull_requests(&self, site: &BitbucketSite) -> Result<Vec<PullRequest>>;

    /// Mirror hostnames for Server/Data Center deployments.
    ///
    /// Cloud sites return an empty list without a network round trip.
    async fn mirror_hosts(&self) -> Result<Vec<String>>;
}
