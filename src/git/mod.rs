//
//  bitbucket-context
//  git/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Git Integration
//!
//! This module defines the contract between the context layer and whatever
//! owns the local git repositories — the `git2`-backed implementation in
//! [`libgit`], or test doubles.
//!
//! ## Overview
//!
//! The context layer needs very little from git:
//!
//! - [`Remote`]: a named pointer to a repository location
//! - [`RepoState`]: the remotes and HEAD of one repository, as a snapshot
//! - [`GitRepository`]: one local clone, able to refresh its own state
//! - [`GitProvider`]: the set of currently-open repositories
//!
//! Everything is read-only from this crate's perspective; nothing here
//! mutates a repository.
//!
//! ## The zero-remote race
//!
//! Hosts can report a repository before its remote list is populated.
//! [`GitRepository::status`] exists so the context layer can force one
//! refresh when it sees an empty remote list; see
//! `BitbucketContext::refresh_repos`.

pub mod libgit;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A named reference to a git repository location.
///
/// Owned by the host's git integration and read-only here. At least one
/// of `fetch_url`/`push_url` is expected to be present on a configured
/// remote, but parsing code treats both as optional and degrades to an
/// empty URL.
///
/// # Example
///
/// ```rust
/// use bitbucket_context::git::Remote;
///
/// let origin = Remote::new("origin", "git@bitbucket.org:team/app.git");
/// assert_eq!(origin.name, "origin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    /// Remote name, e.g. "origin" or "upstream"
    pub name: String,
    /// URL used for fetches, if configured
    pub fetch_url: Option<String>,
    /// URL used for pushes, if it differs from the fetch URL
    pub push_url: Option<String>,
}

impl Remote {
    /// Creates a remote with a fetch URL and no separate push URL.
    pub fn new(name: &str, fetch_url: &str) -> Self {
        Self {
            name: name.to_string(),
            fetch_url: Some(fetch_url.to_string()),
            push_url: None,
        }
    }

    /// Placeholder remote used when a repository reports none at all.
    ///
    /// Keeps `WorkspaceRepo::main_site_remote` populated for diagnostics
    /// even when there is nothing to resolve.
    pub fn unnamed() -> Self {
        Self {
            name: String::new(),
            fetch_url: None,
            push_url: None,
        }
    }
}

/// Returns the URL to parse for a remote.
///
/// Prefers the fetch URL, falls back to the push URL, and degrades to an
/// empty string when neither is set — callers treat the empty string as
/// "parses to nothing" rather than an error.
pub fn url_for_remote(remote: &Remote) -> &str {
    remote
        .fetch_url
        .as_deref()
        .or(remote.push_url.as_deref())
        .unwrap_or("")
}

/// Snapshot of one repository's git state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoState {
    /// Configured remotes, in git's configuration order
    pub remotes: Vec<Remote>,
    /// Short name of HEAD, if resolvable
    pub head: Option<String>,
}

/// One open local repository, as seen by the context layer.
#[async_trait]
pub trait GitRepository: Send + Sync {
    /// Stable identifier for the repository: its root path as a string.
    fn root_uri(&self) -> String;

    /// Current snapshot of remotes and HEAD.
    fn state(&self) -> RepoState;

    /// Forces a re-read of the repository state.
    ///
    /// Used by the context layer as a retry-once workaround when the host
    /// reports a repository whose remote list has not been populated yet.
    async fn status(&self) -> Result<()>;
}

/// The set of currently-open repositories.
pub trait GitProvider: Send + Sync {
    /// All open repositories, in a stable order.
    fn repositories(&self) -> Vec<Arc<dyn GitRepository>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_remote_prefers_fetch() {
        let remote = Remote {
            name: "origin".into(),
            fetch_url: Some("git@bitbucket.org:a/b.git".into()),
            push_url: Some("git@bitbucket.org:a/b-push.git".into()),
        };
        assert_eq!(url_for_remote(&remote), "git@bitbucket.org:a/b.git");
    }

    #[test]
    fn test_url_for_remote_falls_back_to_push() {
        let remote = Remote {
            name: "origin".into(),
            fetch_url: None,
            push_url: Some("git@bitbucket.org:a/b.git".into()),
        };
        assert_eq!(url_for_remote(&remote), "git@bitbucket.org:a/b.git");
    }

    #[test]
    fn test_url_for_remote_empty_when_unset() {
        assert_eq!(url_for_remote(&Remote::unnamed()), "");
    }
}
