//
//  bitbucket-context
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Site Resolver and Remote Classifier
//!
//! Maps git remotes onto configured Bitbucket sites.
//!
//! ## Overview
//!
//! The [`SiteResolver`] answers two questions:
//!
//! - Which authenticated site, if any, does this remote point at?
//!   ([`site_details_for_remote`], [`bitbucket_site_for_remote`])
//! - Which of a repository's remotes point at Bitbucket at all?
//!   ([`get_bitbucket_remotes`], [`get_bitbucket_cloud_remotes`])
//!
//! A miss is always `None` or an empty vector — an unconfigured hostname
//! is an expected, everyday outcome (every GitHub remote produces one),
//! never an error.
//!
//! ## The underscore quirk
//!
//! Some SSH configurations alias hosts with underscores in place of dots
//! (`git@bitbucket_org:...`). When the first lookup misses and the parsed
//! hostname contains an underscore, the resolver retries once with `_`
//! replaced by `.` before giving up. The substitution is deliberately not
//! generalized any further.
//!
//! [`site_details_for_remote`]: SiteResolver::site_details_for_remote
//! [`bitbucket_site_for_remote`]: SiteResolver::bitbucket_site_for_remote
//! [`get_bitbucket_remotes`]: SiteResolver::get_bitbucket_remotes
//! [`get_bitbucket_cloud_remotes`]: SiteResolver::get_bitbucket_cloud_remotes

use std::sync::Arc;

use serde::Serialize;

use crate::git::{url_for_remote, Remote, RepoState};
use crate::sites::{DetailedSiteInfo, Product, SiteRegistry};

use super::url::{parse_git_url, ParsedGitUrl};

/// A [`DetailedSiteInfo`] pinned to one repository on that site.
///
/// Built on demand from a remote plus a resolved site; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitbucketSite {
    /// The authenticated site the repository lives on
    pub details: DetailedSiteInfo,
    /// Workspace (Cloud), project key, or `~user` (Server)
    pub owner_slug: String,
    /// Repository slug
    pub repo_slug: String,
}

impl BitbucketSite {
    /// `owner/repo`, the canonical display form.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_slug, self.repo_slug)
    }
}

/// Resolves remotes against an injected site registry.
///
/// Stateless apart from the registry handle; cheap to clone and share.
#[derive(Clone)]
pub struct SiteResolver {
    registry: Arc<dyn SiteRegistry>,
}

impl SiteResolver {
    /// Creates a resolver over the given registry.
    pub fn new(registry: Arc<dyn SiteRegistry>) -> Self {
        Self { registry }
    }

    /// Looks up the configured site a remote points at.
    ///
    /// Parses the remote's URL (fetch URL preferred, push URL fallback)
    /// and queries the registry by hostname, with the one underscore
    /// retry described in the module docs.
    ///
    /// # Returns
    ///
    /// `None` when the URL does not parse to a hostname or no site is
    /// configured for it. Not an error.
    pub fn site_details_for_remote(&self, remote: &Remote) -> Option<DetailedSiteInfo> {
        let parsed = parse_git_url(url_for_remote(remote));
        self.site_for_parsed(&parsed)
    }

    /// Resolves a remote all the way to a [`BitbucketSite`].
    ///
    /// In addition to a configured site, this requires the parse to have
    /// produced both an owner and a repository name; URLs without them
    /// (host-only, malformed) resolve to `None`.
    pub fn bitbucket_site_for_remote(&self, remote: &Remote) -> Option<BitbucketSite> {
        let parsed = parse_git_url(url_for_remote(remote));
        let details = self.site_for_parsed(&parsed)?;
        if parsed.owner.is_empty() || parsed.name.is_empty() {
            return None;
        }
        Some(BitbucketSite {
            details,
            owner_slug: parsed.owner,
            repo_slug: parsed.name,
        })
    }

    /// Filters a repository's remotes down to those resolving to a site.
    ///
    /// Order is preserved from `state.remotes` — the remote-preference
    /// selection downstream depends on stable ordering.
    pub fn get_bitbucket_remotes(&self, state: &RepoState) -> Vec<Remote> {
        state
            .remotes
            .iter()
            .filter(|remote| self.site_details_for_remote(remote).is_some())
            .cloned()
            .collect()
    }

    /// Like [`get_bitbucket_remotes`], restricted to Cloud sites.
    ///
    /// Always a subset of the unrestricted variant, in the same order.
    ///
    /// [`get_bitbucket_remotes`]: SiteResolver::get_bitbucket_remotes
    pub fn get_bitbucket_cloud_remotes(&self, state: &RepoState) -> Vec<Remote> {
        state
            .remotes
            .iter()
            .filter(|remote| {
                self.site_details_for_remote(remote)
                    .map(|site| site.is_cloud)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Hostname-direct variant of [`site_details_for_remote`], with the
    /// same underscore retry. Used by callers that start from a hostname
    /// instead of a remote (e.g. the client manager).
    ///
    /// [`site_details_for_remote`]: SiteResolver::site_details_for_remote
    pub fn site_details_for_hostname(&self, hostname: &str) -> Option<DetailedSiteInfo> {
        if hostname.is_empty() {
            return None;
        }

        if let Some(site) = self
            .registry
            .get_site_for_hostname(Product::Bitbucket, hostname)
        {
            return Some(site);
        }

        // SSH aliases sometimes surface hosts like `bitbucket_org`.
        if hostname.contains('_') {
            let dotted = hostname.replace('_', ".");
            return self
                .registry
                .get_site_for_hostname(Product::Bitbucket, &dotted);
        }

        None
    }

    fn site_for_parsed(&self, parsed: &ParsedGitUrl) -> Option<DetailedSiteInfo> {
        self.site_details_for_hostname(&parsed.resource)
    }
}
