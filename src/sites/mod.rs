//
//  bitbucket-context
//  sites/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Site Model and Registry
//!
//! This module defines the model for authenticated Atlassian sites and the
//! registry used to look them up by hostname.
//!
//! ## Overview
//!
//! A [`DetailedSiteInfo`] describes one authenticated product instance —
//! Bitbucket Cloud, a Bitbucket Server/Data Center install, or a Jira site.
//! Sites are created and destroyed by an authentication flow outside this
//! crate; everything here only *reads* them, via the [`SiteRegistry`]
//! trait.
//!
//! A [`BitbucketSite`] pins a site to one specific repository on it
//! (owner slug + repo slug). It is built on demand from a git remote and a
//! resolved site, and never persisted.
//!
//! ## Cloud vs Server/Data Center
//!
//! | Property | Cloud | Server/DC |
//! |----------|-------|-----------|
//! | Hostname | `bitbucket.org` | Custom (e.g. `bitbucket.company.com`) |
//! | API base | `api.bitbucket.org/2.0` | `<host>/rest/api/1.0` |
//! | Organization | Workspaces | Projects |
//! | Mirrors | No | Optional |
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_context::sites::{DetailedSiteInfo, MemorySiteRegistry, Product, SiteRegistry};
//!
//! let site = DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred-1");
//! let registry = MemorySiteRegistry::new(vec![site]);
//!
//! let found = registry.get_site_for_hostname(Product::Bitbucket, "bitbucket.org");
//! assert!(found.is_some());
//! assert!(found.unwrap().is_cloud);
//! ```

mod hosts;

pub use hosts::*;

use serde::{Deserialize, Serialize};

/// The Atlassian product a site belongs to.
///
/// The registry is keyed by product as well as hostname, because one
/// hostname can serve both Jira and Bitbucket in Data Center setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Jira (Cloud or Server/DC)
    Jira,
    /// Bitbucket (Cloud or Server/DC)
    Bitbucket,
}

impl Product {
    /// Human-readable product name.
    pub fn name(&self) -> &'static str {
        match self {
            Product::Jira => "Jira",
            Product::Bitbucket => "Bitbucket",
        }
    }

    /// Stable machine key, used in identifiers and config files.
    pub fn key(&self) -> &'static str {
        match self {
            Product::Jira => "jira",
            Product::Bitbucket => "bitbucket",
        }
    }
}

/// One authenticated Atlassian product instance.
///
/// Instances are produced by the authentication layer (out of scope here)
/// or loaded from configuration. This subsystem treats them as read-only
/// lookups keyed by hostname.
///
/// # Fields
///
/// * `id` - Opaque stable identifier for the site
/// * `name` - Display name (defaults to the host)
/// * `product` - Which product this site serves
/// * `host` - Normalized hostname, port included for nonstandard ports
/// * `is_cloud` - Cloud instance vs Server/Data Center
/// * `base_link_url` - Base URL for web links
/// * `base_api_url` - Base URL for REST calls
/// * `avatar_url` - Site avatar, may be empty
/// * `user_id` - Identifier of the authenticated user on this site
/// * `credential_id` - Key into the credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedSiteInfo {
    pub id: String,
    pub name: String,
    pub product: Product,
    pub host: String,
    pub is_cloud: bool,
    pub base_link_url: String,
    pub base_api_url: String,
    pub avatar_url: String,
    pub user_id: String,
    pub credential_id: String,
}

impl DetailedSiteInfo {
    /// Builds a Cloud site for the given product and host.
    ///
    /// The API base is derived from the well-known Cloud API hostname; the
    /// site id is derived from product and host, which is stable enough
    /// for registry and cache keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_context::sites::{DetailedSiteInfo, Product};
    ///
    /// let site = DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred-1");
    /// assert!(site.is_cloud);
    /// assert_eq!(site.base_api_url, "https://api.bitbucket.org/2.0");
    /// ```
    pub fn cloud(product: Product, host: &str, credential_id: &str) -> Self {
        let host = normalize_host(host);
        Self {
            id: format!("{}:{}", product.key(), host),
            name: host.clone(),
            product,
            base_link_url: format!("https://{host}"),
            base_api_url: format!("https://{BITBUCKET_API}/2.0"),
            avatar_url: String::new(),
            user_id: String::new(),
            credential_id: credential_id.to_string(),
            is_cloud: true,
            host,
        }
    }

    /// Builds a Server/Data Center site for the given product and host.
    ///
    /// Server instances serve their REST API from the web hostname under
    /// `/rest/api/1.0`.
    pub fn server(product: Product, host: &str, credential_id: &str) -> Self {
        let host = normalize_host(host);
        Self {
            id: format!("{}:{}", product.key(), host),
            name: host.clone(),
            product,
            base_link_url: format!("https://{host}"),
            base_api_url: format!("https://{host}/rest/api/1.0"),
            avatar_url: String::new(),
            user_id: String::new(),
            credential_id: credential_id.to_string(),
            is_cloud: false,
            host,
        }
    }

    /// Sets the authenticated user id, builder style.
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    /// The hostname without any port suffix.
    ///
    /// Registry lookups compare hostnames as parsed out of git remote
    /// URLs, which never carry the HTTPS port the site was registered
    /// with, so comparisons happen on the bare hostname.
    pub fn hostname(&self) -> &str {
        self.host.split(':').next().unwrap_or(&self.host)
    }
}

/// Read-only lookup of configured sites.
///
/// Implementations are injected into the resolver and client layers; no
/// global registry exists. The authentication subsystem owns the write
/// side of this data.
pub trait SiteRegistry: Send + Sync {
    /// Looks up a site by product and hostname.
    ///
    /// # Parameters
    ///
    /// * `product` - Which product the caller needs a site for
    /// * `hostname` - Hostname to match, normalized or not
    ///
    /// # Returns
    ///
    /// The matching site, or `None` when no site is configured for the
    /// hostname. Absence is a normal outcome, not an error.
    fn get_site_for_hostname(&self, product: Product, hostname: &str) -> Option<DetailedSiteInfo>;

    /// All configured sites for a product, in registration order.
    fn get_sites_available(&self, product: Product) -> Vec<DetailedSiteInfo>;
}

/// In-memory [`SiteRegistry`] backed by a plain vector.
///
/// This is the registry used by the CLI (populated from the config file)
/// and by tests. Lookup normalizes the queried hostname and compares it
/// against each site's bare hostname.
///
/// # Example
///
/// ```rust
/// use bitbucket_context::sites::{DetailedSiteInfo, MemorySiteRegistry, Product, SiteRegistry};
///
/// let registry = MemorySiteRegistry::new(vec![
///     DetailedSiteInfo::server(Product::Bitbucket, "bb.example.com", "cred-1"),
/// ]);
///
/// assert!(registry.get_site_for_hostname(Product::Bitbucket, "BB.EXAMPLE.COM").is_some());
/// assert!(registry.get_site_for_hostname(Product::Bitbucket, "github.com").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySiteRegistry {
    sites: Vec<DetailedSiteInfo>,
}

impl MemorySiteRegistry {
    /// Creates a registry over the given sites.
    pub fn new(sites: Vec<DetailedSiteInfo>) -> Self {
        Self { sites }
    }

    /// Adds a site to the registry.
    pub fn add(&mut self, site: DetailedSiteInfo) {
        self.sites.push(site);
    }
}

impl SiteRegistry for MemorySiteRegistry {
    fn get_site_for_hostname(&self, product: Product, hostname: &str) -> Option<DetailedSiteInfo> {
        let wanted = normalize_host(hostname);
        let wanted = wanted.split(':').next().unwrap_or(&wanted);
        self.sites
            .iter()
            .find(|site| site.product == product && site.hostname() == wanted)
            .cloned()
    }

    fn get_sites_available(&self, product: Product) -> Vec<DetailedSiteInfo> {
        self.sites
            .iter()
            .filter(|site| site.product == product)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MemorySiteRegistry {
        MemorySiteRegistry::new(vec![
            DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cloud-cred"),
            DetailedSiteInfo::server(Product::Bitbucket, "bb.example.com:7990", "server-cred"),
            DetailedSiteInfo::cloud(Product::Jira, "example.atlassian.net", "jira-cred"),
        ])
    }

    #[test]
    fn test_lookup_by_hostname() {
        let site = registry()
            .get_site_for_hostname(Product::Bitbucket, "bitbucket.org")
            .unwrap();
        assert!(site.is_cloud);
        assert_eq!(site.credential_id, "cloud-cred");
    }

    #[test]
    fn test_lookup_normalizes_input() {
        let site = registry()
            .get_site_for_hostname(Product::Bitbucket, "https://BITBUCKET.ORG/")
            .unwrap();
        assert_eq!(site.host, "bitbucket.org");
    }

    #[test]
    fn test_lookup_ignores_port() {
        // Remote URLs carry the SSH port, registration carried the HTTPS one.
        let site = registry()
            .get_site_for_hostname(Product::Bitbucket, "bb.example.com:7999")
            .unwrap();
        assert_eq!(site.credential_id, "server-cred");
    }

    #[test]
    fn test_lookup_respects_product() {
        assert!(registry()
            .get_site_for_hostname(Product::Jira, "bitbucket.org")
            .is_none());
    }

    #[test]
    fn test_miss_is_none() {
        assert!(registry()
            .get_site_for_hostname(Product::Bitbucket, "github.com")
            .is_none());
    }

    #[test]
    fn test_sites_available_filters_by_product() {
        let bitbucket = registry().get_sites_available(Product::Bitbucket);
        assert_eq!(bitbucket.len(), 2);
        let jira = registry().get_sites_available(Product::Jira);
        assert_eq!(jira.len(), 1);
    }

    #[test]
    fn test_server_urls() {
        let site = DetailedSiteInfo::server(Product::Bitbucket, "bb.example.com", "c");
        assert_eq!(site.base_api_url, "https://bb.example.com/rest/api/1.0");
        assert_eq!(site.base_link_url, "https://bb.example.com");
    }
}
