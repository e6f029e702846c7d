//
//  bitbucket-context
//  api/manager.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Client Manager
//!
//! Resolves remotes, sites, and hostnames to authenticated API clients,
//! caching one client per site.
//!
//! ## Overview
//!
//! The [`ClientProvider`] trait is the seam the context layer depends on;
//! [`ClientManager`] is the production implementation. Every accessor
//! resolves the site *first* and fails with the shared connectivity
//! sentinel when no site is configured — callers pattern-match on the
//! sentinel, never on message text.
//!
//! Constructed clients are cached in a [`CacheMap`] keyed by site id, so
//! repeated lookups reuse the same client (and its connection pool) for
//! the cache window.
//!
//! [`CacheMap`]: crate::context::CacheMap

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::auth::AuthCredential;
use crate::context::{CacheMap, SiteResolver};
use crate::error::ContextError;
use crate::git::Remote;
use crate::sites::DetailedSiteInfo;

use super::client::HttpBitbucketApi;
use super::BitbucketApi;

/// How long a constructed client is reused before being rebuilt.
const CLIENT_CACHE_TTL: Duration = Duration::from_secs(45 * 60);

/// Obtains an authenticated API client for a remote, site, or hostname.
///
/// Injected into the context layer; test doubles substitute canned
/// clients here.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Client for an already-resolved site.
    async fn client_for_site(&self, site: &DetailedSiteInfo) -> Result<Arc<dyn BitbucketApi>>;

    /// Resolves the remote to a site, then obtains its client.
    ///
    /// # Errors
    ///
    /// [`ContextError::BitbucketUnreachable`] when the remote resolves to
    /// no configured site.
    async fn client_for_remote(&self, remote: &Remote) -> Result<Arc<dyn BitbucketApi>>;

    /// Resolves the hostname to a site, then obtains its client.
    ///
    /// # Errors
    ///
    /// [`ContextError::BitbucketUnreachable`] when no site is configured
    /// for the hostname.
    async fn client_for_hostname(&self, hostname: &str) -> Result<Arc<dyn BitbucketApi>>;
}

/// Production [`ClientProvider`] building [`HttpBitbucketApi`] clients.
pub struct ClientManager {
    resolver: SiteResolver,
    credentials: HashMap<String, AuthCredential>,
    clients: Mutex<CacheMap<Arc<dyn BitbucketApi>>>,
}

impl ClientManager {
    /// Creates a manager over a resolver and a credential store keyed by
    /// the sites' `credential_id`.
    pub fn new(resolver: SiteResolver, credentials: HashMap<String, AuthCredential>) -> Self {
        Self {
            resolver,
            credentials,
            clients: Mutex::new(CacheMap::new()),
        }
    }

    fn build_client(&self, site: &DetailedSiteInfo) -> Result<Arc<dyn BitbucketApi>> {
        let auth = self.credentials.get(&site.credential_id).cloned();
        if auth.is_none() {
            tracing::debug!(host = %site.host, credential = %site.credential_id, "no credential found; building anonymous client");
        }
        let client = HttpBitbucketApi::new(site.clone(), auth)?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl ClientProvider for ClientManager {
    async fn client_for_site(&self, site: &DetailedSiteInfo) -> Result<Arc<dyn BitbucketApi>> {
        if let Some(client) = self.clients.lock().expect("client cache poisoned").get_item(&site.id) {
            return Ok(Arc::clone(client));
        }

        let client = self.build_client(site)?;
        self.clients
            .lock()
            .expect("client cache poisoned")
            .set_item(site.id.clone(), Arc::clone(&client), CLIENT_CACHE_TTL);
        Ok(client)
    }

    async fn client_for_remote(&self, remote: &Remote) -> Result<Arc<dyn BitbucketApi>> {
        let site = self
            .resolver
            .site_details_for_remote(remote)
            .ok_or(ContextError::BitbucketUnreachable)?;
        self.client_for_site(&site).await
    }

    async fn client_for_hostname(&self, hostname: &str) -> Result<Arc<dyn BitbucketApi>> {
        let site = self
            .resolver
            .site_details_for_hostname(hostname)
            .ok_or(ContextError::BitbucketUnreachable)?;
        self.client_for_site(&site).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_bitbucket_unreachable;
    use crate::sites::{MemorySiteRegistry, Product};

    fn manager() -> ClientManager {
        let registry = MemorySiteRegistry::new(vec![DetailedSiteInfo::cloud(
            Product::Bitbucket,
            "bitbucket.org",
            "cred-1",
        )]);
        let mut credentials = HashMap::new();
        credentials.insert("cred-1".to_string(), AuthCredential::bearer("tok"));
        ClientManager::new(SiteResolver::new(Arc::new(registry)), credentials)
    }

    #[tokio::test]
    async fn test_client_for_known_hostname() {
        assert!(manager().client_for_hostname("bitbucket.org").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_hostname_is_the_sentinel() {
        let err = manager()
            .client_for_hostname("github.com")
            .await
            .err()
            .unwrap();
        assert!(is_bitbucket_unreachable(&err));
    }

    #[tokio::test]
    async fn test_unresolvable_remote_is_the_sentinel() {
        let remote = Remote::new("origin", "git@github.com:a/b.git");
        let err = manager().client_for_remote(&remote).await.err().unwrap();
        assert!(is_bitbucket_unreachable(&err));
    }

    #[tokio::test]
    async fn test_clients_are_cached_per_site() {
        let manager = manager();
        let site = DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred-1");

        let first = manager.client_for_site(&site).await.unwrap();
        let second = manager.client_for_site(&site).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_remote_resolution_reaches_the_same_cached_client() {
        let manager = manager();
        let site = DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred-1");
        let remote = Remote::new("origin", "git@bitbucket.org:team/app.git");

        let by_site = manager.client_for_site(&site).await.unwrap();
        let by_remote = manager.client_for_remote(&remote).await.unwrap();
        assert!(Arc::ptr_eq(&by_site, &by_remote));
    }
}
