//
//  bitbucket-context
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration
//!
//! TOML configuration for the `bbctx` CLI: authenticated sites, their
//! credentials, and the remote-name preference order.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bbctx/config.toml`
//! - **macOS**: `~/Library/Application Support/bbctx/config.toml`
//! - **Windows**: `%APPDATA%\bbctx\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! remote_preference = ["origin", "upstream"]
//!
//! [[sites]]
//! host = "bitbucket.org"
//! username = "jdoe"
//! app_password = "app-password-here"
//!
//! [[sites]]
//! host = "bb.example.com"
//! token = "personal-access-token"
//! user_id = "jdoe"
//! ```
//!
//! The `cloud` flag is derived from the hostname when omitted —
//! `bitbucket.org` is Cloud, everything else Server/DC — and can be set
//! explicitly for unusual setups.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_context::config::Config;
//!
//! let config = Config::load()?;
//! let registry = config.site_registry();
//! let credentials = config.credentials();
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::auth::AuthCredential;
use crate::sites::{is_cloud_host, normalize_host, DetailedSiteInfo, MemorySiteRegistry, Product};

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub core: CoreConfig,
    /// Authenticated sites
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

/// General, non-site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Remote names tried in order when choosing a repository's main
    /// remote.
    #[serde(default = "default_remote_preference")]
    pub remote_preference: Vec<String>,
}

fn default_remote_preference() -> Vec<String> {
    vec!["origin".to_string(), "upstream".to_string()]
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            remote_preference: default_remote_preference(),
        }
    }
}

/// One `[[sites]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Hostname of the site
    pub host: String,
    /// Product served at the host
    #[serde(default = "default_product")]
    pub product: Product,
    /// Cloud vs Server/DC; derived from the hostname when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<bool>,
    /// Username for basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// App password for basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
    /// Personal access token (takes precedence over basic auth)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// User slug on the site (Server current-user lookups need it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_product() -> Product {
    Product::Bitbucket
}

impl SiteEntry {
    fn is_cloud(&self) -> bool {
        self.cloud
            .unwrap_or_else(|| is_cloud_host(&normalize_host(&self.host)))
    }

    fn credential_id(&self) -> String {
        format!("{}:{}", self.product.key(), normalize_host(&self.host))
    }

    fn to_site(&self) -> DetailedSiteInfo {
        let credential_id = self.credential_id();
        let site = if self.is_cloud() {
            DetailedSiteInfo::cloud(self.product, &self.host, &credential_id)
        } else {
            DetailedSiteInfo::server(self.product, &self.host, &credential_id)
        };
        let user_id = self.user_id.clone().or_else(|| self.username.clone());
        match user_id {
            Some(user_id) => site.with_user_id(&user_id),
            None => site,
        }
    }

    fn credential(&self) -> Option<AuthCredential> {
        if let Some(token) = &self.token {
            return Some(AuthCredential::bearer(token));
        }
        match (&self.username, &self.app_password) {
            (Some(username), Some(app_password)) => {
                Some(AuthCredential::basic(username, app_password))
            }
            _ => None,
        }
    }
}

impl Config {
    /// Loads the configuration from the default platform location.
    ///
    /// A missing file yields the default configuration rather than an
    /// error — first runs have nothing on disk yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config at {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config at {}", path.display()))
    }

    /// Saves the configuration to the default platform location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Saves the configuration to an explicit path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config at {}", path.display()))?;
        Ok(())
    }

    /// The platform-specific default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .context("could not determine a config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Builds the site registry the resolver consumes.
    pub fn site_registry(&self) -> MemorySiteRegistry {
        MemorySiteRegistry::new(self.sites.iter().map(SiteEntry::to_site).collect())
    }

    /// Builds the credential store the client manager consumes, keyed by
    /// each site's `credential_id`.
    pub fn credentials(&self) -> HashMap<String, AuthCredential> {
        self.sites
            .iter()
            .filter_map(|entry| entry.credential().map(|cred| (entry.credential_id(), cred)))
            .collect()
    }
}
