//
//  bitbucket-context
//  sites/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Utilities
//!
//! Constants and helpers for working with Bitbucket hostnames.
//!
//! ## Overview
//!
//! The crate supports both Bitbucket Cloud (bitbucket.org) and self-hosted
//! Bitbucket Server/Data Center instances. This module provides:
//!
//! - Constants for the well-known Bitbucket Cloud hostnames
//! - Detection of whether a host is Bitbucket Cloud
//! - Hostname normalization for consistent registry lookups
//!
//! ## Usage
//!
//! ```rust
//! use bitbucket_context::sites::{is_cloud_host, normalize_host};
//!
//! assert!(is_cloud_host("bitbucket.org"));
//! assert!(!is_cloud_host("bitbucket.company.com"));
//!
//! assert_eq!(normalize_host("https://BITBUCKET.ORG/"), "bitbucket.org");
//! ```

/// The primary hostname for Bitbucket Cloud.
///
/// # Value
///
/// `"bitbucket.org"`
pub const BITBUCKET_CLOUD: &str = "bitbucket.org";

/// The API hostname for Bitbucket Cloud.
///
/// REST API 2.0 endpoints are served from this hostname; the web interface
/// lives at [`BITBUCKET_CLOUD`]. Server/DC instances serve their API from
/// the same hostname as the web interface.
///
/// # Value
///
/// `"api.bitbucket.org"`
pub const BITBUCKET_API: &str = "api.bitbucket.org";

/// Checks if a hostname corresponds to Bitbucket Cloud.
///
/// # Parameters
///
/// * `host` - The hostname to check (normalized, without protocol)
///
/// # Returns
///
/// `true` only for the two known Cloud hostnames; anything else is assumed
/// to be a Server/DC instance. Comparison is exact — pass user input
/// through [`normalize_host`] first.
///
/// # Example
///
/// ```rust
/// use bitbucket_context::sites::is_cloud_host;
///
/// assert!(is_cloud_host("bitbucket.org"));
/// assert!(is_cloud_host("api.bitbucket.org"));
/// assert!(!is_cloud_host("git.internal.net"));
/// ```
pub fn is_cloud_host(host: &str) -> bool {
    host == BITBUCKET_CLOUD || host == BITBUCKET_API
}

/// Normalizes a host string to a bare lowercase hostname.
///
/// Strips `https://`/`http://` prefixes and a trailing slash, trims
/// whitespace, and lowercases the result so that hostnames compare
/// consistently regardless of how they were entered or parsed.
///
/// # Parameters
///
/// * `host` - The host string to normalize (may include protocol)
///
/// # Example
///
/// ```rust
/// use bitbucket_context::sites::normalize_host;
///
/// assert_eq!(normalize_host("  HTTPS://BitBucket.Org/  "), "bitbucket.org");
/// assert_eq!(normalize_host("bitbucket.company.com"), "bitbucket.company.com");
/// ```
///
/// # Notes
///
/// - Does not validate that the result is a valid hostname
/// - Port numbers are preserved
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host.strip_prefix("https://").unwrap_or(host);
    let host = host.strip_prefix("http://").unwrap_or(host);
    let host = host.strip_suffix('/').unwrap_or(host);
    host.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cloud_host() {
        assert!(is_cloud_host(BITBUCKET_CLOUD));
        assert!(is_cloud_host(BITBUCKET_API));
        assert!(!is_cloud_host("bitbucket.company.com"));
        assert!(!is_cloud_host("staging.bitbucket.org"));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("https://bitbucket.org"), "bitbucket.org");
        assert_eq!(normalize_host("http://bitbucket.org/"), "bitbucket.org");
        assert_eq!(normalize_host("BITBUCKET.ORG"), "bitbucket.org");
        assert_eq!(normalize_host(" bb.example.com:7990 "), "bb.example.com:7990");
    }
}
