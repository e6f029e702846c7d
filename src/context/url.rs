//
//  bitbucket-context
//  context/url.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git URL Parser
//!
//! Normalizes the heterogeneous git remote URL forms seen in the wild into
//! one canonical shape the resolver can work with.
//!
//! ## Supported Forms
//!
//! | Form | Example |
//! |------|---------|
//! | scp-style SSH | `git@bitbucket.org:workspace/repo.git` |
//! | SSH with port | `ssh://git@bb.example.com:7999/PROJ/repo.git` |
//! | HTTPS | `https://user@bb.example.com/scm/PROJ/repo.git` |
//! | Server personal repo | `https://bb.example.com/users/jdoe/repos/tools` |
//! | Server project repo | `https://bb.example.com/projects/PROJ/repos/app` |
//!
//! ## Normalization Rules
//!
//! After the generic parse, Bitbucket-specific rewrites apply in order:
//!
//! 1. `.../users/<u>/repos/<r>` → owner `~<u>`, name `<r>` (Bitbucket
//!    Server's personal-repository addressing)
//! 2. `.../projects/<KEY>/repos/<r>` → owner `<KEY>`, name `<r>`
//! 3. Otherwise the owner is the last segment of the leading path, which
//!    collapses nested groups and `/scm/` prefixes alike
//!
//! `full_name` is recomputed as `owner/name` after the rewrites.
//!
//! ## Error Behavior
//!
//! [`parse_git_url`] is a pure function with no I/O and it never fails:
//! malformed input produces a [`ParsedGitUrl`] with empty fields, and
//! callers branch on field presence. This mirrors how resolution misses
//! are handled everywhere else in the crate.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Matches scp-style SSH remotes: `[user@]host:path`.
///
/// The host part intentionally admits underscores — SSH aliases like
/// `bitbucket_org` show up here and are handled downstream by the
/// resolver's retry.
static SCP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:([^@/]+)@)?([^:/@]+):(.+)$").unwrap());

/// Canonical decomposition of a git remote URL.
///
/// Ephemeral value, created fresh per parse and never persisted. All
/// fields are empty strings (or `None`) when the input could not be
/// interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedGitUrl {
    /// URL scheme family: "ssh", "https", "http", or "git"
    pub protocol: String,
    /// Hostname with any port stripped, lowercased
    pub resource: String,
    /// Explicit port, when the URL carried one
    pub port: Option<u16>,
    /// Workspace, project key, or `~user` for Server personal repos
    pub owner: String,
    /// Repository slug, `.git` suffix stripped
    pub name: String,
    /// `owner/name`, or just `name` when no owner segment exists
    pub full_name: String,
}

/// Parses a git remote URL into its canonical parts.
///
/// Pure function of the input string: no network, no filesystem. Returns
/// a best-effort [`ParsedGitUrl`] — absent fields stay empty rather than
/// producing an error, so callers must treat them defensively.
///
/// # Example
///
/// ```rust
/// use bitbucket_context::context::parse_git_url;
///
/// let parsed = parse_git_url("git@bitbucket.org:team/app.git");
/// assert_eq!(parsed.resource, "bitbucket.org");
/// assert_eq!(parsed.owner, "team");
/// assert_eq!(parsed.name, "app");
/// assert_eq!(parsed.full_name, "team/app");
///
/// let personal = parse_git_url("https://bb.example.com/users/jdoe/repos/tools");
/// assert_eq!(personal.owner, "~jdoe");
/// assert_eq!(personal.full_name, "~jdoe/tools");
/// ```
pub fn parse_git_url(url: &str) -> ParsedGitUrl {
    let url = url.trim();
    if url.is_empty() {
        return ParsedGitUrl::default();
    }

    if url.contains("://") {
        parse_scheme_url(url)
    } else if let Some(caps) = SCP_PATTERN.captures(url) {
        let host = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let path = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        finish("ssh", host, None, path)
    } else {
        ParsedGitUrl::default()
    }
}

/// Handles URLs with an explicit scheme via the `url` crate.
fn parse_scheme_url(url: &str) -> ParsedGitUrl {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return ParsedGitUrl::default(),
    };

    let host = match parsed.host_str() {
        Some(host) => host,
        None => return ParsedGitUrl::default(),
    };

    finish(parsed.scheme(), host, parsed.port(), parsed.path())
}

/// Applies the Bitbucket-specific path rewrites and assembles the result.
fn finish(protocol: &str, host: &str, port: Option<u16>, path: &str) -> ParsedGitUrl {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let (owner, name) = split_owner_and_name(&segments);

    let full_name = if owner.is_empty() {
        name.clone()
    } else {
        format!("{owner}/{name}")
    };

    ParsedGitUrl {
        protocol: protocol.to_string(),
        resource: host.to_lowercase(),
        port,
        owner,
        name,
        full_name,
    }
}

/// Extracts owner and repo name from path segments.
///
/// Checks the Server path conventions before the generic last-segment
/// rule, because `users/<u>/repos/<r>` would otherwise collapse into the
/// meaningless owner "repos".
fn split_owner_and_name(segments: &[&str]) -> (String, String) {
    let n = segments.len();
    if n == 0 {
        return (String::new(), String::new());
    }

    let name = strip_git_suffix(segments[n - 1]);

    if n >= 4 && segments[n - 4] == "users" && segments[n - 2] == "repos" {
        return (format!("~{}", segments[n - 3]), name);
    }
    if n >= 4 && segments[n - 4] == "projects" && segments[n - 2] == "repos" {
        return (segments[n - 3].to_string(), name);
    }

    if n == 1 {
        return (String::new(), name);
    }

    // Nested groups and /scm/ prefixes: only the last leading segment is
    // the effective owner.
    (segments[n - 2].to_string(), name)
}

fn strip_git_suffix(segment: &str) -> String {
    segment
        .strip_suffix(".git")
        .unwrap_or(segment)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cloud_ssh() {
        let parsed = parse_git_url("git@bitbucket.org:workspace/repo.git");
        assert_eq!(parsed.protocol, "ssh");
        assert_eq!(parsed.resource, "bitbucket.org");
        assert_eq!(parsed.owner, "workspace");
        assert_eq!(parsed.name, "repo");
        assert_eq!(parsed.full_name, "workspace/repo");
    }

    #[test]
    fn test_parse_cloud_https() {
        let parsed = parse_git_url("https://bitbucket.org/workspace/repo.git");
        assert_eq!(parsed.protocol, "https");
        assert_eq!(parsed.resource, "bitbucket.org");
        assert_eq!(parsed.full_name, "workspace/repo");
    }

    #[test]
    fn test_parse_https_with_userinfo() {
        let parsed = parse_git_url("https://jdoe@bitbucket.org/workspace/repo.git");
        assert_eq!(parsed.resource, "bitbucket.org");
        assert_eq!(parsed.owner, "workspace");
    }

    #[test]
    fn test_parse_server_ssh_with_port() {
        let parsed = parse_git_url("ssh://git@bb.example.com:7999/PROJ/repo.git");
        assert_eq!(parsed.resource, "bb.example.com");
        assert_eq!(parsed.port, Some(7999));
        assert_eq!(parsed.owner, "PROJ");
        assert_eq!(parsed.name, "repo");
    }

    #[test]
    fn test_parse_server_scm_path() {
        let parsed = parse_git_url("https://bb.example.com/scm/PROJ/repo.git");
        assert_eq!(parsed.owner, "PROJ");
        assert_eq!(parsed.full_name, "PROJ/repo");
    }

    #[test]
    fn test_parse_server_personal_repo() {
        let parsed = parse_git_url("https://bb.example.com/users/jdoe/repos/tools");
        assert_eq!(parsed.owner, "~jdoe");
        assert_eq!(parsed.name, "tools");
        assert_eq!(parsed.full_name, "~jdoe/tools");
    }

    #[test]
    fn test_parse_server_project_repo_path() {
        let parsed = parse_git_url("https://bb.example.com/projects/PROJ/repos/app");
        assert_eq!(parsed.owner, "PROJ");
        assert_eq!(parsed.full_name, "PROJ/app");
    }

    #[test]
    fn test_parse_nested_group_ssh() {
        // Some SSH setups hand back nested path owners; only the last
        // segment is the effective owner.
        let parsed = parse_git_url("git@bb.example.com:group/subgroup/repo.git");
        assert_eq!(parsed.owner, "subgroup");
        assert_eq!(parsed.name, "repo");
        assert_eq!(parsed.full_name, "subgroup/repo");
    }

    #[test]
    fn test_parse_underscored_ssh_alias() {
        let parsed = parse_git_url("git@bitbucket_org:user/repo.git");
        assert_eq!(parsed.resource, "bitbucket_org");
        assert_eq!(parsed.owner, "user");
    }

    #[test]
    fn test_parse_without_git_suffix() {
        let parsed = parse_git_url("git@bitbucket.org:workspace/repo");
        assert_eq!(parsed.name, "repo");
    }

    #[test]
    fn test_parse_garbage_is_empty_not_error() {
        let parsed = parse_git_url("not a url at all");
        assert!(parsed.resource.is_empty());
        assert!(parsed.owner.is_empty());
        assert!(parsed.name.is_empty());

        assert_eq!(parse_git_url(""), ParsedGitUrl::default());
    }

    #[test]
    fn test_parse_host_only_path() {
        let parsed = parse_git_url("https://bitbucket.org/repo");
        assert_eq!(parsed.owner, "");
        assert_eq!(parsed.name, "repo");
        assert_eq!(parsed.full_name, "repo");
    }
}
