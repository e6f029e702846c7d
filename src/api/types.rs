//
//  bitbucket-context
//  api/types.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Domain Types
//!
//! Platform-neutral shapes returned by the [`BitbucketApi`] contract.
//! The Cloud and Server wire formats differ substantially; their raw
//! payload structs live in the [`cloud`] and [`server`] modules and are
//! mapped into these types at the client boundary, so nothing above the
//! API layer ever sees a wire format.
//!
//! [`BitbucketApi`]: super::BitbucketApi
//! [`cloud`]: super::cloud
//! [`server`]: super::server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user on one Bitbucket site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier: Cloud account id, or Server user slug
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Profile URL, may be empty
    #[serde(default)]
    pub url: String,
    /// Avatar URL, may be empty
    #[serde(default)]
    pub avatar_url: String,
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    Open,
    Merged,
    Declined,
    /// Cloud-only: replaced by a newer pull request
    Superseded,
}

impl PullRequestState {
    /// Parses the state strings both platforms emit.
    ///
    /// Unknown strings fall back to `Open` rather than failing the whole
    /// listing — state is display data here, not control flow.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "MERGED" => PullRequestState::Merged,
            "DECLINED" => PullRequestState::Declined,
            "SUPERSEDED" => PullRequestState::Superseded,
            _ => PullRequestState::Open,
        }
    }
}

impl std::fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PullRequestState::Open => "OPEN",
            PullRequestState::Merged => "MERGED",
            PullRequestState::Declined => "DECLINED",
            PullRequestState::Superseded => "SUPERSEDED",
        };
        f.write_str(label)
    }
}

/// One pull request, platform differences already erased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number on its repository
    pub id: u64,
    pub title: String,
    pub state: PullRequestState,
    /// Author, when the payload carried one
    #[serde(default)]
    pub author: Option<User>,
    /// Source branch display name
    pub source_branch: String,
    /// Destination branch display name
    pub destination_branch: String,
    /// `owner/repo` of the repository the PR belongs to
    pub repository_full_name: String,
    /// Hostname of the site the PR lives on
    pub site_host: String,
    /// Web link to the pull request, may be empty
    #[serde(default)]
    pub url: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!(PullRequestState::parse("OPEN"), PullRequestState::Open);
        assert_eq!(PullRequestState::parse("merged"), PullRequestState::Merged);
        assert_eq!(PullRequestState::parse("DECLINED"), PullRequestState::Declined);
        assert_eq!(PullRequestState::parse("whatever"), PullRequestState::Open);
    }

    #[test]
    fn test_state_display_round_trip() {
        for state in [
            PullRequestState::Open,
            PullRequestState::Merged,
            PullRequestState::Declined,
            PullRequestState::Superseded,
        ] {
            assert_eq!(PullRequestState::parse(&state.to_string()), state);
        }
    }
}
