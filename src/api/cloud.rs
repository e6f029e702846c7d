//
//  bitbucket-context
//  api/cloud.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Cloud Wire Types
//!
//! Payload shapes for the Cloud REST API v2.0 and their mapping into the
//! domain types. Cloud responses are paginated with `next`/`previous`
//! URLs; the recent-PR listing only ever reads the first page, so the
//! page wrapper here carries just `values`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{PullRequest, PullRequestState, User};

/// First page of a Cloud paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudPage<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// Cloud user payload (`/2.0/user`).
#[derive(Debug, Clone, Deserialize)]
pub struct CloudUser {
    pub account_id: String,
    pub display_name: String,
    #[serde(default)]
    pub links: CloudUserLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudUserLinks {
    #[serde(default)]
    pub avatar: Option<CloudLink>,
    #[serde(default)]
    pub html: Option<CloudLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudLink {
    pub href: String,
}

impl CloudUser {
    /// Maps the wire payload into the domain [`User`].
    pub fn into_user(self) -> User {
        User {
            id: self.account_id,
            display_name: self.display_name,
            url: self.links.html.map(|l| l.href).unwrap_or_default(),
            avatar_url: self.links.avatar.map(|l| l.href).unwrap_or_default(),
        }
    }
}

/// Cloud pull request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudPullRequest {
    pub id: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub author: Option<CloudUser>,
    pub source: CloudPrEndpoint,
    pub destination: CloudPrEndpoint,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    #[serde(default)]
    pub links: CloudPrLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudPrLinks {
    #[serde(default)]
    pub html: Option<CloudLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudPrEndpoint {
    pub branch: CloudBranch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudBranch {
    pub name: String,
}

impl CloudPullRequest {
    /// Maps the wire payload into the domain [`PullRequest`].
    ///
    /// # Parameters
    ///
    /// * `repository_full_name` - `owner/repo` the listing was made for
    /// * `site_host` - Hostname of the site the PR lives on
    pub fn into_pull_request(self, repository_full_name: &str, site_host: &str) -> PullRequest {
        PullRequest {
            id: self.id,
            title: self.title,
            state: PullRequestState::parse(&self.state),
            author: self.author.map(CloudUser::into_user),
            source_branch: self.source.branch.name,
            destination_branch: self.destination.branch.name,
            repository_full_name: repository_full_name.to_string(),
            site_host: site_host.to_string(),
            url: self.links.html.map(|l| l.href).unwrap_or_default(),
            created_on: self.created_on,
            updated_on: self.updated_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_user_mapping() {
        let json = r#"{
            "account_id": "557058:aaaa",
            "display_name": "Jane Doe",
            "links": {
                "avatar": {"href": "https://avatar.example/jane"},
                "html": {"href": "https://bitbucket.org/jane"}
            }
        }"#;
        let user: CloudUser = serde_json::from_str(json).unwrap();
        let user = user.into_user();
        assert_eq!(user.id, "557058:aaaa");
        assert_eq!(user.display_name, "Jane Doe");
        assert_eq!(user.avatar_url, "https://avatar.example/jane");
    }

    #[test]
    fn test_cloud_pull_request_mapping() {
        let json = r#"{
            "id": 42,
            "title": "Fix login",
            "state": "OPEN",
            "source": {"branch": {"name": "fix/login"}},
            "destination": {"branch": {"name": "main"}},
            "created_on": "2025-11-03T09:21:00+00:00",
            "updated_on": "2025-11-04T10:00:00+00:00",
            "links": {"html": {"href": "https://bitbucket.org/team/app/pull-requests/42"}}
        }"#;
        let pr: CloudPullRequest = serde_json::from_str(json).unwrap();
        let pr = pr.into_pull_request("team/app", "bitbucket.org");
        assert_eq!(pr.id, 42);
        assert_eq!(pr.state, PullRequestState::Open);
        assert_eq!(pr.source_branch, "fix/login");
        assert_eq!(pr.repository_full_name, "team/app");
        assert!(pr.author.is_none());
    }
}
