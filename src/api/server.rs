//
//  bitbucket-context
//  api/server.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center Wire Types
//!
//! Payload shapes for the Server REST API v1.0 and the mirroring plugin,
//! plus their mapping into the domain types. Server timestamps are epoch
//! milliseconds, pagination is offset-based (`isLastPage`/`start`), and
//! web links travel in a `links.self` array.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{PullRequest, PullRequestState, User};

/// One page of a Server offset-paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerPage<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// Server user payload (`/rest/api/1.0/users/{slug}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerUser {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub links: ServerLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerLinks {
    #[serde(rename = "self", default)]
    pub self_links: Vec<ServerLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerLink {
    pub href: String,
}

impl ServerUser {
    /// Maps the wire payload into the domain [`User`].
    pub fn into_user(self) -> User {
        let url = self
            .links
            .self_links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();
        User {
            id: self.slug.unwrap_or(self.name),
            display_name: self.display_name,
            url,
            avatar_url: String::new(),
        }
    }
}

/// Server pull request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerPullRequest {
    pub id: u64,
    pub title: String,
    pub state: String,
    #[serde(rename = "createdDate")]
    pub created_date: i64,
    #[serde(rename = "updatedDate")]
    pub updated_date: i64,
    #[serde(default)]
    pub author: Option<ServerParticipant>,
    #[serde(rename = "fromRef")]
    pub from_ref: ServerRef,
    #[serde(rename = "toRef")]
    pub to_ref: ServerRef,
    #[serde(default)]
    pub links: ServerLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerParticipant {
    pub user: ServerUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerRef {
    #[serde(rename = "displayId")]
    pub display_id: String,
}

impl ServerPullRequest {
    /// Maps the wire payload into the domain [`PullRequest`].
    pub fn into_pull_request(self, repository_full_name: &str, site_host: &str) -> PullRequest {
        let url = self
            .links
            .self_links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();
        PullRequest {
            id: self.id,
            title: self.title,
            state: PullRequestState::parse(&self.state),
            author: self.author.map(|p| p.user.into_user()),
            source_branch: self.from_ref.display_id,
            destination_branch: self.to_ref.display_id,
            repository_full_name: repository_full_name.to_string(),
            site_host: site_host.to_string(),
            url,
            created_on: millis_to_datetime(self.created_date),
            updated_on: millis_to_datetime(self.updated_date),
        }
    }
}

/// One mirror server entry from the mirroring plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorServer {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

impl MirrorServer {
    /// The mirror's hostname, extracted from its base URL.
    ///
    /// Falls back to the raw base URL when it does not parse — the value
    /// is only ever displayed, never dereferenced here.
    pub fn hostname(&self) -> String {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_user_mapping() {
        let json = r#"{
            "name": "jdoe",
            "slug": "jdoe",
            "displayName": "John Doe",
            "links": {"self": [{"href": "https://bb.example.com/users/jdoe"}]}
        }"#;
        let user: ServerUser = serde_json::from_str(json).unwrap();
        let user = user.into_user();
        assert_eq!(user.id, "jdoe");
        assert_eq!(user.url, "https://bb.example.com/users/jdoe");
    }

    #[test]
    fn test_server_pull_request_mapping() {
        let json = r#"{
            "id": 7,
            "title": "Upgrade runtime",
            "state": "MERGED",
            "createdDate": 1735689600000,
            "updatedDate": 1735776000000,
            "author": {"user": {"name": "jdoe", "displayName": "John Doe"}},
            "fromRef": {"displayId": "feature/runtime"},
            "toRef": {"displayId": "develop"},
            "links": {"self": [{"href": "https://bb.example.com/projects/P/repos/r/pull-requests/7"}]}
        }"#;
        let pr: ServerPullRequest = serde_json::from_str(json).unwrap();
        let pr = pr.into_pull_request("PROJ/app", "bb.example.com");
        assert_eq!(pr.state, PullRequestState::Merged);
        assert_eq!(pr.source_branch, "feature/runtime");
        assert_eq!(pr.author.unwrap().display_name, "John Doe");
        assert_eq!(pr.created_on.timestamp(), 1_735_689_600);
    }

    #[test]
    fn test_mirror_hostname() {
        let mirror = MirrorServer {
            name: "eu-mirror".into(),
            base_url: "https://mirror.eu.example.com:8443".into(),
        };
        assert_eq!(mirror.hostname(), "mirror.eu.example.com");

        let odd = MirrorServer {
            name: "odd".into(),
            base_url: "not-a-url".into(),
        };
        assert_eq!(odd.hostname(), "not-a-url");
    }
}
