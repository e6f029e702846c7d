//
//  bitbucket-context
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Bitbucket API Client
//!
//! The reqwest-backed implementation of the [`BitbucketApi`] contract,
//! covering both Bitbucket Cloud (REST v2.0) and Server/Data Center
//! (REST v1.0 plus the mirroring plugin).
//!
//! ## Error Behavior
//!
//! - Transport-level failures (DNS, refused connections, TLS) surface as
//!   the shared [`ContextError::BitbucketUnreachable`] sentinel; the
//!   underlying cause is logged at debug level.
//! - Non-2xx responses become display errors with the human-readable
//!   message extracted from either platform's error payload shape.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_context::api::{BitbucketApi, HttpBitbucketApi};
//! use bitbucket_context::auth::AuthCredential;
//! use bitbucket_context::sites::{DetailedSiteInfo, Product};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let site = DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred-1");
//! let client = HttpBitbucketApi::new(site.clone(), Some(AuthCredential::bearer("token")))?;
//! if let Some(user) = client.current_user(&site).await? {
//!     println!("{}", user.display_name);
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::AuthCredential;
use crate::context::BitbucketSite;
use crate::error::ContextError;
use crate::sites::DetailedSiteInfo;

use super::cloud::{CloudPage, CloudPullRequest, CloudUser};
use super::server::{MirrorServer, ServerPage, ServerPullRequest, ServerUser};
use super::types::{PullRequest, User};
use super::BitbucketApi;

/// Extracts a user-friendly message from a Bitbucket error response.
///
/// Cloud wraps errors as `{"error": {"message": ...}}`, Server as
/// `{"errors": [{"message": ...}]}`. Unknown shapes fall back to the raw
/// body together with the status code.
pub fn format_api_error(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        // Cloud format: {"type": "error", "error": {"message": "..."}}
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return anyhow::anyhow!("{}", message);
        }

        // Server format: {"errors": [{"message": "..."}]}
        if let Some(message) = json
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|arr| arr.first())
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return anyhow::anyhow!("{}", message);
        }

        // Simple message format: {"message": "..."}
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return anyhow::anyhow!("{}", message);
        }
    }

    anyhow::anyhow!("API error ({}): {}", status, body)
}

/// reqwest-backed [`BitbucketApi`] for one site.
///
/// Constructed per site by the client manager and cached there; holds the
/// site's credential, API base (`/2.0` or `/rest/api/1.0`), and root base
/// (for non-API endpoints like the mirroring plugin).
pub struct HttpBitbucketApi {
    http: Client,
    site: DetailedSiteInfo,
    auth: Option<AuthCredential>,
    api_base: String,
    root_base: String,
}

impl HttpBitbucketApi {
    /// Creates a client for the given site and optional credential.
    pub fn new(site: DetailedSiteInfo, auth: Option<AuthCredential>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("bbctx/{}", crate::VERSION))
            .build()?;
        Ok(Self {
            api_base: site.base_api_url.clone(),
            root_base: site.base_link_url.clone(),
            http,
            site,
            auth,
        })
    }

    /// Overrides both base URLs.
    ///
    /// For gateways that front the Bitbucket API under another origin,
    /// and for tests against a local mock server.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_base = base.to_string();
        self.root_base = base.to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let mut request = self.http.get(&url);
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "bitbucket request failed at transport level");
                return Err(ContextError::BitbucketUnreachable.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format_api_error(status, &text));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl BitbucketApi for HttpBitbucketApi {
    async fn current_user(&self, site: &DetailedSiteInfo) -> Result<Option<User>> {
        if site.is_cloud {
            let user: CloudUser = self.get_json(format!("{}/user", self.api_base)).await?;
            return Ok(Some(user.into_user()));
        }

        // Server has no "current user" endpoint; the user slug recorded at
        // authentication time is looked up directly. Without one there is
        // nothing to query.
        if site.user_id.is_empty() {
            tracing::debug!(host = %site.host, "no user id recorded for server site");
            return Ok(None);
        }

        let user: ServerUser = self
            .get_json(format!("{}/users/{}", self.api_base, site.user_id))
            .await?;
        Ok(Some(user.into_user()))
    }

    async fn recent_pull_requests(&self, site: &BitbucketSite) -> Result<Vec<PullRequest>> {
        let host = site.details.hostname();
        let full_name = site.full_name();

        if site.details.is_cloud {
            let url = format!(
                "{}/repositories/{}/{}/pullrequests?pagelen=25&sort=-created_on&state=OPEN&state=MERGED&state=DECLINED&state=SUPERSEDED",
                self.api_base, site.owner_slug, site.repo_slug
            );
            let page: CloudPage<CloudPullRequest> = self.get_json(url).await?;
            return Ok(page
                .values
                .into_iter()
                .map(|pr| pr.into_pull_request(&full_name, host))
                .collect());
        }

        let url = format!(
            "{}/projects/{}/repos/{}/pull-requests?state=ALL&order=NEWEST&limit=25",
            self.api_base, site.owner_slug, site.repo_slug
        );
        let page: ServerPage<ServerPullRequest> = self.get_json(url).await?;
        Ok(page
            .values
            .into_iter()
            .map(|pr| pr.into_pull_request(&full_name, host))
            .collect())
    }

    async fn mirror_hosts(&self) -> Result<Vec<String>> {
        // Mirrors only exist for Server/Data Center deployments.
        if self.site.is_cloud {
            return Ok(Vec::new());
        }

        let url = format!("{}/rest/mirroring/1.0/mirrorServers", self.root_base);
        let page: ServerPage<MirrorServer> = self.get_json(url).await?;
        Ok(page.values.iter().map(MirrorServer::hostname).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_bitbucket_unreachable;
    use crate::sites::Product;

    fn cloud_site() -> DetailedSiteInfo {
        DetailedSiteInfo::cloud(Product::Bitbucket, "bitbucket.org", "cred")
    }

    fn server_site() -> DetailedSiteInfo {
        DetailedSiteInfo::server(Product::Bitbucket, "bb.example.com", "cred").with_user_id("jdoe")
    }

    #[tokio::test]
    async fn test_cloud_current_user() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body(r#"{"account_id": "557058:aaaa", "display_name": "Jane Doe"}"#)
            .create_async()
            .await;

        let site = cloud_site();
        let client = HttpBitbucketApi::new(site.clone(), Some(AuthCredential::bearer("tok-1")))
            .unwrap()
            .with_base_url(&mock_server.url());

        let user = client.current_user(&site).await.unwrap().unwrap();
        assert_eq!(user.display_name, "Jane Doe");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_current_user_looks_up_recorded_slug() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/users/jdoe")
            .with_status(200)
            .with_body(r#"{"name": "jdoe", "slug": "jdoe", "displayName": "John Doe"}"#)
            .create_async()
            .await;

        let site = server_site();
        let client = HttpBitbucketApi::new(site.clone(), None)
            .unwrap()
            .with_base_url(&mock_server.url());

        let user = client.current_user(&site).await.unwrap().unwrap();
        assert_eq!(user.id, "jdoe");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_current_user_without_slug_is_none() {
        let site = DetailedSiteInfo::server(Product::Bitbucket, "bb.example.com", "cred");
        let client = HttpBitbucketApi::new(site.clone(), None).unwrap();
        assert!(client.current_user(&site).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cloud_recent_pull_requests() {
        let mut mock_server = mockito::Server::new_async().await;
        let _mock = mock_server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/repositories/team/app/pullrequests".to_string()),
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"values": [{
                    "id": 3,
                    "title": "Add cache",
                    "state": "OPEN",
                    "source": {"branch": {"name": "feature/cache"}},
                    "destination": {"branch": {"name": "main"}},
                    "created_on": "2025-11-03T09:21:00+00:00",
                    "updated_on": "2025-11-03T09:21:00+00:00"
                }]}"#,
            )
            .create_async()
            .await;

        let details = cloud_site();
        let client = HttpBitbucketApi::new(details.clone(), None)
            .unwrap()
            .with_base_url(&mock_server.url());
        let site = BitbucketSite {
            details,
            owner_slug: "team".into(),
            repo_slug: "app".into(),
        };

        let prs = client.recent_pull_requests(&site).await.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].title, "Add cache");
        assert_eq!(prs[0].repository_full_name, "team/app");
        assert_eq!(prs[0].site_host, "bitbucket.org");
    }

    #[tokio::test]
    async fn test_mirror_hosts_cloud_is_empty_without_request() {
        let client = HttpBitbucketApi::new(cloud_site(), None).unwrap();
        assert!(client.mirror_hosts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_hosts_server() {
        let mut mock_server = mockito::Server::new_async().await;
        let _mock = mock_server
            .mock("GET", "/rest/mirroring/1.0/mirrorServers")
            .with_status(200)
            .with_body(
                r#"{"values": [
                    {"name": "eu", "baseUrl": "https://mirror.eu.example.com"},
                    {"name": "us", "baseUrl": "https://mirror.us.example.com"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = HttpBitbucketApi::new(server_site(), None)
            .unwrap()
            .with_base_url(&mock_server.url());

        let mirrors = client.mirror_hosts().await.unwrap();
        assert_eq!(
            mirrors,
            vec!["mirror.eu.example.com", "mirror.us.example.com"]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_the_sentinel() {
        let site = cloud_site();
        // Nothing listens on port 1.
        let client = HttpBitbucketApi::new(site.clone(), None)
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        let err = client.current_user(&site).await.unwrap_err();
        assert!(is_bitbucket_unreachable(&err));
    }

    #[tokio::test]
    async fn test_http_error_carries_payload_message() {
        let mut mock_server = mockito::Server::new_async().await;
        let _mock = mock_server
            .mock("GET", "/user")
            .with_status(403)
            .with_body(r#"{"type": "error", "error": {"message": "Access denied"}}"#)
            .create_async()
            .await;

        let site = cloud_site();
        let client = HttpBitbucketApi::new(site.clone(), None)
            .unwrap()
            .with_base_url(&mock_server.url());

        let err = client.current_user(&site).await.unwrap_err();
        assert_eq!(err.to_string(), "Access denied");
        assert!(!is_bitbucket_unreachable(&err));
    }

    #[test]
    fn test_format_api_error_server_shape() {
        let err = format_api_error(
            StatusCode::NOT_FOUND,
            r#"{"errors": [{"message": "Repository does not exist"}]}"#,
        );
        assert_eq!(err.to_string(), "Repository does not exist");
    }

    #[test]
    fn test_format_api_error_fallback() {
        let err = format_api_error(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(err.to_string().contains("502"));
    }
}
