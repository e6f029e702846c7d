//
//  bitbucket-context
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Credentials
//!
//! Credential types applied to outgoing Bitbucket API requests.
//!
//! ## Overview
//!
//! This crate does not *acquire* credentials — OAuth flows, token
//! provisioning, and keychain storage belong to the authentication
//! subsystem that also owns site lifecycles. What lives here is the part
//! the API client needs: a representation of an already-issued credential
//! and the logic to attach it to a request.
//!
//! ## Supported Methods
//!
//! - **Basic**: username + app password (Bitbucket Cloud app passwords,
//!   Server/DC basic auth), sent as a base64 `Authorization: Basic` header
//! - **Bearer**: personal access tokens and OAuth access tokens, sent as
//!   `Authorization: Bearer`
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_context::auth::AuthCredential;
//!
//! let http = reqwest::Client::new();
//! let credential = AuthCredential::bearer("my-access-token");
//! let request = credential.apply_to_request(http.get("https://api.bitbucket.org/2.0/user"));
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::RequestBuilder;

/// An already-issued credential for one Bitbucket site.
///
/// Looked up by the client manager via the site's `credential_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Username and app password (or Server basic auth).
    Basic {
        /// Account username
        username: String,
        /// App password or plain password
        app_password: String,
    },
    /// Personal access token or OAuth access token.
    Bearer {
        /// The token value
        token: String,
    },
}

impl AuthCredential {
    /// Creates a basic credential.
    pub fn basic(username: &str, app_password: &str) -> Self {
        Self::Basic {
            username: username.to_string(),
            app_password: app_password.to_string(),
        }
    }

    /// Creates a bearer-token credential.
    pub fn bearer(token: &str) -> Self {
        Self::Bearer {
            token: token.to_string(),
        }
    }

    /// Attaches the credential to a request as an `Authorization` header.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bitbucket_context::auth::AuthCredential;
    ///
    /// let http = reqwest::Client::new();
    /// let request = AuthCredential::basic("jdoe", "secret")
    ///     .apply_to_request(http.get("https://bb.example.com/rest/api/1.0/users/jdoe"));
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", self.header_value())
    }

    /// The `Authorization` header value this credential produces.
    pub(crate) fn header_value(&self) -> String {
        match self {
            AuthCredential::Basic {
                username,
                app_password,
            } => format!("Basic {}", BASE64.encode(format!("{username}:{app_password}"))),
            AuthCredential::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header_is_base64_user_colon_password() {
        let credential = AuthCredential::basic("jdoe", "hunter2");
        // echo -n 'jdoe:hunter2' | base64
        assert_eq!(credential.header_value(), "Basic amRvZTpodW50ZXIy");
    }

    #[test]
    fn test_bearer_header() {
        let credential = AuthCredential::bearer("tok-123");
        assert_eq!(credential.header_value(), "Bearer tok-123");
    }
}
