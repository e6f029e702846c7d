//
//  bitbucket-context
//  error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Error Types
//!
//! This module defines the typed error taxonomy shared across the crate.
//!
//! ## Overview
//!
//! Most functions propagate `anyhow::Result` and attach context with `?`.
//! The [`ContextError`] enum exists for the cases where callers need to
//! *branch* on a failure class rather than display it:
//!
//! - [`ContextError::BitbucketUnreachable`] is the single connectivity
//!   sentinel used everywhere a Bitbucket backend could not be reached or
//!   produced no usable answer. Callers detect it with
//!   [`is_bitbucket_unreachable`] instead of matching on message text.
//! - Resolution misses (no site for a hostname) are **not** errors; they
//!   are represented as `None`/empty collections and never appear here.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_context::error::{ContextError, is_bitbucket_unreachable};
//!
//! let err: anyhow::Error = ContextError::BitbucketUnreachable.into();
//! assert!(is_bitbucket_unreachable(&err));
//! ```

use thiserror::Error;

/// Failure classes callers are expected to branch on.
///
/// Display messages are stable but callers must match on the variant, not
/// the text. Anything that is merely displayed to the user travels as a
/// plain `anyhow::Error` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The Bitbucket API could not be reached, or reached it but produced
    /// no usable result (e.g. a current-user lookup that returned nothing
    /// because a token was revoked).
    ///
    /// This is the one shared sentinel for the whole subsystem: client
    /// construction for an unknown hostname, transport-level failures, and
    /// empty mandatory lookups all surface as this same variant so callers
    /// can detect the class uniformly.
    #[error("cannot connect to the Bitbucket API")]
    BitbucketUnreachable,

    /// A repository argument or URL was structurally invalid.
    ///
    /// Distinct from a resolution miss: the input could not even be
    /// interpreted, as opposed to being valid but unknown.
    #[error("invalid repository reference: {0}")]
    InvalidRepository(String),

    /// The named site is not configured.
    ///
    /// Only used by surfaces that *require* a site (e.g. `whoami --site`);
    /// internal resolution paths return `None` instead.
    #[error("no authenticated site configured for {0}")]
    UnknownSite(String),
}

/// Checks whether an error is the shared Bitbucket connectivity sentinel.
///
/// Walks the `anyhow` chain so the check still works after callers have
/// wrapped the error with additional context.
///
/// # Example
///
/// ```rust
/// use anyhow::Context;
/// use bitbucket_context::error::{ContextError, is_bitbucket_unreachable};
///
/// let err = anyhow::Error::from(ContextError::BitbucketUnreachable)
///     .context("fetching pull requests");
/// assert!(is_bitbucket_unreachable(&err));
/// ```
pub fn is_bitbucket_unreachable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ContextError>(),
            Some(ContextError::BitbucketUnreachable)
        )
    })
}
