//
//  bitbucket-context
//  git/libgit.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # libgit2 Backend
//!
//! `git2`-backed implementation of [`GitRepository`] and [`GitProvider`].
//!
//! ## Overview
//!
//! [`Git2Repository`] opens a repository with git's discovery mechanism
//! (walking up from the given path) and keeps a cached [`RepoState`]
//! snapshot. `git2::Repository` handles are not `Sync`, so the handle is
//! never stored — the repository is re-opened on each refresh, which is
//! cheap for the read-only queries made here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_context::git::libgit::Git2Provider;
//! use bitbucket_context::git::GitProvider;
//!
//! let provider = Git2Provider::discover(&[".".into()])?;
//! for repo in provider.repositories() {
//!     println!("{}", repo.root_uri());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use git2::Repository;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{GitProvider, GitRepository, Remote, RepoState};

/// A local repository backed by libgit2.
pub struct Git2Repository {
    /// Repository root (working directory)
    root: PathBuf,
    /// Cached state snapshot, refreshed by [`GitRepository::status`]
    state: Mutex<RepoState>,
}

impl Git2Repository {
    /// Opens the repository containing `path`, walking up directories the
    /// way `git` itself does.
    ///
    /// # Returns
    ///
    /// - `Ok(Git2Repository)` with an initial state snapshot
    /// - `Err` if no repository is found or it is bare
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("not a git repository: {}", path.display()))?;
        let root = repo
            .workdir()
            .context("bare repositories are not supported")?
            .to_path_buf();
        let state = read_state(&repo);
        Ok(Self {
            root,
            state: Mutex::new(state),
        })
    }
}

#[async_trait]
impl GitRepository for Git2Repository {
    fn root_uri(&self) -> String {
        self.root.display().to_string()
    }

    fn state(&self) -> RepoState {
        self.state.lock().expect("git state lock poisoned").clone()
    }

    async fn status(&self) -> Result<()> {
        // Re-open to pick up config changes made since the last snapshot.
        let repo = Repository::open(&self.root)
            .with_context(|| format!("reopening repository at {}", self.root.display()))?;
        let fresh = read_state(&repo);
        *self.state.lock().expect("git state lock poisoned") = fresh;
        Ok(())
    }
}

/// Reads remotes and HEAD out of an open repository.
///
/// Remote entries with non-UTF-8 names are skipped; git2 already yields
/// them as `None` from `remotes()`.
fn read_state(repo: &Repository) -> RepoState {
    let mut remotes = Vec::new();
    if let Ok(names) = repo.remotes() {
        for name in names.iter().flatten() {
            if let Ok(remote) = repo.find_remote(name) {
                remotes.push(Remote {
                    name: name.to_string(),
                    fetch_url: remote.url().map(|s| s.to_string()),
                    push_url: remote.pushurl().map(|s| s.to_string()),
                });
            }
        }
    }

    let head = repo
        .head()
        .ok()
        .and_then(|head| head.shorthand().map(|s| s.to_string()));

    RepoState { remotes, head }
}

/// [`GitProvider`] over a fixed list of locally-opened repositories.
pub struct Git2Provider {
    repos: Vec<Arc<dyn GitRepository>>,
}

impl Git2Provider {
    /// Opens one repository per path, discovering each from the path given.
    ///
    /// # Parameters
    ///
    /// * `paths` - Directories inside (or at the root of) repositories
    ///
    /// # Returns
    ///
    /// A provider over the opened repositories, or the first open error.
    pub fn discover(paths: &[PathBuf]) -> Result<Self> {
        let mut repos: Vec<Arc<dyn GitRepository>> = Vec::with_capacity(paths.len());
        for path in paths {
            repos.push(Arc::new(Git2Repository::discover(path)?));
        }
        Ok(Self { repos })
    }
}

impl GitProvider for Git2Provider {
    fn repositories(&self) -> Vec<Arc<dyn GitRepository>> {
        self.repos.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo(dir: &TempDir) {
        let run = |args: &[&str]| {
            let status = Command::new("git")
                .args(args)
                .current_dir(dir.path())
                .status()
                .expect("git not available");
            assert!(status.success(), "git {args:?} failed");
        };
        run(&["init", "-q"]);
        run(&["remote", "add", "origin", "git@bitbucket.org:team/app.git"]);
        run(&["remote", "add", "upstream", "https://bitbucket.org/other/app.git"]);
    }

    #[tokio::test]
    async fn test_discover_reads_remotes_in_order() {
        let dir = TempDir::new().unwrap();
        init_repo(&dir);

        let repo = Git2Repository::discover(dir.path()).unwrap();
        let state = repo.state();
        let names: Vec<_> = state.remotes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["origin", "upstream"]);
        assert_eq!(
            state.remotes[0].fetch_url.as_deref(),
            Some("git@bitbucket.org:team/app.git")
        );
    }

    #[tokio::test]
    async fn test_status_picks_up_new_remotes() {
        let dir = TempDir::new().unwrap();
        init_repo(&dir);

        let repo = Git2Repository::discover(dir.path()).unwrap();
        assert_eq!(repo.state().remotes.len(), 2);

        let status = Command::new("git")
            .args(["remote", "add", "fork", "git@bitbucket.org:me/app.git"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success());

        repo.status().await.unwrap();
        assert_eq!(repo.state().remotes.len(), 3);
    }

    #[test]
    fn test_discover_rejects_non_repo() {
        let dir = TempDir::new().unwrap();
        assert!(Git2Repository::discover(dir.path()).is_err());
    }
}
