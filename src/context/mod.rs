//
//  bitbucket-context
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Context
//!
//! The orchestrator tying the git layer, the site resolver, and the API
//! clients into a per-workspace view of "which local repositories map to
//! which Bitbucket sites", with cheap memoization on top.
//!
//! ## Architecture
//!
//! - [`url`]: git remote URL parsing
//! - [`resolver`]: remote → site resolution and remote classification
//! - [`cache`]: the TTL cache backing all memoization here
//! - [`BitbucketContext`]: the orchestrator itself
//!
//! ## Refresh Model
//!
//! The context moves from empty to populated through [`refresh_repos`],
//! re-entered on startup, on any repository topology change the caller
//! observes, or on explicit command. A refresh always invalidates
//! everything and rebuilds — no incremental diffing — trading redundant
//! refetching for correctness under concurrent repository add/remove.
//! Exactly one [`ContextChangeEvent`] fires per refresh, after all
//! per-repository work has settled.
//!
//! Overlapping refreshes are not mutually excluded; both clear and
//! repopulate, and the last writer wins. Acceptable at the event cadence
//! this layer sees; a coalescing in-flight guard is the upgrade path if
//! that ever changes.
//!
//! ## Caching
//!
//! | Cache | Key | TTL |
//! |-------|-----|-----|
//! | current user | site hostname | 10 minutes |
//! | recent pull requests | one aggregate key | 5 minutes |
//! | mirror hosts | site hostname | until next refresh |
//!
//! [`refresh_repos`]: BitbucketContext::refresh_repos

pub mod cache;
pub mod resolver;
pub mod url;

pub use cache::{CacheMap, Clock, SystemClock};
pub use resolver::{BitbucketSite, SiteResolver};
pub use url::{parse_git_url, ParsedGitUrl};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::api::{ClientProvider, PullRequest, User};
use crate::error::ContextError;
use crate::git::{GitProvider, GitRepository, Remote};

/// TTL for per-site current-user lookups.
const CURRENT_USER_TTL: Duration = Duration::from_secs(10 * 60);

/// TTL for the aggregated recent-pull-request listing.
const RECENT_PR_TTL: Duration = Duration::from_secs(5 * 60);

/// The single aggregate key under which the PR listing is cached.
const RECENT_PR_CACHE_KEY: &str = "recent-pullrequests";

/// Remote names tried in order when picking a repository's main remote,
/// used when the caller supplies no preference of its own.
pub const DEFAULT_REMOTE_PREFERENCE: &[&str] = &["origin", "upstream"];

/// Notification that the context was rebuilt.
///
/// Fired once per completed [`BitbucketContext::refresh_repos`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextChangeEvent {
    /// The repository map (and dependent caches) were rebuilt.
    RepositoriesChanged,
}

/// One remote paired with the site it resolved to, if any.
#[derive(Debug, Clone, Serialize)]
pub struct SiteRemote {
    /// The resolved site, `None` when the remote points elsewhere
    pub site: Option<BitbucketSite>,
    /// The remote itself
    pub remote: Remote,
}

/// One local repository's relationship to Bitbucket.
///
/// Rebuilt from scratch on every refresh cycle — never mutated in place.
///
/// # Invariants
///
/// - `main_site_remote` is a member of `site_remotes` whenever
///   `site_remotes` is non-empty.
/// - When no remote resolves to a site, `main_site_remote.site` is `None`
///   but `main_site_remote.remote` still names the first remote, for
///   diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceRepo {
    /// Root path of the repository, its stable identifier
    pub root_uri: String,
    /// The preferred remote/site pair
    pub main_site_remote: SiteRemote,
    /// All remotes that resolved to a Bitbucket site, in remote order
    pub site_remotes: Vec<SiteRemote>,
}

/// Orchestrates repository discovery, site resolution, and cached
/// aggregate queries.
///
/// One instance per workspace session. All collaborators are injected at
/// construction — there is no global registry to reach through.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use bitbucket_context::api::ClientManager;
/// use bitbucket_context::context::{BitbucketContext, SiteResolver};
/// use bitbucket_context::git::libgit::Git2Provider;
/// use bitbucket_context::sites::MemorySiteRegistry;
///
/// # async fn example() -> anyhow::Result<()> {
/// let registry = Arc::new(MemorySiteRegistry::default());
/// let resolver = SiteResolver::new(registry);
/// let clients = Arc::new(ClientManager::new(resolver.clone(), Default::default()));
/// let git = Arc::new(Git2Provider::discover(&[".".into()])?);
///
/// let context = BitbucketContext::new(git, resolver, clients, Vec::new());
/// context.refresh_repos().await?;
///
/// for repo in context.get_bitbucket_repositories() {
///     println!("{}", repo.root_uri);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BitbucketContext {
    git: Arc<dyn GitProvider>,
    resolver: SiteResolver,
    clients: Arc<dyn ClientProvider>,
    remote_preference: Vec<String>,
    repo_map: Mutex<BTreeMap<String, Arc<dyn GitRepository>>>,
    current_users: Mutex<CacheMap<User>>,
    pull_request_cache: Mutex<CacheMap<Vec<PullRequest>>>,
    mirrors_cache: Mutex<HashMap<String, Vec<String>>>,
    events: broadcast::Sender<ContextChangeEvent>,
    disposed: AtomicBool,
}

impl BitbucketContext {
    /// Creates a context over the injected collaborators.
    ///
    /// # Parameters
    ///
    /// * `git` - Source of currently-open repositories
    /// * `resolver` - Remote → site resolution
    /// * `clients` - Authenticated API client factory/cache
    /// * `remote_preference` - Remote names tried in order for the main
    ///   remote; empty list falls back to [`DEFAULT_REMOTE_PREFERENCE`]
    pub fn new(
        git: Arc<dyn GitProvider>,
        resolver: SiteResolver,
        clients: Arc<dyn ClientProvider>,
        remote_preference: Vec<String>,
    ) -> Self {
        let remote_preference = if remote_preference.is_empty() {
            DEFAULT_REMOTE_PREFERENCE
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            remote_preference
        };

        let (events, _) = broadcast::channel(16);
        Self {
            git,
            resolver,
            clients,
            remote_preference,
            repo_map: Mutex::new(BTreeMap::new()),
            current_users: Mutex::new(CacheMap::new()),
            pull_request_cache: Mutex::new(CacheMap::new()),
            mirrors_cache: Mutex::new(HashMap::new()),
            events,
            disposed: AtomicBool::new(false),
        }
    }

    /// Subscribes to context-change notifications.
    ///
    /// One event arrives per completed refresh, never mid-refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<ContextChangeEvent> {
        self.events.subscribe()
    }

    /// Rebuilds the repository map from the git provider.
    ///
    /// Invalidate-all semantics: the pull request cache and the previous
    /// repository map are cleared unconditionally before any repository
    /// is processed. Per-repository work fans out concurrently; the
    /// change notification fires exactly once, after everything settled.
    ///
    /// A repository reporting zero remotes gets one forced `status()`
    /// refresh first — hosts are known to surface repositories before
    /// their remote lists are populated, and one re-read closes that
    /// window. The workaround is logged, not raised.
    ///
    /// Mirror-host lists for server sites are refreshed here too, best
    /// effort: a failing mirror fetch is logged at debug level and
    /// swallowed.
    pub async fn refresh_repos(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            debug!("refresh requested on a disposed context; ignoring");
            return Ok(());
        }

        {
            self.pull_request_cache
                .lock()
                .expect("pull request cache poisoned")
                .clear();
            self.repo_map.lock().expect("repo map poisoned").clear();
        }

        let repos = self.git.repositories();
        join_all(repos.into_iter().map(|repo| self.register_repo(repo))).await;

        self.refresh_mirrors().await;

        let _ = self.events.send(ContextChangeEvent::RepositoriesChanged);
        Ok(())
    }

    async fn register_repo(&self, repo: Arc<dyn GitRepository>) {
        if repo.state().remotes.is_empty() {
            // Host race: the repository can appear before its remotes do.
            // One forced refresh, then take whatever state we get.
            debug!(
                root = %repo.root_uri(),
                "repository reported zero remotes; forcing a status refresh"
            );
            if let Err(err) = repo.status().await {
                warn!(root = %repo.root_uri(), error = %err, "forced status refresh failed");
            }
        }

        self.repo_map
            .lock()
            .expect("repo map poisoned")
            .insert(repo.root_uri(), repo);
    }

    async fn refresh_mirrors(&self) {
        let hosts: BTreeSet<String> = self
            .get_bitbucket_repositories()
            .iter()
            .filter_map(|ws| ws.main_site_remote.site.as_ref())
            .filter(|site| !site.details.is_cloud)
            .map(|site| site.details.hostname().to_string())
            .collect();

        for host in hosts {
            let mirrors = match self.clients.client_for_hostname(&host).await {
                Ok(client) => client.mirror_hosts().await,
                Err(err) => Err(err),
            };
            match mirrors {
                Ok(mirrors) => {
                    self.mirrors_cache
                        .lock()
                        .expect("mirrors cache poisoned")
                        .insert(host, mirrors);
                }
                Err(err) => {
                    debug!(host = %host, error = %err, "mirror host fetch failed; keeping empty list");
                }
            }
        }
    }

    /// Builds the workspace view of one repository.
    ///
    /// `site_remotes` holds every remote that resolved to a site, in the
    /// repository's remote order. The main remote is picked by the
    /// configured name preference, then by first resolving remote, and
    /// as a last resort the first remote with no site at all.
    pub fn workspace_repo_for(&self, repo: &dyn GitRepository) -> WorkspaceRepo {
        let state = repo.state();

        let site_remotes: Vec<SiteRemote> = self
            .resolver
            .get_bitbucket_remotes(&state)
            .into_iter()
            .map(|remote| SiteRemote {
                site: self.resolver.bitbucket_site_for_remote(&remote),
                remote,
            })
            .collect();

        let preferred = self.remote_preference.iter().find_map(|name| {
            site_remotes
                .iter()
                .find(|sr| sr.remote.name.eq_ignore_ascii_case(name))
                .cloned()
        });

        let main_site_remote = preferred
            .or_else(|| site_remotes.first().cloned())
            .unwrap_or_else(|| SiteRemote {
                site: None,
                remote: state.remotes.first().cloned().unwrap_or_else(Remote::unnamed),
            });

        WorkspaceRepo {
            root_uri: repo.root_uri(),
            main_site_remote,
            site_remotes,
        }
    }

    /// Whether any of the repository's remotes resolve to a Bitbucket
    /// site.
    pub fn is_bitbucket_repo(&self, repo: &dyn GitRepository) -> bool {
        !self.resolver.get_bitbucket_remotes(&repo.state()).is_empty()
    }

    /// Workspace views of every registered repository, ordered by root
    /// URI.
    pub fn get_all_repositories(&self) -> Vec<WorkspaceRepo> {
        self.repo_map
            .lock()
            .expect("repo map poisoned")
            .values()
            .map(|repo| self.workspace_repo_for(repo.as_ref()))
            .collect()
    }

    /// Registered repositories whose main remote resolved to a site.
    pub fn get_bitbucket_repositories(&self) -> Vec<WorkspaceRepo> {
        self.get_all_repositories()
            .into_iter()
            .filter(|ws| ws.main_site_remote.site.is_some())
            .collect()
    }

    /// Registered repositories whose main remote resolved to a Cloud
    /// site.
    pub fn get_bitbucket_cloud_repositories(&self) -> Vec<WorkspaceRepo> {
        self.get_all_repositories()
            .into_iter()
            .filter(|ws| {
                ws.main_site_remote
                    .site
                    .as_ref()
                    .map(|site| site.details.is_cloud)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The authenticated user on a site, memoized per hostname for ten
    /// minutes.
    ///
    /// # Errors
    ///
    /// Fails closed with the shared connectivity sentinel when the
    /// client cannot be obtained *or* the lookup produced no user — a
    /// configured site does not guarantee a live user (tokens get
    /// revoked).
    pub async fn current_user(&self, site: &crate::sites::DetailedSiteInfo) -> Result<User> {
        let host = site.hostname().to_string();

        let cached = self
            .current_users
            .lock()
            .expect("current user cache poisoned")
            .get_item(&host)
            .cloned();
        if let Some(user) = cached {
            return Ok(user);
        }

        let client = self.clients.client_for_site(site).await?;
        match client.current_user(site).await? {
            Some(user) => {
                self.current_users
                    .lock()
                    .expect("current user cache poisoned")
                    .set_item(host, user.clone(), CURRENT_USER_TTL);
                Ok(user)
            }
            None => Err(ContextError::BitbucketUnreachable.into()),
        }
    }

    /// Recent pull requests across every Bitbucket repository, memoized
    /// for five minutes under one aggregate key.
    ///
    /// Fans out one fetch per repository concurrently and flattens the
    /// results in repository-iteration order. Fail-fast: if any single
    /// repository's fetch fails, the whole aggregate fails — partial
    /// results are not synthesized at this layer.
    pub async fn recent_pull_requests_for_all_repos(&self) -> Result<Vec<PullRequest>> {
        let cached = self
            .pull_request_cache
            .lock()
            .expect("pull request cache poisoned")
            .get_item(RECENT_PR_CACHE_KEY)
            .cloned();
        if let Some(prs) = cached {
            return Ok(prs);
        }

        let sites: Vec<BitbucketSite> = self
            .get_bitbucket_repositories()
            .into_iter()
            .filter_map(|ws| ws.main_site_remote.site)
            .collect();

        let fetches = sites.into_iter().map(|site| {
            let clients = Arc::clone(&self.clients);
            async move {
                let client = clients.client_for_site(&site.details).await?;
                client.recent_pull_requests(&site).await
            }
        });

        let lists = try_join_all(fetches).await?;
        let flattened: Vec<PullRequest> = lists.into_iter().flatten().collect();

        self.pull_request_cache
            .lock()
            .expect("pull request cache poisoned")
            .set_item(RECENT_PR_CACHE_KEY, flattened.clone(), RECENT_PR_TTL);
        Ok(flattened)
    }

    /// Mirror hostnames recorded for a server host at the last refresh.
    ///
    /// Pure cache read: always answers, with an empty list when nothing
    /// is known. Mirrors are a convenience feature; their absence is not
    /// an error.
    pub fn get_mirrors(&self, hostname: &str) -> Vec<String> {
        self.mirrors_cache
            .lock()
            .expect("mirrors cache poisoned")
            .get(hostname)
            .cloned()
            .unwrap_or_default()
    }

    /// Tears the context down: clears the repository map and every
    /// cache. Idempotent; later refresh calls become no-ops. Event
    /// subscribers see the channel close when the context is dropped.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.repo_map.lock().expect("repo map poisoned").clear();
        self.current_users
            .lock()
            .expect("current user cache poisoned")
            .clear();
        self.pull_request_cache
            .lock()
            .expect("pull request cache poisoned")
            .clear();
        self.mirrors_cache
            .lock()
            .expect("mirrors cache poisoned")
            .clear();
    }
}
