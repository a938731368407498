//! Scribble context: the composition root entities borrow.
//!
//! # Responsibility
//! - Own the content repository, post-type registry, share counter and
//!   configuration.
//! - Hydrate repository rows into `Post` and `Taxonomy` entities.
//!
//! # Invariants
//! - Every entity delegates data access to the one injected repository.
//! - Rows with an unregistered `post_type` hydrate as the requesting kind.

use crate::config::ScribbleConfig;
use crate::entity::post::Post;
use crate::entity::registry::{PostKind, PostTypeRegistry, RegistryError, RoutedPostKind};
use crate::entity::taxonomy::Taxonomy;
use crate::model::post::{PostId, PostRecord, POST_TYPE_POST};
use crate::model::term::TermTaxonomyId;
use crate::repo::content_repo::{ContentRepository, MonthCount, RepoResult};
use crate::repo::query::{PostQuery, TaxonomyQuery};
use crate::shares::{CountCache, MemoryCountCache, ShareCountError, ShareCountSource, ShareCounter, ShareThisClient};
use std::sync::Arc;

pub struct Scribble<'c> {
    repo: Box<dyn ContentRepository + 'c>,
    registry: PostTypeRegistry,
    default_kind: Arc<dyn PostKind>,
    shares: ShareCounter,
    config: ScribbleConfig,
}

impl<'c> Scribble<'c> {
    /// Builds a context with an in-process share cache and the HTTP share
    /// source configured by `config`.
    pub fn new(
        repo: impl ContentRepository + 'c,
        config: ScribbleConfig,
    ) -> Result<Self, ShareCountError> {
        let source = ShareThisClient::new(config.share_endpoint.clone(), config.share_timeout())?;
        Ok(Self::with_share_source(
            repo,
            config,
            Arc::new(source),
            Arc::new(MemoryCountCache::new()),
        ))
    }

    /// Builds a context with caller-provided share source and cache.
    pub fn with_share_source(
        repo: impl ContentRepository + 'c,
        config: ScribbleConfig,
        source: Arc<dyn ShareCountSource>,
        cache: Arc<dyn CountCache>,
    ) -> Self {
        let default_kind: Arc<dyn PostKind> =
            Arc::new(RoutedPostKind::new(POST_TYPE_POST, config.post_route.clone()));
        let shares = ShareCounter::new(cache, source, config.share_cache_ttl());
        Self {
            repo: Box::new(repo),
            registry: PostTypeRegistry::new(),
            default_kind,
            shares,
            config,
        }
    }

    /// Registers the kind hydrated for rows of `post_type`.
    pub fn register_post_type(
        &mut self,
        post_type: &str,
        kind: Arc<dyn PostKind>,
    ) -> Result<(), RegistryError> {
        self.registry.register(post_type, kind)
    }

    pub fn config(&self) -> &ScribbleConfig {
        &self.config
    }

    pub fn repository(&self) -> &dyn ContentRepository {
        self.repo.as_ref()
    }

    pub fn registry(&self) -> &PostTypeRegistry {
        &self.registry
    }

    pub fn share_counter(&self) -> &ShareCounter {
        &self.shares
    }

    /// Kind used for rows whose `post_type` is not registered.
    pub fn default_kind(&self) -> &Arc<dyn PostKind> {
        &self.default_kind
    }

    pub fn post(&self, id: PostId) -> RepoResult<Option<Post<'_>>> {
        Ok(self.repo.find_post(id)?.map(|record| self.hydrate(record)))
    }

    pub fn posts(&self, query: &PostQuery) -> RepoResult<Vec<Post<'_>>> {
        Ok(self
            .repo
            .query_posts(query)?
            .into_iter()
            .map(|record| self.hydrate(record))
            .collect())
    }

    pub fn first_post(&self, query: &PostQuery) -> RepoResult<Option<Post<'_>>> {
        Ok(self.repo.first_post(query)?.map(|record| self.hydrate(record)))
    }

    /// Most recent published posts, newest first.
    pub fn recent(&self, limit: Option<u32>) -> RepoResult<Vec<Post<'_>>> {
        self.posts(&PostQuery::new().recent(limit, POST_TYPE_POST))
    }

    pub fn month_counts(&self, post_type: &str) -> RepoResult<Vec<MonthCount>> {
        self.repo.month_counts(post_type)
    }

    pub fn taxonomy(&self, id: TermTaxonomyId) -> RepoResult<Option<Taxonomy<'_>>> {
        Ok(self
            .repo
            .find_taxonomy(id)?
            .map(|record| Taxonomy::new(record, self)))
    }

    pub fn taxonomies(&self, query: &TaxonomyQuery) -> RepoResult<Vec<Taxonomy<'_>>> {
        Ok(self
            .repo
            .query_taxonomies(query)?
            .into_iter()
            .map(|record| Taxonomy::new(record, self))
            .collect())
    }

    /// Hydrates a row, falling back to the default kind.
    pub fn hydrate(&self, record: PostRecord) -> Post<'_> {
        self.hydrate_as(record, &self.default_kind)
    }

    /// Hydrates a row, falling back to `fallback` for unregistered types.
    pub fn hydrate_as(&self, record: PostRecord, fallback: &Arc<dyn PostKind>) -> Post<'_> {
        let kind = self.registry.resolve(&record.post_type, fallback);
        Post::new(record, kind, self)
    }
}

impl std::fmt::Debug for Scribble<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scribble")
            .field("registry", &self.registry)
            .field("shares", &self.shares)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
