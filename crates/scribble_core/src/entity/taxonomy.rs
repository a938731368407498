//! Classification node entity (category, tag, or custom taxonomy).

use crate::entity::post::Post;
use crate::model::term::{TaxonomyKind, TermRecord, TermTaxonomyId};
use crate::repo::content_repo::RepoResult;
use crate::repo::query::{PostOrder, PostQuery};
use crate::scribble::Scribble;

/// Default cap of `Taxonomy::post_selection`.
pub const DEFAULT_SELECTION_LIMIT: u32 = 4;

/// One hydrated classification node bound to its `Scribble` context.
pub struct Taxonomy<'s> {
    record: TermRecord,
    scribble: &'s Scribble<'s>,
}

impl<'s> Taxonomy<'s> {
    pub(crate) fn new(record: TermRecord, scribble: &'s Scribble<'s>) -> Self {
        Self { record, scribble }
    }

    pub fn record(&self) -> &TermRecord {
        &self.record
    }

    pub fn id(&self) -> TermTaxonomyId {
        self.record.term_taxonomy_id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    pub fn kind(&self) -> &TaxonomyKind {
        &self.record.kind
    }

    pub fn is_tag(&self) -> bool {
        self.record.is_tag()
    }

    pub fn is_category(&self) -> bool {
        self.record.is_category()
    }

    /// Every published post in this node, by id.
    pub fn posts(&self) -> RepoResult<Vec<Post<'s>>> {
        self.scribble.posts(&self.members())
    }

    /// The `limit` most recently published posts in this node, newest first.
    pub fn post_selection(&self, limit: u32) -> RepoResult<Vec<Post<'s>>> {
        let query = self
            .members()
            .order_by(PostOrder::PublishedGmtDesc)
            .limit(limit);
        self.scribble.posts(&query)
    }

    fn members(&self) -> PostQuery {
        PostQuery::published_posts().in_taxonomy(self.record.term_taxonomy_id)
    }
}

impl std::fmt::Debug for Taxonomy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Taxonomy")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
