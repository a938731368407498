//! Content item entity.
//!
//! # Responsibility
//! - Expose template-facing derived fields of one content item.
//! - Resolve related rows (meta, terms, featured image, neighbours) lazily.
//!
//! # Invariants
//! - Each related lookup hits the repository at most once per instance,
//!   including lookups that found nothing.
//! - Missing related data is `None`/empty; repository failures propagate.
//! - Navigation only ever yields published items of type `post`.

use crate::entity::registry::PostKind;
use crate::media::Attachment;
use crate::model::meta::{PostMeta, SEO_DESCRIPTION_KEY, THUMBNAIL_ID_KEY};
use crate::model::post::{PostId, PostRecord, PostStatus};
use crate::model::term::{TaxonomyKind, TermRecord};
use crate::repo::content_repo::RepoResult;
use crate::repo::query::{Adjacent, Direction, PostQuery};
use crate::scribble::Scribble;
use crate::text::{self, ExcerptOptions, SEO_EXCERPT_LIMIT};
use chrono::NaiveDateTime;
use once_cell::unsync::OnceCell;
use std::sync::Arc;

#[derive(Default)]
struct AdjacentSlots<'s> {
    scoped: OnceCell<Option<Box<Post<'s>>>>,
    unscoped: OnceCell<Option<Box<Post<'s>>>>,
}

impl<'s> AdjacentSlots<'s> {
    fn slot(&self, scope_to_category: bool) -> &OnceCell<Option<Box<Post<'s>>>> {
        if scope_to_category {
            &self.scoped
        } else {
            &self.unscoped
        }
    }
}

/// One hydrated content item bound to its `Scribble` context.
pub struct Post<'s> {
    record: PostRecord,
    kind: Arc<dyn PostKind>,
    scribble: &'s Scribble<'s>,
    meta: OnceCell<PostMeta>,
    categories: OnceCell<Vec<TermRecord>>,
    tags: OnceCell<Vec<TermRecord>>,
    thumbnail: OnceCell<Option<Attachment>>,
    next: AdjacentSlots<'s>,
    previous: AdjacentSlots<'s>,
    shares: OnceCell<u64>,
}

impl<'s> Post<'s> {
    pub(crate) fn new(record: PostRecord, kind: Arc<dyn PostKind>, scribble: &'s Scribble<'s>) -> Self {
        Self {
            record,
            kind,
            scribble,
            meta: OnceCell::new(),
            categories: OnceCell::new(),
            tags: OnceCell::new(),
            thumbnail: OnceCell::new(),
            next: AdjacentSlots::default(),
            previous: AdjacentSlots::default(),
            shares: OnceCell::new(),
        }
    }

    pub fn record(&self) -> &PostRecord {
        &self.record
    }

    pub fn into_record(self) -> PostRecord {
        self.record
    }

    pub fn id(&self) -> PostId {
        self.record.id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    pub fn post_type(&self) -> &str {
        &self.record.post_type
    }

    pub fn status(&self) -> &PostStatus {
        &self.record.status
    }

    pub fn published_at(&self) -> NaiveDateTime {
        self.record.post_date
    }

    /// Kind the row was hydrated as.
    pub fn kind(&self) -> &Arc<dyn PostKind> {
        &self.kind
    }

    /// Public URL of the item, as built by its kind.
    pub fn permalink(&self) -> String {
        self.kind
            .public_url(&self.record, &self.scribble.config().site_url)
    }

    /// Plain-text excerpt of the body, at most `limit` characters.
    pub fn excerpt(&self, limit: usize) -> String {
        text::excerpt(&self.record.content, limit)
    }

    pub fn excerpt_with(&self, options: &ExcerptOptions<'_>) -> String {
        text::excerpt_with(&self.record.content, options)
    }

    /// Body wrapped in paragraph markup, one paragraph per line.
    pub fn content(&self) -> String {
        text::paragraphs(&self.record.content)
    }

    /// `3rd March 2024` style publication date.
    pub fn published_date(&self) -> String {
        text::long_date(&self.record.post_date)
    }

    /// Publication date with a strftime pattern; `None` for invalid patterns.
    pub fn published_date_with(&self, pattern: &str) -> Option<String> {
        text::format_date(&self.record.post_date, pattern)
    }

    pub fn meta(&self) -> RepoResult<&PostMeta> {
        self.meta
            .get_or_try_init(|| self.scribble.repository().post_meta(self.record.id))
    }

    /// Categories in assignment order.
    pub fn categories(&self) -> RepoResult<&[TermRecord]> {
        self.categories
            .get_or_try_init(|| self.load_terms(TaxonomyKind::Category))
            .map(Vec::as_slice)
    }

    /// Tags in assignment order.
    pub fn tags(&self) -> RepoResult<&[TermRecord]> {
        self.tags
            .get_or_try_init(|| self.load_terms(TaxonomyKind::Tag))
            .map(Vec::as_slice)
    }

    /// Category picked by the configured main-category rule.
    pub fn main_category(&self) -> RepoResult<Option<&TermRecord>> {
        let rule = self.scribble.config().main_category;
        Ok(rule.select(self.categories()?))
    }

    /// Featured image attachment, if the item has one.
    pub fn thumbnail(&self) -> RepoResult<Option<&Attachment>> {
        let thumbnail = self
            .thumbnail
            .get_or_try_init(|| self.load_thumbnail())?;
        Ok(thumbnail.as_ref())
    }

    /// Featured image URL; the canonical URL without `size` or whenever the
    /// size variant cannot be resolved.
    pub fn featured_url(&self, size: Option<&str>) -> RepoResult<Option<String>> {
        let base_url = &self.scribble.config().base_url;
        Ok(self.thumbnail()?.map(|attachment| match size {
            Some(size) => attachment.sized_url(size, base_url),
            None => attachment.url().to_string(),
        }))
    }

    pub fn featured_alt(&self) -> RepoResult<Option<&str>> {
        Ok(self.thumbnail()?.and_then(Attachment::alt))
    }

    /// `<title>` and description `<meta>` block. The description falls back
    /// to a 150-character excerpt when no SEO description is stored.
    pub fn seo_meta(&self, suffix: Option<&str>) -> RepoResult<String> {
        let description = match self.meta()?.get_non_empty(SEO_DESCRIPTION_KEY) {
            Some(description) => description.to_string(),
            None => self.excerpt(SEO_EXCERPT_LIMIT),
        };
        Ok(text::seo_meta(&self.record.title, suffix, &description))
    }

    /// Next published post, optionally within the main category.
    pub fn next(&self, scope_to_category: bool) -> RepoResult<Option<&Post<'s>>> {
        self.adjacent(Direction::Next, scope_to_category)
    }

    /// Previous published post, optionally within the main category.
    pub fn previous(&self, scope_to_category: bool) -> RepoResult<Option<&Post<'s>>> {
        self.adjacent(Direction::Previous, scope_to_category)
    }

    /// Outbound share count; never fails, 0 when unavailable.
    pub fn shares(&self) -> u64 {
        *self.shares.get_or_init(|| {
            self.scribble
                .share_counter()
                .count_for(self.record.id, &self.permalink())
        })
    }

    fn adjacent(&self, direction: Direction, scope_to_category: bool) -> RepoResult<Option<&Post<'s>>> {
        let slots = match direction {
            Direction::Next => &self.next,
            Direction::Previous => &self.previous,
        };
        let neighbour = slots
            .slot(scope_to_category)
            .get_or_try_init(|| self.load_adjacent(direction, scope_to_category))?;
        Ok(neighbour.as_deref())
    }

    fn load_adjacent(&self, direction: Direction, scope_to_category: bool) -> RepoResult<Option<Box<Post<'s>>>> {
        let mut query = PostQuery::published_posts().adjacent_to(Adjacent {
            direction,
            key: self.scribble.config().navigation_key,
            post_date: self.record.post_date,
            id: self.record.id,
        });
        if scope_to_category {
            let Some(main) = self.main_category()? else {
                return Ok(None);
            };
            query = query.in_category_named(main.name.clone());
        }

        let record = self.scribble.repository().first_post(&query)?;
        Ok(record.map(|record| Box::new(self.scribble.hydrate_as(record, &self.kind))))
    }

    fn load_terms(&self, kind: TaxonomyKind) -> RepoResult<Vec<TermRecord>> {
        self.scribble
            .repository()
            .post_terms(self.record.id, Some(&kind))
    }

    fn load_thumbnail(&self) -> RepoResult<Option<Attachment>> {
        let thumbnail_id = self
            .meta()?
            .get_non_empty(THUMBNAIL_ID_KEY)
            .and_then(|value| value.trim().parse::<PostId>().ok());
        let Some(thumbnail_id) = thumbnail_id else {
            return Ok(None);
        };

        let repo = self.scribble.repository();
        let Some(record) = repo.find_post(thumbnail_id)? else {
            return Ok(None);
        };
        let meta = repo.post_meta(thumbnail_id)?;
        Ok(Some(Attachment { record, meta }))
    }
}

impl std::fmt::Debug for Post<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Post")
            .field("id", &self.record.id)
            .field("post_type", &self.record.post_type)
            .field("kind", &self.kind.name())
            .field("title", &self.record.title)
            .finish_non_exhaustive()
    }
}
