//! Declarative query scopes for content items and classification nodes.
//!
//! Scopes only describe filters; `SqliteContentRepository` renders them.

use crate::model::post::{PostId, PostStatus, POST_TYPE_POST};
use crate::model::term::{TaxonomyKind, TermTaxonomyId};
use chrono::{Month, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Ordering key for adjacent-item navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKey {
    /// Publication time, ties broken by id.
    #[default]
    PublishedAt,
    /// Numeric id only.
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Position of the item whose neighbour is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacent {
    pub direction: Direction,
    pub key: NavigationKey,
    pub post_date: NaiveDateTime,
    pub id: PostId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    #[default]
    IdAsc,
    IdDesc,
    PublishedAsc,
    PublishedDesc,
    PublishedGmtDesc,
}

/// Membership filter against the term tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermFilter {
    /// Member of a term of `kind` whose slug is one of `slugs`.
    Slugs {
        kind: TaxonomyKind,
        slugs: Vec<String>,
    },
    /// Member of a term of `kind` with exactly this name.
    Name { kind: TaxonomyKind, name: String },
    /// Member of one specific classification node.
    TaxonomyId(TermTaxonomyId),
}

/// Calendar filter over `post_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    /// Month numbers (1-12). Unknown month names are kept as 0 so they match nothing.
    Months(Vec<u32>),
    Years(Vec<i32>),
}

/// Filter/sort description for content item queries.
///
/// Every filter is ANDed; within one `has_*` call values are ORed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub post_type: Option<String>,
    pub term_filters: Vec<TermFilter>,
    pub title_keywords: Vec<String>,
    pub date_filters: Vec<DateFilter>,
    pub adjacent: Option<Adjacent>,
    pub order: PostOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(mut self) -> Self {
        self.status = Some(PostStatus::Publish);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn of_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = Some(post_type.into());
        self
    }

    /// Most recent published items of `post_type`, newest first.
    pub fn recent(self, limit: Option<u32>, post_type: &str) -> Self {
        let query = self
            .published()
            .of_type(post_type)
            .order_by(PostOrder::PublishedDesc);
        match limit {
            Some(limit) if limit > 0 => query.limit(limit),
            _ => query,
        }
    }

    /// Items in any of the given category slugs.
    pub fn has_categories<I, S>(self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.has_terms(TaxonomyKind::Category, slugs)
    }

    /// Items carrying any of the given tag slugs.
    pub fn has_tags<I, S>(self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.has_terms(TaxonomyKind::Tag, slugs)
    }

    pub fn has_terms<I, S>(mut self, kind: TaxonomyKind, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.term_filters.push(TermFilter::Slugs {
            kind,
            slugs: slugs.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Items in a category with exactly this name.
    pub fn in_category_named(mut self, name: impl Into<String>) -> Self {
        self.term_filters.push(TermFilter::Name {
            kind: TaxonomyKind::Category,
            name: name.into(),
        });
        self
    }

    pub fn in_taxonomy(mut self, term_taxonomy_id: TermTaxonomyId) -> Self {
        self.term_filters
            .push(TermFilter::TaxonomyId(term_taxonomy_id));
        self
    }

    /// Items whose title contains any of the keywords.
    pub fn has_title_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Items published in any of the named months (any year).
    ///
    /// Accepts full or abbreviated English month names, case-insensitively.
    pub fn published_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let numbers = months
            .into_iter()
            .map(|name| month_number(name.as_ref()).unwrap_or(0))
            .collect();
        self.date_filters.push(DateFilter::Months(numbers));
        self
    }

    /// Items published in any of the given years.
    pub fn published_year<I>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.date_filters
            .push(DateFilter::Years(years.into_iter().collect()));
        self
    }

    pub fn adjacent_to(mut self, adjacent: Adjacent) -> Self {
        self.adjacent = Some(adjacent);
        self
    }

    pub fn order_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Published `post` items only; the base of every navigation query.
    pub fn published_posts() -> Self {
        Self::new().published().of_type(POST_TYPE_POST)
    }
}

/// Filter description for classification node lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyQuery {
    pub kind: Option<TaxonomyKind>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
}

impl TaxonomyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to tags (`post_tag`).
    pub fn tag(mut self) -> Self {
        self.kind = Some(TaxonomyKind::Tag);
        self
    }

    /// Restricts the query to categories.
    pub fn category(mut self) -> Self {
        self.kind = Some(TaxonomyKind::Category);
        self
    }

    pub fn of_kind(mut self, kind: TaxonomyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Maps an English month name ("March", "mar") to 1-12.
pub fn month_number(name: &str) -> Option<u32> {
    name.trim()
        .parse::<Month>()
        .ok()
        .map(|month| month.number_from_month())
}

/// Maps 1-12 to the English month name.
pub fn month_name(number: u32) -> Option<&'static str> {
    u8::try_from(number)
        .ok()
        .and_then(|value| Month::try_from(value).ok())
        .map(|month| month.name())
}
