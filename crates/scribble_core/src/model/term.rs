//! Classification node record (`term_taxonomy` joined with `terms`).

use serde::{Deserialize, Serialize};

/// `term_taxonomy.term_taxonomy_id`.
pub type TermTaxonomyId = i64;

/// `taxonomy` discriminator value for categories.
pub const CATEGORY_TAXONOMY: &str = "category";
/// `taxonomy` discriminator value for tags.
pub const TAG_TAXONOMY: &str = "post_tag";

/// Taxonomy kind discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaxonomyKind {
    Category,
    Tag,
    /// Custom taxonomy (`nav_menu`, `post_format`, plugin-defined, ...).
    Other(String),
}

impl TaxonomyKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Category => CATEGORY_TAXONOMY,
            Self::Tag => TAG_TAXONOMY,
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            CATEGORY_TAXONOMY => Self::Category,
            TAG_TAXONOMY => Self::Tag,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TaxonomyKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TaxonomyKind> for String {
    fn from(value: TaxonomyKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term_taxonomy_id: TermTaxonomyId,
    pub term_id: i64,
    pub kind: TaxonomyKind,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: i64,
    /// Denormalized member count maintained by WordPress.
    pub count: i64,
}

impl TermRecord {
    pub fn is_category(&self) -> bool {
        self.kind == TaxonomyKind::Category
    }

    pub fn is_tag(&self) -> bool {
        self.kind == TaxonomyKind::Tag
    }
}

/// Rule picking the "main" category used to scope adjacent-post navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainCategoryRule {
    /// First category in assignment order (`term_order`, then id).
    #[default]
    FirstAssigned,
    /// Category with the lowest `term_id`.
    LowestId,
    /// Category whose name sorts first, case-insensitively.
    Alphabetical,
}

impl MainCategoryRule {
    /// Selects the main category from categories listed in assignment order.
    pub fn select<'a>(&self, categories: &'a [TermRecord]) -> Option<&'a TermRecord> {
        match self {
            Self::FirstAssigned => categories.first(),
            Self::LowestId => categories.iter().min_by_key(|term| term.term_id),
            Self::Alphabetical => categories
                .iter()
                .min_by_key(|term| (term.name.to_lowercase(), term.term_id)),
        }
    }
}
