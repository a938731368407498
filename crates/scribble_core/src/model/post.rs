//! Content item record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Numeric WordPress post identifier (`posts.ID`).
pub type PostId = i64;

/// `post_type` of regular blog articles.
pub const POST_TYPE_POST: &str = "post";
/// `post_type` of static pages.
pub const POST_TYPE_PAGE: &str = "page";
/// `post_type` of uploaded media referenced by featured images.
pub const POST_TYPE_ATTACHMENT: &str = "attachment";

/// Storage format of `post_date` and `post_date_gmt`.
pub const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Publication status discriminator (`posts.post_status`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostStatus {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Inherit,
    /// Custom status registered by a plugin.
    Other(String),
}

impl PostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Publish => "publish",
            Self::Future => "future",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
            Self::AutoDraft => "auto-draft",
            Self::Inherit => "inherit",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "publish" => Self::Publish,
            "future" => Self::Future,
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "private" => Self::Private,
            "trash" => Self::Trash,
            "auto-draft" => Self::AutoDraft,
            "inherit" => Self::Inherit,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PostStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PostStatus> for String {
    fn from(value: PostStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `posts`, as read by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    /// Local publication time.
    pub post_date: NaiveDateTime,
    /// UTC publication time. Falls back to `post_date` for unscheduled drafts,
    /// which WordPress stores as the zero date.
    pub post_date_gmt: NaiveDateTime,
    pub status: PostStatus,
    pub post_type: String,
    pub title: String,
    /// Raw body; may contain markup and the `<!--more-->` marker.
    pub content: String,
    /// Hand-written excerpt (often empty).
    pub excerpt: String,
    /// URL slug (`post_name`).
    pub slug: String,
    /// Canonical URL; for attachments this is the full-size file URL.
    pub guid: String,
    pub parent: PostId,
}

impl PostRecord {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Publish
    }
}

/// Parses a stored WordPress date, returning `None` for the zero date.
pub fn parse_post_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), POST_DATE_FORMAT).ok()
}

/// Formats a date the way WordPress stores it.
pub fn format_post_date(value: &NaiveDateTime) -> String {
    value.format(POST_DATE_FORMAT).to_string()
}
