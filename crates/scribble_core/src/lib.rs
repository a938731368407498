//! Content accessors over a WordPress-compatible schema.
//! Entities borrow a `Scribble` context that owns the repository and caches.

pub mod config;
pub mod db;
pub mod entity;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod scribble;
pub mod shares;
pub mod text;

pub use config::{open_connection, ConfigError, ScribbleConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use entity::post::Post;
pub use entity::registry::{AttachmentKind, PostKind, PostTypeRegistry, RegistryError, RoutedPostKind};
pub use entity::taxonomy::{Taxonomy, DEFAULT_SELECTION_LIMIT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use media::Attachment;
pub use model::meta::PostMeta;
pub use model::post::{PostId, PostRecord, PostStatus};
pub use model::term::{MainCategoryRule, TaxonomyKind, TermRecord, TermTaxonomyId};
pub use repo::content_repo::{
    ContentRepository, MonthCount, RepoError, RepoResult, SqliteContentRepository,
};
pub use repo::query::{NavigationKey, PostOrder, PostQuery, TaxonomyQuery};
pub use scribble::Scribble;
pub use shares::{
    CountCache, MemoryCountCache, ShareCountError, ShareCountSource, ShareCounter, ShareThisClient,
};
pub use text::ExcerptOptions;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
