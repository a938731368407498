//! Repository layer over the content schema.
//!
//! # Responsibility
//! - Define the read-only data access contract entities delegate to.
//! - Render declarative `PostQuery`/`TaxonomyQuery` scopes into SQL.
//!
//! # Invariants
//! - Repositories never write content rows.
//! - Query-layer failures are returned unchanged; missing rows are `None`.

pub mod content_repo;
pub mod query;
