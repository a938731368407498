//! Template-facing entities hydrated from repository rows.

pub mod post;
pub mod registry;
pub mod taxonomy;
