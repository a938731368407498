//! Read models for WordPress-compatible content rows.
//!
//! # Responsibility
//! - Define the plain records hydrated from `posts`, `postmeta` and the
//!   term tables.
//! - Keep discriminator parsing (`post_status`, `taxonomy`) in one place.
//!
//! # Invariants
//! - Records are read-only views; nothing in this crate writes them back.
//! - Unknown discriminator values are preserved, never rejected.

pub mod meta;
pub mod post;
pub mod term;
