//! Post-type registry consulted when rows are hydrated into entities.

use crate::model::post::PostRecord;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// WordPress caps `post_type` at 20 characters.
const MAX_POST_TYPE_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("post type is invalid: {0}")]
    InvalidPostType(String),
    #[error("post type already registered: {0}")]
    DuplicatePostType(String),
}

/// Behavior attached to a family of content items.
pub trait PostKind: Send + Sync {
    /// Short label used in logs and debugging output.
    fn name(&self) -> &str;

    /// Public URL of `record` under `site_url`.
    fn public_url(&self, record: &PostRecord, site_url: &str) -> String;
}

/// Kind whose public URL comes from a route template containing `{slug}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedPostKind {
    name: String,
    route: String,
}

impl RoutedPostKind {
    pub const SLUG_PLACEHOLDER: &'static str = "{slug}";

    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

impl PostKind for RoutedPostKind {
    fn name(&self) -> &str {
        &self.name
    }

    fn public_url(&self, record: &PostRecord, site_url: &str) -> String {
        let path = self.route.replace(Self::SLUG_PLACEHOLDER, &record.slug);
        let site = site_url.trim_end_matches('/');
        if path.starts_with('/') || site.is_empty() {
            format!("{site}{path}")
        } else {
            format!("{site}/{path}")
        }
    }
}

/// Kind for uploaded media; the canonical file URL is public as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentKind;

impl PostKind for AttachmentKind {
    fn name(&self) -> &str {
        "attachment"
    }

    fn public_url(&self, record: &PostRecord, _site_url: &str) -> String {
        record.guid.clone()
    }
}

/// `post_type` to kind mapping, populated by host registration calls.
#[derive(Default)]
pub struct PostTypeRegistry {
    kinds: BTreeMap<String, Arc<dyn PostKind>>,
}

impl PostTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` for rows whose `post_type` equals `post_type`.
    pub fn register(
        &mut self,
        post_type: &str,
        kind: Arc<dyn PostKind>,
    ) -> Result<(), RegistryError> {
        let post_type = post_type.trim().to_string();
        if !is_valid_post_type(&post_type) {
            return Err(RegistryError::InvalidPostType(post_type));
        }
        if self.kinds.contains_key(post_type.as_str()) {
            return Err(RegistryError::DuplicatePostType(post_type));
        }

        info!(
            "event=post_type_register module=entity status=ok post_type={} kind={}",
            post_type,
            kind.name()
        );
        self.kinds.insert(post_type, kind);
        Ok(())
    }

    pub fn get(&self, post_type: &str) -> Option<Arc<dyn PostKind>> {
        self.kinds.get(post_type).cloned()
    }

    /// Kind registered for `post_type`, or `fallback` for unregistered types.
    pub fn resolve(&self, post_type: &str, fallback: &Arc<dyn PostKind>) -> Arc<dyn PostKind> {
        self.get(post_type).unwrap_or_else(|| Arc::clone(fallback))
    }

    pub fn contains(&self, post_type: &str) -> bool {
        self.kinds.contains_key(post_type)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Registered post types, sorted.
    pub fn post_types(&self) -> Vec<String> {
        self.kinds.keys().cloned().collect()
    }
}

impl std::fmt::Debug for PostTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.kinds.iter().map(|(post_type, kind)| (post_type, kind.name())))
            .finish()
    }
}

fn is_valid_post_type(value: &str) -> bool {
    if value.is_empty() || value.chars().count() > MAX_POST_TYPE_LEN {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
