//! Per-item key/value metadata (`postmeta`).

use serde::Serialize;
use std::collections::BTreeMap;

/// Attachment id of a post's featured image.
pub const THUMBNAIL_ID_KEY: &str = "_thumbnail_id";
/// Upload-relative path of an attachment's original file.
pub const ATTACHED_FILE_KEY: &str = "_wp_attached_file";
/// PHP-serialized size variants of an image attachment.
pub const ATTACHMENT_METADATA_KEY: &str = "_wp_attachment_metadata";
/// Alt text of an image attachment.
pub const IMAGE_ALT_KEY: &str = "_wp_attachment_image_alt";
/// Editorial SEO description override.
pub const SEO_DESCRIPTION_KEY: &str = "_yoast_wpseo_metadesc";

/// Metadata of one content item.
///
/// WordPress allows repeated keys; the first stored value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostMeta {
    values: BTreeMap<String, String>,
}

impl PostMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value unless the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value only when it is not blank.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PostMeta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Self::new();
        for (key, value) in iter {
            meta.insert(key, value);
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::PostMeta;

    #[test]
    fn first_value_wins_for_repeated_keys() {
        let meta: PostMeta = [("k", "first"), ("k", "second")].into_iter().collect();
        assert_eq!(meta.get("k"), Some("first"));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn blank_values_are_hidden_from_get_non_empty() {
        let meta: PostMeta = [("desc", "  ")].into_iter().collect();
        assert_eq!(meta.get("desc"), Some("  "));
        assert_eq!(meta.get_non_empty("desc"), None);
    }
}
