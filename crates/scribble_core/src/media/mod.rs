//! Featured-image URL resolution.
//!
//! # Responsibility
//! - Rebuild resized-image URLs from attachment metadata.
//!
//! # Invariants
//! - Any missing piece (size, metadata, attached file) falls back to the
//!   attachment's canonical `guid`, byte-for-byte. Resolution never fails.

pub mod php_serialize;

use crate::model::meta::{PostMeta, ATTACHED_FILE_KEY, ATTACHMENT_METADATA_KEY, IMAGE_ALT_KEY};
use crate::model::post::PostRecord;
use log::debug;
use php_serialize::{unserialize, PhpValue};

/// Path under the site root where WordPress keeps uploads.
pub const UPLOADS_PATH: &str = "/wp-content/uploads/";

/// An attachment item together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub record: PostRecord,
    pub meta: PostMeta,
}

impl Attachment {
    /// Canonical full-size URL.
    pub fn url(&self) -> &str {
        &self.record.guid
    }

    pub fn alt(&self) -> Option<&str> {
        self.meta.get(IMAGE_ALT_KEY)
    }

    /// URL of the named size variant, or the canonical URL when unavailable.
    pub fn sized_url(&self, size: &str, base_url: &str) -> String {
        sized_image_url(
            self.url(),
            self.meta.get(ATTACHED_FILE_KEY),
            self.meta.get(ATTACHMENT_METADATA_KEY),
            size,
            base_url,
        )
    }
}

/// Rebuilds the URL of a resized image.
///
/// `attached_file` is the upload-relative original (`2024/03/cat.jpeg`);
/// its directory is kept and the file name replaced by the variant's.
pub fn sized_image_url(
    canonical_url: &str,
    attached_file: Option<&str>,
    serialized_metadata: Option<&str>,
    size: &str,
    base_url: &str,
) -> String {
    let Some(resized) = serialized_metadata.and_then(|raw| resized_file_name(raw, size)) else {
        return canonical_url.to_string();
    };
    let Some(attached_file) = attached_file else {
        return canonical_url.to_string();
    };

    let mut segments: Vec<&str> = attached_file.split('/').collect();
    segments.pop();
    segments.push(resized.as_str());

    format!("{}{}", uploads_base(base_url), segments.join("/"))
}

/// `<base_url>/wp-content/uploads/`.
pub fn uploads_base(base_url: &str) -> String {
    format!("{}{UPLOADS_PATH}", base_url.trim_end_matches('/'))
}

/// File name of `sizes[size][file]` in serialized attachment metadata.
pub fn resized_file_name(serialized_metadata: &str, size: &str) -> Option<String> {
    let metadata = match unserialize(serialized_metadata) {
        Ok(value) => value,
        Err(err) => {
            debug!("event=attachment_metadata module=media status=skipped error={err}");
            return None;
        }
    };
    metadata
        .get("sizes")
        .and_then(|sizes| sizes.get(size))
        .and_then(|variant| variant.get("file"))
        .and_then(PhpValue::as_str)
        .filter(|file| !file.is_empty())
        .map(str::to_string)
}
