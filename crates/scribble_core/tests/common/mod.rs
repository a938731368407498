#![allow(dead_code)]

use rusqlite::{params, Connection};
use scribble_core::{
    open_db_in_memory, MemoryCountCache, PostId, Scribble, ScribbleConfig, ShareCountError,
    ShareCountSource, SqliteContentRepository, TermTaxonomyId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SITE_URL: &str = "https://blog.example";
pub const BASE_URL: &str = "https://cdn.example";

/// Row values for a fixture item; defaults to a published `post`.
pub struct NewPost<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub post_date: &'a str,
    pub post_date_gmt: Option<&'a str>,
    pub status: &'a str,
    pub post_type: &'a str,
    pub content: &'a str,
    pub guid: &'a str,
}

impl Default for NewPost<'_> {
    fn default() -> Self {
        Self {
            title: "Untitled",
            slug: "untitled",
            post_date: "2024-01-01 09:00:00",
            post_date_gmt: None,
            status: "publish",
            post_type: "post",
            content: "",
            guid: "",
        }
    }
}

pub fn open_fixture_db() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn insert_post(conn: &Connection, post: NewPost<'_>) -> PostId {
    conn.execute(
        "INSERT INTO posts (
            post_date, post_date_gmt, post_content, post_title, post_status,
            post_name, guid, post_type
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            post.post_date,
            post.post_date_gmt.unwrap_or(post.post_date),
            post.content,
            post.title,
            post.status,
            post.slug,
            post.guid,
            post.post_type,
        ],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// Inserts a published `post` with the given title and local date.
pub fn insert_published(conn: &Connection, title: &str, post_date: &str) -> PostId {
    let slug = title.to_lowercase().replace(' ', "-");
    insert_post(
        conn,
        NewPost {
            title,
            slug: &slug,
            post_date,
            ..NewPost::default()
        },
    )
}

pub fn insert_meta(conn: &Connection, post_id: PostId, key: &str, value: &str) {
    conn.execute(
        "INSERT INTO postmeta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3);",
        params![post_id, key, value],
    )
    .unwrap();
}

/// Inserts a term plus its taxonomy row and returns the `term_taxonomy_id`.
pub fn insert_term(conn: &Connection, taxonomy: &str, name: &str, slug: &str) -> TermTaxonomyId {
    conn.execute(
        "INSERT INTO terms (name, slug) VALUES (?1, ?2);",
        params![name, slug],
    )
    .unwrap();
    let term_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO term_taxonomy (term_id, taxonomy) VALUES (?1, ?2);",
        params![term_id, taxonomy],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn relate(conn: &Connection, post_id: PostId, term_taxonomy_id: TermTaxonomyId, term_order: i64) {
    conn.execute(
        "INSERT INTO term_relationships (object_id, term_taxonomy_id, term_order)
         VALUES (?1, ?2, ?3);",
        params![post_id, term_taxonomy_id, term_order],
    )
    .unwrap();
}

pub fn test_config() -> ScribbleConfig {
    ScribbleConfig {
        site_url: SITE_URL.to_string(),
        base_url: BASE_URL.to_string(),
        ..ScribbleConfig::default()
    }
}

/// Share source answering every request with one scripted outcome.
pub struct ScriptedSource {
    count: Option<u64>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn returning(count: u64) -> Self {
        Self {
            count: Some(count),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            count: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl ShareCountSource for ScriptedSource {
    fn fetch(&self, url: &str) -> Result<u64, ShareCountError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.count.ok_or(ShareCountError::Status(500))
    }
}

pub fn scribble_with<'c>(
    conn: &'c Connection,
    config: ScribbleConfig,
    source: Arc<ScriptedSource>,
    cache: Arc<MemoryCountCache>,
) -> Scribble<'c> {
    let repo = SqliteContentRepository::try_new(conn).unwrap();
    Scribble::with_share_source(repo, config, source, cache)
}

/// Context with the test config, a zero-count source and a fresh cache.
pub fn scribble(conn: &Connection) -> Scribble<'_> {
    scribble_with(
        conn,
        test_config(),
        Arc::new(ScriptedSource::returning(0)),
        Arc::new(MemoryCountCache::new()),
    )
}
