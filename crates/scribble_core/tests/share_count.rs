mod common;

use common::{insert_post, open_fixture_db, scribble_with, test_config, NewPost, ScriptedSource};
use rusqlite::Connection;
use scribble_core::shares::share_cache_key;
use scribble_core::{
    CountCache, MemoryCountCache, Scribble, ScribbleConfig, ShareThisClient, SqliteContentRepository,
};
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn insert_article(conn: &Connection) -> i64 {
    insert_post(
        conn,
        NewPost {
            title: "Hello",
            slug: "hello-world",
            ..NewPost::default()
        },
    )
}

/// Serves one HTTP response and returns the request line it received.
fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<io::Result<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || answer_one(&listener, status_line, body));
    (endpoint, handle)
}

fn answer_one(listener: &TcpListener, status_line: &str, body: &str) -> io::Result<String> {
    let (mut stream, _) = listener.accept()?;
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    let mut request = Vec::new();
    let mut buffer = [0_u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        request.extend_from_slice(&buffer[..read]);
    }
    let response = format!(
        "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes())?;
    Ok(String::from_utf8_lossy(&request)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

fn http_scribble<'c>(
    conn: &'c Connection,
    endpoint: &str,
    cache: Arc<MemoryCountCache>,
) -> Scribble<'c> {
    let client = ShareThisClient::new(endpoint, Duration::from_secs(5)).unwrap();
    Scribble::with_share_source(
        SqliteContentRepository::try_new(conn).unwrap(),
        test_config(),
        Arc::new(client),
        cache,
    )
}

#[test]
fn count_is_fetched_once_and_served_from_cache() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let source = Arc::new(ScriptedSource::returning(42));
    let cache = Arc::new(MemoryCountCache::new());
    let scribble = scribble_with(&conn, test_config(), source.clone(), cache.clone());

    let post = scribble.post(id).unwrap().unwrap();
    assert_eq!(post.shares(), 42);
    assert_eq!(post.shares(), 42);

    let same_post = scribble.post(id).unwrap().unwrap();
    assert_eq!(same_post.shares(), 42);

    assert_eq!(source.calls(), 1);
    assert_eq!(source.urls(), vec!["https://blog.example/blog/hello-world".to_string()]);
    assert_eq!(cache.get(&share_cache_key(id)), Some(42));
}

#[test]
fn cached_value_skips_outbound_call() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let source = Arc::new(ScriptedSource::returning(7));
    let cache = Arc::new(MemoryCountCache::new());
    cache.put(&share_cache_key(id), 42, Duration::from_secs(900));
    let scribble = scribble_with(&conn, test_config(), source.clone(), cache);

    let post = scribble.post(id).unwrap().unwrap();
    assert_eq!(post.shares(), 42);
    assert_eq!(post.shares(), 42);
    assert_eq!(source.calls(), 0);
}

#[test]
fn failures_yield_zero_and_are_cached() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let source = Arc::new(ScriptedSource::failing());
    let cache = Arc::new(MemoryCountCache::new());
    let scribble = scribble_with(&conn, test_config(), source.clone(), cache.clone());

    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.get(&share_cache_key(id)), Some(0));
}

#[test]
fn zero_ttl_refetches_on_every_instance() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let source = Arc::new(ScriptedSource::returning(3));
    let config = ScribbleConfig {
        share_cache_ttl_minutes: 0,
        ..test_config()
    };
    let scribble = scribble_with(&conn, config, source.clone(), Arc::new(MemoryCountCache::new()));

    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 3);
    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 3);
    assert_eq!(source.calls(), 2);
}

#[test]
fn http_client_reads_outbound_total() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let (endpoint, server) = serve_once("HTTP/1.1 200 OK", r#"{"total":{"outbound":42,"inbound":1}}"#);
    let cache = Arc::new(MemoryCountCache::new());
    let scribble = http_scribble(&conn, &endpoint, cache.clone());

    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 42);

    let request_line = server.join().unwrap().expect("stub served the request");
    assert!(request_line.starts_with("GET /v1/count/urlinfo?url="));
    assert!(request_line.contains("hello-world"));
    assert_eq!(cache.get(&share_cache_key(id)), Some(42));
}

#[test]
fn empty_total_is_cached_as_zero() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let (endpoint, server) = serve_once("HTTP/1.1 200 OK", r#"{"total":{}}"#);
    let cache = Arc::new(MemoryCountCache::new());
    let scribble = http_scribble(&conn, &endpoint, cache.clone());

    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    server.join().unwrap().expect("stub served the request");
    assert_eq!(cache.get(&share_cache_key(id)), Some(0));
}

#[test]
fn error_status_and_malformed_body_yield_zero() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);

    let (endpoint, server) = serve_once("HTTP/1.1 503 Service Unavailable", r#"{"total":{"outbound":9}}"#);
    let scribble = http_scribble(&conn, &endpoint, Arc::new(MemoryCountCache::new()));
    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    server.join().unwrap().expect("stub served the request");

    let (endpoint, server) = serve_once("HTTP/1.1 200 OK", "<html>rate limited</html>");
    let scribble = http_scribble(&conn, &endpoint, Arc::new(MemoryCountCache::new()));
    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    server.join().unwrap().expect("stub served the request");
}

#[test]
fn unreachable_endpoint_yields_zero() {
    let conn = open_fixture_db();
    let id = insert_article(&conn);
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let cache = Arc::new(MemoryCountCache::new());
    let scribble = http_scribble(&conn, &endpoint, cache.clone());
    assert_eq!(scribble.post(id).unwrap().unwrap().shares(), 0);
    assert_eq!(cache.get(&share_cache_key(id)), Some(0));
}
