use rusqlite::Connection;
use scribble_core::db::migrations::latest_version;
use scribble_core::db::{open_db, open_db_in_memory, DbError};
use scribble_core::{RepoError, SqliteContentRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "posts",
        "postmeta",
        "terms",
        "term_taxonomy",
        "term_relationships",
    ] {
        assert_table_exists(&conn, table);
    }
    SqliteContentRepository::try_new(&conn).expect("fresh schema should be ready");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordpress.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO posts (post_title) VALUES ('kept');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let title: String = conn_second
        .query_row("SELECT post_title FROM posts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "kept");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_connection_without_content_tables() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteContentRepository::try_new(&conn)
        .err()
        .expect("bare connection must be rejected");
    assert!(matches!(err, RepoError::MissingRequiredTable("posts")));
}

#[test]
fn repository_rejects_posts_table_missing_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE posts (ID INTEGER PRIMARY KEY, post_title TEXT);")
        .unwrap();
    let err = SqliteContentRepository::try_new(&conn)
        .err()
        .expect("incomplete posts table must be rejected");
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "posts",
            column: "post_date"
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
