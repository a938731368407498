//! Content repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide read APIs over `posts`, `postmeta` and the term tables.
//! - Keep SQL rendering of query scopes inside the persistence boundary.
//!
//! # Invariants
//! - Navigation and membership queries are rendered with a total order
//!   (every `ORDER BY` ends with `ID`).
//! - Read paths reject corrupt rows (`InvalidData`) instead of masking them.

use crate::db::DbError;
use crate::model::meta::PostMeta;
use crate::model::post::{format_post_date, parse_post_date, PostId, PostRecord, PostStatus};
use crate::model::term::{TaxonomyKind, TermRecord, TermTaxonomyId};
use crate::repo::query::{
    month_name, Adjacent, DateFilter, Direction, NavigationKey, PostOrder, PostQuery, TaxonomyQuery,
    TermFilter,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;
use thiserror::Error;

const POST_SELECT_SQL: &str = "SELECT
    ID,
    post_date,
    post_date_gmt,
    post_status,
    post_type,
    post_title,
    post_content,
    post_excerpt,
    post_name,
    guid,
    post_parent
FROM posts";

const TERM_SELECT_SQL: &str = "SELECT
    tt.term_taxonomy_id,
    tt.term_id,
    tt.taxonomy,
    t.name,
    t.slug,
    tt.description,
    tt.parent,
    tt.count
FROM term_taxonomy tt
INNER JOIN terms t ON t.term_id = tt.term_id";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "posts",
        &[
            "ID",
            "post_date",
            "post_date_gmt",
            "post_status",
            "post_type",
            "post_title",
            "post_content",
            "post_excerpt",
            "post_name",
            "guid",
            "post_parent",
        ],
    ),
    ("postmeta", &["meta_id", "post_id", "meta_key", "meta_value"]),
    ("terms", &["term_id", "name", "slug"]),
    (
        "term_taxonomy",
        &["term_taxonomy_id", "term_id", "taxonomy", "description", "parent", "count"],
    ),
    (
        "term_relationships",
        &["object_id", "term_taxonomy_id", "term_order"],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for content queries.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("invalid persisted content data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Number of published items per calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: u64,
}

/// Read-only data access capability that entities delegate to.
pub trait ContentRepository {
    fn find_post(&self, id: PostId) -> RepoResult<Option<PostRecord>>;
    fn query_posts(&self, query: &PostQuery) -> RepoResult<Vec<PostRecord>>;
    /// Metadata of one item; empty when the item has none.
    fn post_meta(&self, id: PostId) -> RepoResult<PostMeta>;
    /// Terms assigned to an item in assignment order, optionally of one kind.
    fn post_terms(&self, id: PostId, kind: Option<&TaxonomyKind>) -> RepoResult<Vec<TermRecord>>;
    fn find_taxonomy(&self, id: TermTaxonomyId) -> RepoResult<Option<TermRecord>>;
    fn query_taxonomies(&self, query: &TaxonomyQuery) -> RepoResult<Vec<TermRecord>>;
    /// Published items of `post_type` grouped by calendar month, January first.
    fn month_counts(&self, post_type: &str) -> RepoResult<Vec<MonthCount>>;

    /// First item matching `query`.
    fn first_post(&self, query: &PostQuery) -> RepoResult<Option<PostRecord>> {
        let single = query.clone().limit(1);
        Ok(self.query_posts(&single)?.into_iter().next())
    }
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Constructs a repository after checking the content tables exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_content_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn find_post(&self, id: PostId) -> RepoResult<Option<PostRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE ID = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn query_posts(&self, query: &PostQuery) -> RepoResult<Vec<PostRecord>> {
        let (sql, bind_values) = render_post_query(query);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn post_meta(&self, id: PostId) -> RepoResult<PostMeta> {
        let mut stmt = self.conn.prepare(
            "SELECT meta_key, meta_value
             FROM postmeta
             WHERE post_id = ?1
               AND meta_key IS NOT NULL
             ORDER BY meta_id ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut meta = PostMeta::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get("meta_key")?;
            let value: Option<String> = row.get("meta_value")?;
            meta.insert(key, value.unwrap_or_default());
        }
        Ok(meta)
    }

    fn post_terms(&self, id: PostId, kind: Option<&TaxonomyKind>) -> RepoResult<Vec<TermRecord>> {
        let mut sql = format!(
            "{TERM_SELECT_SQL}
             INNER JOIN term_relationships tr ON tr.term_taxonomy_id = tt.term_taxonomy_id
             WHERE tr.object_id = ?"
        );
        let mut bind_values = vec![Value::Integer(id)];
        if let Some(kind) = kind {
            sql.push_str(" AND tt.taxonomy = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        sql.push_str(" ORDER BY tr.term_order ASC, tt.term_taxonomy_id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }

    fn find_taxonomy(&self, id: TermTaxonomyId) -> RepoResult<Option<TermRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TERM_SELECT_SQL} WHERE tt.term_taxonomy_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_term_row(row)?));
        }
        Ok(None)
    }

    fn query_taxonomies(&self, query: &TaxonomyQuery) -> RepoResult<Vec<TermRecord>> {
        let mut sql = format!("{TERM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(kind) = query.kind.as_ref() {
            sql.push_str(" AND tt.taxonomy = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(slug) = query.slug.as_ref() {
            sql.push_str(" AND t.slug = ?");
            bind_values.push(Value::Text(slug.clone()));
        }
        if let Some(name) = query.name.as_ref() {
            sql.push_str(" AND t.name = ?");
            bind_values.push(Value::Text(name.clone()));
        }

        sql.push_str(" ORDER BY tt.term_taxonomy_id ASC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }

    fn month_counts(&self, post_type: &str) -> RepoResult<Vec<MonthCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                CAST(strftime('%m', post_date) AS INTEGER) AS month_number,
                COUNT(*) AS total
             FROM posts
             WHERE post_status = 'publish'
               AND post_type = ?1
             GROUP BY month_number
             ORDER BY month_number ASC;",
        )?;
        let mut rows = stmt.query([post_type])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let number: Option<i64> = row.get("month_number")?;
            let total: i64 = row.get("total")?;
            let month = number
                .and_then(|value| u32::try_from(value).ok())
                .and_then(month_name)
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "unparseable post_date month `{number:?}` in posts.post_date"
                    ))
                })?;
            counts.push(MonthCount {
                month: month.to_string(),
                count: u64::try_from(total).unwrap_or(0),
            });
        }
        Ok(counts)
    }
}

/// Renders a `PostQuery` into SQL text plus positional bind values.
pub fn render_post_query(query: &PostQuery) -> (String, Vec<Value>) {
    let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(status) = query.status.as_ref() {
        sql.push_str(" AND post_status = ?");
        bind_values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(post_type) = query.post_type.as_ref() {
        sql.push_str(" AND post_type = ?");
        bind_values.push(Value::Text(post_type.clone()));
    }

    for filter in &query.term_filters {
        render_term_filter(filter, &mut sql, &mut bind_values);
    }

    if !query.title_keywords.is_empty() {
        let clauses = query
            .title_keywords
            .iter()
            .map(|keyword| {
                bind_values.push(Value::Text(format!("%{}%", escape_like(keyword))));
                "post_title LIKE ? ESCAPE '\\'"
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        sql.push_str(&format!(" AND ({clauses})"));
    }

    for filter in &query.date_filters {
        let (expression, values): (&str, Vec<i64>) = match filter {
            DateFilter::Months(months) => (
                "CAST(strftime('%m', post_date) AS INTEGER)",
                months.iter().map(|month| i64::from(*month)).collect(),
            ),
            DateFilter::Years(years) => (
                "CAST(strftime('%Y', post_date) AS INTEGER)",
                years.iter().map(|year| i64::from(*year)).collect(),
            ),
        };
        sql.push_str(" AND ");
        push_in_list(
            &mut sql,
            &mut bind_values,
            expression,
            values.into_iter().map(Value::Integer),
        );
    }

    let order_sql = match query.adjacent.as_ref() {
        Some(adjacent) => render_adjacent(adjacent, &mut sql, &mut bind_values),
        None => order_clause(query.order),
    };
    sql.push_str(" ORDER BY ");
    sql.push_str(order_sql);

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }
    } else if query.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.offset)));
    }

    sql.push(';');
    (sql, bind_values)
}

fn render_term_filter(filter: &TermFilter, sql: &mut String, bind_values: &mut Vec<Value>) {
    match filter {
        TermFilter::Slugs { kind, slugs } => {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM term_relationships tr
                    INNER JOIN term_taxonomy tt ON tt.term_taxonomy_id = tr.term_taxonomy_id
                    INNER JOIN terms t ON t.term_id = tt.term_id
                    WHERE tr.object_id = posts.ID
                      AND tt.taxonomy = ?
                      AND ",
            );
            bind_values.push(Value::Text(kind.as_str().to_string()));
            push_in_list(
                sql,
                bind_values,
                "t.slug",
                slugs.iter().cloned().map(Value::Text),
            );
            sql.push(')');
        }
        TermFilter::Name { kind, name } => {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM term_relationships tr
                    INNER JOIN term_taxonomy tt ON tt.term_taxonomy_id = tr.term_taxonomy_id
                    INNER JOIN terms t ON t.term_id = tt.term_id
                    WHERE tr.object_id = posts.ID
                      AND tt.taxonomy = ?
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(kind.as_str().to_string()));
            bind_values.push(Value::Text(name.clone()));
        }
        TermFilter::TaxonomyId(id) => {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM term_relationships tr
                    WHERE tr.object_id = posts.ID
                      AND tr.term_taxonomy_id = ?
                )",
            );
            bind_values.push(Value::Integer(*id));
        }
    }
}

fn render_adjacent(
    adjacent: &Adjacent,
    sql: &mut String,
    bind_values: &mut Vec<Value>,
) -> &'static str {
    match (adjacent.key, adjacent.direction) {
        (NavigationKey::Id, Direction::Next) => {
            sql.push_str(" AND ID > ?");
            bind_values.push(Value::Integer(adjacent.id));
            "ID ASC"
        }
        (NavigationKey::Id, Direction::Previous) => {
            sql.push_str(" AND ID < ?");
            bind_values.push(Value::Integer(adjacent.id));
            "ID DESC"
        }
        (NavigationKey::PublishedAt, direction) => {
            let (operator, order) = match direction {
                Direction::Next => (">", "post_date ASC, ID ASC"),
                Direction::Previous => ("<", "post_date DESC, ID DESC"),
            };
            let post_date = format_post_date(&adjacent.post_date);
            sql.push_str(&format!(
                " AND (post_date {operator} ? OR (post_date = ? AND ID {operator} ?))"
            ));
            bind_values.push(Value::Text(post_date.clone()));
            bind_values.push(Value::Text(post_date));
            bind_values.push(Value::Integer(adjacent.id));
            order
        }
    }
}

fn order_clause(order: PostOrder) -> &'static str {
    match order {
        PostOrder::IdAsc => "ID ASC",
        PostOrder::IdDesc => "ID DESC",
        PostOrder::PublishedAsc => "post_date ASC, ID ASC",
        PostOrder::PublishedDesc => "post_date DESC, ID DESC",
        PostOrder::PublishedGmtDesc => "post_date_gmt DESC, ID DESC",
    }
}

/// Appends `expression IN (?, ...)`, or a never-true predicate for no values.
fn push_in_list(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    expression: &str,
    values: impl IntoIterator<Item = Value>,
) {
    let before = bind_values.len();
    bind_values.extend(values);
    let count = bind_values.len() - before;
    if count == 0 {
        sql.push_str("0 = 1");
        return;
    }
    let placeholders = vec!["?"; count].join(", ");
    sql.push_str(&format!("{expression} IN ({placeholders})"));
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<PostRecord> {
    let id: PostId = row.get("ID")?;
    let post_date_text: String = row.get("post_date")?;
    let post_date = parse_post_date(&post_date_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid post_date `{post_date_text}` for post {id} in posts.post_date"
        ))
    })?;
    let post_date_gmt = row
        .get::<_, Option<String>>("post_date_gmt")?
        .as_deref()
        .and_then(parse_post_date)
        .unwrap_or(post_date);
    let status: String = row.get("post_status")?;

    Ok(PostRecord {
        id,
        post_date,
        post_date_gmt,
        status: PostStatus::parse(&status),
        post_type: row.get("post_type")?,
        title: row.get("post_title")?,
        content: row.get("post_content")?,
        excerpt: row.get("post_excerpt")?,
        slug: row.get("post_name")?,
        guid: row.get("guid")?,
        parent: row.get("post_parent")?,
    })
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<TermRecord> {
    let taxonomy: String = row.get("taxonomy")?;
    Ok(TermRecord {
        term_taxonomy_id: row.get("term_taxonomy_id")?,
        term_id: row.get("term_id")?,
        kind: TaxonomyKind::parse(&taxonomy),
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        parent: row.get("parent")?,
        count: row.get("count")?,
    })
}

fn ensure_content_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}
