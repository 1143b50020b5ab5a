#![allow(dead_code)]

use std::sync::Arc;

use pagesight_duckdb::DuckDbBackend;
use pagesight_reports::Reporter;

pub const PAGE_VIEW_TYPE: i64 = 1;
pub const URI_TITLE_RESOURCE: i64 = 1;

pub async fn backend_with_page_view_type() -> DuckDbBackend {
    let db = DuckDbBackend::open_in_memory().expect("open in-memory db");
    db.seed_event_type(PAGE_VIEW_TYPE, "page-view")
        .await
        .expect("seed event type");
    db
}

pub fn reporter(db: DuckDbBackend) -> Reporter {
    Reporter::new(Arc::new(db))
}

pub async fn insert_user(db: &DuckDbBackend, id: i64, created: &str) {
    let conn = db.conn_for_test().await;
    conn.execute(
        r#"
        INSERT INTO users (
            id, first_name, last_name, email, company, language,
            device, screen_width, screen_height, data, created
        ) VALUES (?1, 'Ada', ?2, 'ada@example.com', 'Example Co', 'en-US',
                  1, 1920, 1080, '{}', ?3)
        "#,
        pagesight_duckdb::duckdb::params![id, format!("User{id}"), created],
    )
    .expect("insert user");
}

pub async fn insert_event(
    db: &DuckDbBackend,
    id: i64,
    user_id: i64,
    type_id: i64,
    uri: &str,
    created: &str,
) {
    insert_event_full(db, id, user_id, type_id, uri, None, 0, created).await;
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_event_full(
    db: &DuckDbBackend,
    id: i64,
    user_id: i64,
    type_id: i64,
    uri: &str,
    referrer: Option<&str>,
    duration: i64,
    created: &str,
) {
    let conn = db.conn_for_test().await;
    conn.execute(
        r#"
        INSERT INTO events (id, user_id, type_id, uri, referrer, duration, created)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        pagesight_duckdb::duckdb::params![id, user_id, type_id, uri, referrer, duration, created],
    )
    .expect("insert event");
}

pub async fn insert_session(
    db: &DuckDbBackend,
    id: i64,
    user_id: i64,
    started_at: &str,
    duration: i64,
    event_count: i64,
    local_time: Option<&str>,
) {
    let conn = db.conn_for_test().await;
    conn.execute(
        r#"
        INSERT INTO sessions (id, user_id, started_at, ended_at, duration, event_count, local_time)
        VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6)
        "#,
        pagesight_duckdb::duckdb::params![id, user_id, started_at, duration, event_count, local_time],
    )
    .expect("insert session");
}

pub async fn insert_page_title(db: &DuckDbBackend, id: i64, uri: &str, title: &str) {
    let conn = db.conn_for_test().await;
    conn.execute(
        r#"
        INSERT INTO event_resources (id, type_id, text_key, text_value)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        pagesight_duckdb::duckdb::params![id, URI_TITLE_RESOURCE, uri, title],
    )
    .expect("insert resource");
}
