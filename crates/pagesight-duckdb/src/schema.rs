/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`,
/// read from `Config.duckdb_memory_limit` at the call site. An explicit
/// limit is always set — the DuckDB default of 80% of system RAM is not
/// acceptable for a long-running process. `threads = 2` keeps the
/// background pool small for single-writer embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- EVENT TYPES
-- ===========================================
-- Reference data: slug → id, e.g. 'page-view'. Reports resolve slugs
-- through the lookup trait; a missing slug is a hard NotFound.
CREATE TABLE IF NOT EXISTS event_types (
    id              BIGINT PRIMARY KEY,
    slug            VARCHAR NOT NULL UNIQUE
);

-- ===========================================
-- EVENTS
-- ===========================================
CREATE TABLE IF NOT EXISTS events (
    id              BIGINT PRIMARY KEY,
    user_id         BIGINT NOT NULL,
    type_id         BIGINT NOT NULL,
    uri             VARCHAR,
    referrer        VARCHAR,            -- referring domain, NULL for direct
    duration        BIGINT DEFAULT 0,   -- seconds spent on the page
    created         TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_created ON events (created);
CREATE INDEX IF NOT EXISTS idx_events_type ON events (type_id, created);

-- ===========================================
-- SESSIONS
-- ===========================================
CREATE TABLE IF NOT EXISTS sessions (
    id              BIGINT PRIMARY KEY,
    user_id         BIGINT NOT NULL,
    started_at      TIMESTAMP NOT NULL,
    ended_at        TIMESTAMP,
    duration        BIGINT DEFAULT 0,   -- seconds
    event_count     BIGINT DEFAULT 0,
    local_time      TIMESTAMP           -- session start in the visitor's timezone
);
CREATE INDEX IF NOT EXISTS idx_sessions_started ON sessions (started_at);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions (user_id);

-- ===========================================
-- USERS (visitors)
-- ===========================================
CREATE TABLE IF NOT EXISTS users (
    id              BIGINT PRIMARY KEY,
    first_name      VARCHAR,
    last_name       VARCHAR,
    email           VARCHAR,
    company         VARCHAR,
    language        VARCHAR,
    device          BIGINT,             -- 1 desktop, 2 tablet, 3 mobile
    screen_width    BIGINT,
    screen_height   BIGINT,
    data            VARCHAR,            -- JSON blob of custom attributes
    created         TIMESTAMP NOT NULL
);

-- ===========================================
-- EVENT RESOURCES
-- ===========================================
-- Keyed reference values attached to events, e.g. type 1 maps a page URI
-- (text_key) to its title (text_value).
CREATE TABLE IF NOT EXISTS event_resources (
    id              BIGINT PRIMARY KEY,
    type_id         BIGINT NOT NULL,
    text_key        VARCHAR NOT NULL,
    text_value      VARCHAR
);
CREATE INDEX IF NOT EXISTS idx_resources_key ON event_resources (type_id, text_key);
"#
    )
}
