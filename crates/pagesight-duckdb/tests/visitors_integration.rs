mod common;

use chrono::NaiveDate;

use pagesight_core::error::ReportError;
use pagesight_core::filters::ReportFilters;

use common::*;

fn filters(start: (i32, u32, u32), end: (i32, u32, u32)) -> ReportFilters {
    ReportFilters::range(
        NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
    )
}

#[tokio::test]
async fn highlights_split_new_and_returning_visitors() {
    let db = backend_with_page_view_type().await;
    // Two users created inside the window, one long before it.
    insert_user(&db, 1, "2024-03-01 08:00:00").await;
    insert_user(&db, 2, "2024-03-02 08:00:00").await;
    insert_user(&db, 3, "2023-11-20 08:00:00").await;

    insert_event(&db, 1, 1, PAGE_VIEW_TYPE, "/", "2024-03-01 09:00:00").await;
    insert_event(&db, 2, 2, PAGE_VIEW_TYPE, "/", "2024-03-02 09:00:00").await;
    insert_event(&db, 3, 3, PAGE_VIEW_TYPE, "/", "2024-03-03 09:00:00").await;
    // Previous period (02-27..29): one returning visitor.
    insert_event(&db, 4, 3, PAGE_VIEW_TYPE, "/", "2024-02-28 09:00:00").await;

    let report = reporter(db);
    let out = report
        .visitors_highlights(&filters((2024, 3, 1), (2024, 3, 3)))
        .await
        .unwrap();

    assert_eq!(out.total, 3);
    assert_eq!(out.new, 2);
    assert_eq!(out.returning, 1);
    assert_eq!(out.percent_new, 66.67);
    assert_eq!(out.percent_returning, 33.33);
    assert_eq!(out.previous_total, 1);
    assert_eq!(out.total_diff_percent, Some(200.0));
}

#[tokio::test]
async fn visitors_daily_zero_fills_across_the_window() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    insert_user(&db, 2, "2024-01-01 08:00:00").await;

    insert_event(&db, 1, 1, PAGE_VIEW_TYPE, "/", "2024-03-01 09:00:00").await;
    insert_event(&db, 2, 2, PAGE_VIEW_TYPE, "/", "2024-03-01 10:00:00").await;
    insert_event(&db, 3, 1, PAGE_VIEW_TYPE, "/", "2024-03-04 09:00:00").await;

    let report = reporter(db);
    let buckets = report
        .visitors_daily(&filters((2024, 3, 1), (2024, 3, 4)))
        .await
        .unwrap();

    let values: Vec<i64> = buckets.iter().map(|b| b.value).collect();
    assert_eq!(values, vec![2, 0, 0, 1]);
    assert_eq!(buckets[0].date, "2024-03-01");
    assert_eq!(buckets[3].date, "2024-03-04");
}

#[tokio::test]
async fn last_visitors_aggregates_per_visitor_and_formats_fields() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    insert_session(&db, 1, 1, "2024-03-01 09:00:00", 60, 4, None).await;
    insert_session(&db, 2, 1, "2024-03-02 14:45:00", 210, 6, None).await;

    let report = reporter(db);
    let page = report
        .last_visitors(&filters((2024, 3, 1), (2024, 3, 3)))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    let row = &page.items[0];
    assert_eq!(row.i64("id"), 1);
    assert_eq!(row.i64("totalSessions"), 2);
    assert_eq!(row.i64("totalEvents"), 10);
    // (60 + 210) / 2 = 135 seconds.
    assert_eq!(row.str("avgSessionDuration"), "2m 15s");
    assert_eq!(row.str("lastVisit"), "2024-03-02 14:45");
    assert_eq!(row.str("firstName"), "Ada");
}

#[tokio::test]
async fn devices_map_codes_to_labels() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    {
        let conn = db.conn_for_test().await;
        conn.execute("UPDATE users SET device = 3 WHERE id = 1", [])
            .unwrap();
        conn.execute(
            r#"INSERT INTO users (id, language, device, created)
               VALUES (2, 'de-DE', 99, '2024-01-01 08:00:00')"#,
            [],
        )
        .unwrap();
    }
    insert_event(&db, 1, 1, PAGE_VIEW_TYPE, "/", "2024-03-01 09:00:00").await;
    insert_event(&db, 2, 2, PAGE_VIEW_TYPE, "/", "2024-03-01 09:05:00").await;

    let report = reporter(db);
    let devices = report
        .devices(&filters((2024, 3, 1), (2024, 3, 1)))
        .await
        .unwrap();

    let labels: Vec<&str> = devices.iter().map(|d| d.device.as_str()).collect();
    assert!(labels.contains(&"Mobile"));
    assert!(labels.contains(&"(not set)"));
}

#[tokio::test]
async fn languages_count_distinct_visitors() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    insert_user(&db, 2, "2024-01-01 08:00:00").await;
    insert_event(&db, 1, 1, PAGE_VIEW_TYPE, "/", "2024-03-01 09:00:00").await;
    insert_event(&db, 2, 1, PAGE_VIEW_TYPE, "/b", "2024-03-01 09:10:00").await;
    insert_event(&db, 3, 2, PAGE_VIEW_TYPE, "/", "2024-03-01 09:20:00").await;

    let report = reporter(db);
    let languages = report
        .languages(&filters((2024, 3, 1), (2024, 3, 1)))
        .await
        .unwrap();

    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].language, "en-US");
    // Two distinct visitors, not three events.
    assert_eq!(languages[0].total_visitors, 2);
}

#[tokio::test]
async fn visitor_information_includes_lifetime_aggregates() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 7, "2024-01-05 08:00:00").await;
    insert_session(&db, 1, 7, "2024-02-01 10:00:00", 300, 12, None).await;
    insert_session(&db, 2, 7, "2024-03-10 11:30:00", 60, 2, None).await;

    let report = reporter(db);
    let info = report.visitor_information(7).await.unwrap();

    assert_eq!(info.id, 7);
    assert_eq!(info.name, "Ada User7");
    assert_eq!(info.email, "ada@example.com");
    assert_eq!(info.total_sessions, 2);
    assert_eq!(info.total_events, 14);
    // (300 + 60) / 2 = 180 seconds.
    assert_eq!(info.avg_session_duration, "3m");
    assert_eq!(info.last_visit, "2024-03-10 11:30");
    assert_eq!(info.data, serde_json::json!({}));
}

#[tokio::test]
async fn unknown_visitor_is_not_found() {
    let db = backend_with_page_view_type().await;
    let report = reporter(db);

    let err = report.visitor_information(404).await.unwrap_err();
    assert!(matches!(err, ReportError::NotFound(_)));
}

#[tokio::test]
async fn screens_group_by_resolution_with_group_count() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    {
        let conn = db.conn_for_test().await;
        conn.execute(
            r#"INSERT INTO users (id, language, device, screen_width, screen_height, created)
               VALUES (2, 'en-US', 1, 1280, 720, '2024-01-01 08:00:00')"#,
            [],
        )
        .unwrap();
    }
    insert_session(&db, 1, 1, "2024-03-01 09:00:00", 120, 4, None).await;
    insert_session(&db, 2, 1, "2024-03-01 12:00:00", 60, 2, None).await;
    insert_session(&db, 3, 2, "2024-03-02 09:00:00", 30, 3, None).await;

    let report = reporter(db);
    let page = report
        .screens(&filters((2024, 3, 1), (2024, 3, 2)))
        .await
        .unwrap();

    // Two distinct resolutions in range → total counts groups, not sessions.
    assert_eq!(page.total, 2);
    let row = &page.items[0];
    assert_eq!(row.str("resolution"), "1920x1080");
    assert_eq!(row.i64("totalSessions"), 2);
    assert_eq!(row.f64("eventsPerSession"), 3.0);
    // (120 + 60) / 2 = 90 seconds.
    assert_eq!(row.str("avgSessionTime"), "1m 30s");
}

#[tokio::test]
async fn hourly_stats_always_produce_24_shaped_slots() {
    let db = backend_with_page_view_type().await;
    insert_user(&db, 1, "2024-01-01 08:00:00").await;
    insert_session(
        &db,
        1,
        1,
        "2024-03-01 09:00:00",
        90,
        3,
        Some("2024-03-01 04:00:00"),
    )
    .await;
    // Session without a local time must be skipped, not crash the report.
    insert_session(&db, 2, 1, "2024-03-01 10:00:00", 60, 2, None).await;

    let report = reporter(db);
    let slots = report
        .hourly_stats(&filters((2024, 3, 1), (2024, 3, 1)))
        .await
        .unwrap();

    assert_eq!(slots.len(), 24);
    assert_eq!(slots[4].hour, "04");
    assert_eq!(slots[4].total_visitors, 1);
    assert_eq!(slots[4].total_sessions, 1);
    assert_eq!(slots[4].avg_session_time, "1m 30s");
    assert_eq!(slots[4].events_per_session, 3.0);

    // Every other slot is a fully shaped zero record.
    assert_eq!(slots[0].hour, "00");
    assert_eq!(slots[0].total_visitors, 0);
    assert_eq!(slots[0].avg_session_time, "0s");
    assert_eq!(slots[23].hour, "23");
}
