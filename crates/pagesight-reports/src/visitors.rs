//! Visitor reports: highlights with period comparison, visitor tables,
//! daily trend, distributions and the hour-of-day profile.

use std::collections::HashMap;

use serde::Serialize;

use pagesight_core::error::{ReportError, Result};
use pagesight_core::filters::ReportFilters;
use pagesight_core::format::{format_duration, format_rows, FieldFormat};
use pagesight_core::row::{Page, Value};
use pagesight_core::series::{densify, fill_hours, DayBucket};
use pagesight_core::spec::QuerySpec;
use pagesight_core::store::Source;
use pagesight_core::window::{diff_percent, DateWindow};

use crate::Reporter;

/// Device codes as stored on the `users` table.
pub const DEVICE_DESKTOP: i64 = 1;
pub const DEVICE_TABLET: i64 = 2;
pub const DEVICE_MOBILE: i64 = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorsHighlights {
    pub total: i64,
    pub new: i64,
    pub returning: i64,
    pub percent_new: f64,
    pub percent_returning: f64,
    pub previous_total: i64,
    pub total_diff_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageShare {
    pub language: String,
    pub total_visitors: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceShare {
    pub device: String,
    pub total_visitors: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInformation {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: String,
    pub language: String,
    pub screen_width: i64,
    pub screen_height: i64,
    pub first_visit: String,
    pub last_visit: String,
    pub data: serde_json::Value,
    pub total_sessions: i64,
    pub total_events: i64,
    pub avg_session_duration: String,
}

/// One hour-of-day slot. Missing hours are emitted as a fully shaped
/// zero record, not a bare count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySlot {
    pub hour: String,
    pub total_visitors: i64,
    pub avg_session_time: String,
    pub total_sessions: i64,
    pub events_per_session: f64,
    pub total_events: i64,
}

impl HourlySlot {
    fn empty(hour: u32) -> Self {
        Self {
            hour: format!("{hour:02}"),
            total_visitors: 0,
            avg_session_time: format_duration(0),
            total_sessions: 0,
            events_per_session: 0.0,
            total_events: 0,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Reporter {
    /// Distinct visitors in the window, split into new vs returning, with
    /// a previous-period comparison.
    pub async fn visitors_highlights(&self, filters: &ReportFilters) -> Result<VisitorsHighlights> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let total_spec = |w: &DateWindow| {
            QuerySpec::new()
                .select("COUNT(DISTINCT user_id) AS users")
                .filter("created >= ?", vec![w.start_str().into()])
                .filter("created <= ?", vec![w.end_str().into()])
        };

        // A "new" visitor's user record was itself created inside the window.
        let new_spec = QuerySpec::new()
            .alias("ev")
            .select("COUNT(DISTINCT ev.user_id) AS newUsers")
            .join(&users, "us", &["ev.user_id = us.id"])
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("us.created >= ?", vec![window.start_str().into()]);

        let ((total, previous_total), new) = {
            let totals = self.totals_with_comparison(Source::Events, &window, total_spec, "users");
            let new = self.scalar_i64(Source::Events, &new_spec, "newUsers");
            let (totals, new) = tokio::join!(totals, new);
            (totals?, new?)
        };

        let returning = total - new;
        Ok(VisitorsHighlights {
            total,
            new,
            returning,
            percent_new: if total > 0 {
                round2(new as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
            percent_returning: if total > 0 {
                round2(returning as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
            previous_total,
            total_diff_percent: diff_percent(total, previous_total),
        })
    }

    /// Visitors active in the window, most recent first, with per-visitor
    /// session aggregates.
    pub async fn last_visitors(&self, filters: &ReportFilters) -> Result<Page> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let spec = QuerySpec::new()
            .alias("se")
            .select("se.user_id AS id")
            .select("count(se.id) AS totalSessions")
            .select("CAST(sum(se.duration) / count(se.id) AS BIGINT) AS avgSessionDuration")
            .select("sum(se.event_count) AS totalEvents")
            .select("CAST(max(se.started_at) AS VARCHAR) AS lastVisit")
            .select("us.first_name AS firstName")
            .select("us.last_name AS lastName")
            .join(&users, "us", &["se.user_id = us.id"])
            .filter("se.started_at >= ?", vec![window.start_str().into()])
            .filter("se.started_at <= ?", vec![window.end_str().into()])
            .filter("us.id IS NOT NULL", vec![])
            .group_by("se.user_id")
            .group_by("us.first_name")
            .group_by("us.last_name")
            .order_by("lastVisit DESC");

        let mut page = self
            .page(Source::Sessions, &spec, filters.offset_or_zero())
            .await?;

        format_rows(
            &mut page.items,
            &[
                ("avgSessionDuration", FieldFormat::Duration),
                ("lastVisit", FieldFormat::Timestamp),
            ],
        )?;

        Ok(page)
    }

    /// Distinct visitors per calendar day across the window, zero-filled.
    pub async fn visitors_daily(&self, filters: &ReportFilters) -> Result<Vec<DayBucket>> {
        let window = DateWindow::from_filters(filters)?;

        let spec = QuerySpec::new()
            .alias("ev")
            .select("strftime(ev.created, '%Y-%m-%d') AS date")
            .select("count(DISTINCT ev.user_id) AS visitors")
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .group_by("strftime(ev.created, '%Y-%m-%d')");

        let rows = self.query(Source::Events, &spec).await?;
        let sparse: HashMap<String, i64> = rows
            .iter()
            .map(|row| (row.str("date").to_string(), row.i64("visitors")))
            .collect();

        Ok(densify(&sparse, &window))
    }

    /// Visitor counts per reported browser language.
    pub async fn languages(&self, filters: &ReportFilters) -> Result<Vec<LanguageShare>> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let spec = QuerySpec::new()
            .alias("ev")
            .select("count(DISTINCT ev.user_id) AS totalVisitors")
            .select("us.language AS language")
            .join(&users, "us", &["ev.user_id = us.id"])
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .group_by("us.language")
            .order_by("totalVisitors DESC");

        let rows = self.query(Source::Events, &spec).await?;
        Ok(rows
            .iter()
            .map(|row| LanguageShare {
                language: row.str("language").to_string(),
                total_visitors: row.i64("totalVisitors"),
            })
            .collect())
    }

    /// Visitor counts per device class, codes mapped to display labels.
    pub async fn devices(&self, filters: &ReportFilters) -> Result<Vec<DeviceShare>> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let spec = QuerySpec::new()
            .alias("ev")
            .select("count(DISTINCT ev.user_id) AS totalVisitors")
            .select("us.device AS device")
            .join(&users, "us", &["ev.user_id = us.id"])
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .group_by("us.device")
            .order_by("totalVisitors DESC");

        let rows = self.query(Source::Events, &spec).await?;
        Ok(rows
            .iter()
            .map(|row| DeviceShare {
                device: match row.i64("device") {
                    DEVICE_DESKTOP => "Desktop".to_string(),
                    DEVICE_TABLET => "Tablet".to_string(),
                    DEVICE_MOBILE => "Mobile".to_string(),
                    _ => "(not set)".to_string(),
                },
                total_visitors: row.i64("totalVisitors"),
            })
            .collect())
    }

    /// Profile and lifetime session aggregates for one visitor. Unknown
    /// ids are a hard [`ReportError::NotFound`], never an empty profile.
    pub async fn visitor_information(&self, visitor_id: i64) -> Result<VisitorInformation> {
        let profile_spec = QuerySpec::new()
            .select("id")
            .select("first_name AS firstName")
            .select("last_name AS lastName")
            .select("email")
            .select("company")
            .select("language")
            .select("screen_width AS screenWidth")
            .select("screen_height AS screenHeight")
            .select("CAST(created AS VARCHAR) AS firstVisit")
            .select("data")
            .filter("id = ?", vec![visitor_id.into()]);

        let sessions_spec = QuerySpec::new()
            .alias("se")
            .select("count(se.id) AS totalSessions")
            .select("CAST(sum(se.duration) / count(se.id) AS BIGINT) AS avgSessionDuration")
            .select("sum(se.event_count) AS totalEvents")
            .select("CAST(max(se.started_at) AS VARCHAR) AS lastVisit")
            .filter("se.user_id = ?", vec![visitor_id.into()]);

        let (profile_rows, session_rows) = tokio::join!(
            self.query(Source::Users, &profile_spec),
            self.query(Source::Sessions, &sessions_spec),
        );
        let profile_rows = profile_rows?;
        let session_rows = session_rows?;

        let profile = profile_rows
            .first()
            .ok_or_else(|| ReportError::NotFound(format!("visitor {visitor_id}")))?;
        let sessions = session_rows.first().cloned().unwrap_or_default();

        let name = format!("{} {}", profile.str("firstName"), profile.str("lastName"))
            .trim()
            .to_string();
        let last_visit = match sessions.get("lastVisit") {
            Some(Value::Text(_)) => {
                let mut rows = vec![sessions.clone()];
                format_rows(&mut rows, &[("lastVisit", FieldFormat::Timestamp)])?;
                rows[0].str("lastVisit").to_string()
            }
            _ => String::new(),
        };

        Ok(VisitorInformation {
            id: profile.i64("id"),
            name,
            email: profile.str("email").to_string(),
            company: profile.str("company").to_string(),
            language: profile.str("language").to_string(),
            screen_width: profile.i64("screenWidth"),
            screen_height: profile.i64("screenHeight"),
            first_visit: profile.str("firstVisit").to_string(),
            last_visit,
            data: serde_json::from_str(profile.str("data")).unwrap_or(serde_json::Value::Null),
            total_sessions: sessions.i64("totalSessions"),
            total_events: sessions.i64("totalEvents"),
            avg_session_duration: format_duration(sessions.i64("avgSessionDuration")),
        })
    }

    /// Session aggregates grouped by screen resolution, paginated.
    pub async fn screens(&self, filters: &ReportFilters) -> Result<Page> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let spec = QuerySpec::new()
            .alias("se")
            .select("count(DISTINCT se.user_id) AS totalVisitors")
            .select("concat(us.screen_width, 'x', us.screen_height) AS resolution")
            .select("CAST(sum(se.duration) / count(*) AS BIGINT) AS avgSessionTime")
            .select("count(*) AS totalSessions")
            .select("ROUND(sum(se.event_count) * 1.0 / count(*), 1) AS eventsPerSession")
            .select("sum(se.event_count) AS totalEvents")
            .join(&users, "us", &["se.user_id = us.id"])
            .filter("se.started_at >= ?", vec![window.start_str().into()])
            .filter("se.started_at <= ?", vec![window.end_str().into()])
            .filter("us.id IS NOT NULL", vec![])
            .group_by("resolution")
            .order_by("totalVisitors DESC")
            .order_by("resolution DESC");

        let mut page = self
            .page(Source::Sessions, &spec, filters.offset_or_zero())
            .await?;

        format_rows(&mut page.items, &[("avgSessionTime", FieldFormat::Duration)])?;
        Ok(page)
    }

    /// Visitor activity by hour of the visitor's local day: exactly 24
    /// uniformly shaped slots, `00` through `23`.
    pub async fn hourly_stats(&self, filters: &ReportFilters) -> Result<Vec<HourlySlot>> {
        let window = DateWindow::from_filters(filters)?;
        let users = self.store().table(Source::Users);

        let spec = QuerySpec::new()
            .alias("se")
            .select("count(DISTINCT se.user_id) AS totalVisitors")
            .select("strftime(se.local_time, '%H') AS hour")
            .select("CAST(sum(se.duration) / count(*) AS BIGINT) AS avgSessionTime")
            .select("count(*) AS totalSessions")
            .select("ROUND(sum(se.event_count) * 1.0 / count(*), 1) AS eventsPerSession")
            .select("sum(se.event_count) AS totalEvents")
            .join(&users, "us", &["se.user_id = us.id"])
            .filter("se.started_at >= ?", vec![window.start_str().into()])
            .filter("se.started_at <= ?", vec![window.end_str().into()])
            .filter("us.id IS NOT NULL", vec![])
            .filter("se.local_time IS NOT NULL", vec![])
            .group_by("strftime(se.local_time, '%H')")
            .order_by("hour ASC");

        let rows = self.query(Source::Sessions, &spec).await?;
        let mut found: HashMap<u32, HourlySlot> = HashMap::new();
        for row in &rows {
            let hour: u32 = row.str("hour").parse().unwrap_or(0);
            found.insert(
                hour,
                HourlySlot {
                    hour: format!("{hour:02}"),
                    total_visitors: row.i64("totalVisitors"),
                    avg_session_time: format_duration(row.i64("avgSessionTime")),
                    total_sessions: row.i64("totalSessions"),
                    events_per_session: row.f64("eventsPerSession"),
                    total_events: row.i64("totalEvents"),
                },
            );
        }

        Ok(fill_hours(found, HourlySlot::empty))
    }
}
