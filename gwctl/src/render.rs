//! Plain-text rendering of the console views, used by the terminal host.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::format::{
    MISSING, calculate_qps, format_cost, format_latency, format_number, format_percentage,
    format_relative_time, format_timestamp,
};
use crate::navigation::Menu;
use crate::status::{SeverityThresholds, StatusDisplay};
use crate::view_model::{Notice, NoticeLevel, ViewState};

/// Left-aligned table with columns sized to their widest cell.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(headers.to_vec());
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("(no data)\n");
    }
    out
}

fn loading_marker(loading: bool) -> &'static str {
    if loading { " (loading...)" } else { "" }
}

fn header(active: Menu) -> String {
    Menu::ALL
        .iter()
        .map(|menu| {
            if *menu == active {
                format!("[{}]", menu.title())
            } else {
                menu.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn dashboard(state: &ViewState) -> String {
    let stats = state.dashboard_stats;
    format!(
        "Projects: {}\nActive API keys: {}\nInstances: {}\n",
        stats.total_projects, stats.total_api_keys, stats.total_instances
    )
}

fn projects(state: &ViewState) -> String {
    let rows = state
        .filtered_projects()
        .into_iter()
        .map(|project| {
            vec![
                project.id.clone(),
                project.name.clone(),
                project.status.label().to_string(),
                format_timestamp(project.created_at),
            ]
        })
        .collect();
    table(&["ID", "NAME", "STATUS", "CREATED"], rows)
}

fn api_keys(state: &ViewState) -> String {
    let rows = state
        .api_keys
        .iter()
        .map(|key| {
            vec![
                key.id.clone(),
                key.api_key_value.clone(),
                key.description.clone().unwrap_or_else(|| MISSING.to_string()),
                key.status.label().to_string(),
                format_timestamp(key.expires_at),
                format_timestamp(key.last_used_at),
            ]
        })
        .collect();
    table(&["ID", "KEY", "DESCRIPTION", "STATUS", "EXPIRES", "LAST USED"], rows)
}

fn instances(state: &ViewState) -> String {
    let rows = state
        .instances
        .iter()
        .map(|instance| {
            vec![
                instance.business_id.clone(),
                instance.project_name.clone().unwrap_or_else(|| MISSING.to_string()),
                instance.api_type.clone(),
                instance.status.label().to_string(),
            ]
        })
        .collect();
    table(&["BUSINESS ID", "PROJECT", "TYPE", "STATUS"], rows)
}

fn monitoring(state: &ViewState, thresholds: &SeverityThresholds, now: NaiveDateTime) -> String {
    let overview = &state.observation_overview;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Window {}  Instances {} (healthy {}, faulty {}, circuit open {})  \
         Calls {}  Success {}  Latency {}",
        state.observation_filter.time_window.as_str(),
        overview.total_instances,
        overview.healthy_instances,
        overview.faulty_instances,
        overview.circuit_breaker_instances,
        format_number(Some(overview.total_call_count)),
        format_percentage(Some(overview.average_success_rate)),
        format_latency(Some(overview.average_latency)),
    );
    if state.auto_refresh_paused {
        out.push_str("Auto-refresh paused\n");
    }
    out.push('\n');

    let rows = state
        .sorted_observation_instances()
        .into_iter()
        .map(|row| {
            vec![
                row.business_id.clone(),
                row.project_name.clone().unwrap_or_else(|| MISSING.to_string()),
                row.gateway_status.label().to_string(),
                format_percentage(row.success_rate),
                format_latency(row.average_latency),
                format_number(row.recent_calls),
                calculate_qps(row.recent_calls).to_string(),
                format_cost(row.cost_per_unit),
                format_relative_time(row.last_reported_at, now),
                thresholds.classify_instance(row).css_class().to_string(),
            ]
        })
        .collect();
    out.push_str(&table(
        &[
            "BUSINESS ID",
            "PROJECT",
            "GATEWAY",
            "SUCCESS",
            "LATENCY",
            "CALLS",
            "QPS",
            "COST",
            "LAST ACTIVE",
            "HEALTH",
        ],
        rows,
    ));

    let series = &state.time_series;
    let _ = writeln!(
        out,
        "\nCharts ({}): {} call-volume, {} success-rate, {} latency points",
        state.time_range.as_str(),
        series.call_volume.len(),
        series.success_rate.len(),
        series.latency.len()
    );
    out
}

/// Render the active view.
pub fn render_view(
    state: &ViewState,
    thresholds: &SeverityThresholds,
    now: NaiveDateTime,
) -> String {
    let menu = state.active_menu();
    let (body, loading) = match menu {
        Menu::Dashboard => (dashboard(state), false),
        Menu::Projects => (projects(state), state.project_loading()),
        Menu::ApiKeys => (api_keys(state), state.api_key_loading()),
        Menu::Instances => (instances(state), state.instance_loading()),
        Menu::Monitoring => (monitoring(state, thresholds, now), state.observation_loading()),
    };

    format!("{}\n\n{}{}\n{}", header(menu), menu.title(), loading_marker(loading), body)
}

pub fn render_notice(notice: &Notice) -> String {
    let level = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{level}] {}", notice.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FallbackData, StaticFallback};
    use crate::navigation::NavigationState;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn table_pads_columns() {
        let out = table(&["A", "B"], vec![vec!["long value".to_string(), "x".to_string()]]);
        assert_eq!(out, "A           B\nlong value  x\n");
        assert!(table(&["A"], Vec::new()).contains("(no data)"));
    }

    #[test]
    fn projects_view_lists_fallback_projects() {
        let mut state = ViewState::default();
        state.navigation = NavigationState::new(Menu::Projects);
        state.projects = StaticFallback.projects();
        let out = render_view(&state, &SeverityThresholds::default(), now());
        assert!(out.starts_with("Dashboard | [Projects]"));
        assert!(out.contains("proj_002  Test Project  Inactive"));
        assert!(out.contains("2024-01-15 10:00:00"));
    }

    #[test]
    fn monitoring_view_formats_rows() {
        let mut state = ViewState::default();
        state.navigation = NavigationState::new(Menu::Monitoring);
        state.observation_instances = vec![crate::api::models::monitoring::InstanceMetrics {
            business_id: "biz_001".to_string(),
            success_rate: Some(97.26),
            average_latency: Some(1500.0),
            recent_calls: Some(1200),
            last_reported_at: Some(now() - chrono::Duration::minutes(5)),
            ..Default::default()
        }];

        let out = render_view(&state, &SeverityThresholds::default(), now());
        assert!(out.contains("97.3%"));
        assert!(out.contains("1.5s"));
        assert!(out.contains("1,200"));
        assert!(out.contains("5 minutes ago"));
        assert!(out.contains("warning"));
    }

    #[test]
    fn notices_are_tagged() {
        assert_eq!(render_notice(&Notice::error("boom")), "[error] boom");
        assert_eq!(render_notice(&Notice::success("done")), "[ok] done");
    }
}
