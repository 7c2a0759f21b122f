use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::api::models::api_keys::{ApiKeyDraft, ApiKeyStatus};
use crate::charts::ChartKind;
use crate::client::MonitoringApi;
use crate::errors::Error;
use crate::http::MockHttpClient;

fn build_console(
    mock: &MockHttpClient,
    fragment: Option<&str>,
) -> (ViewModel<MockHttpClient>, MemoryFragment) {
    let store = MemoryFragment::new(fragment);
    let client = AdminClient::new(Arc::new(mock.clone()), MonitoringApi::Observation);
    let view_model = ViewModel::builder(client, Arc::new(MemorySurface::with_monitoring_mounts()))
        .fragment_store(Arc::new(store.clone()))
        .build();
    (view_model, store)
}

fn projects_json() -> serde_json::Value {
    json!([
        {"id": "p1", "name": "Payments", "status": "ACTIVE", "createdAt": "2024-03-01 09:00:00"},
        {"id": "p2", "name": "Search", "status": "INACTIVE"}
    ])
}

fn api_keys_json() -> serde_json::Value {
    json!([
        {"id": "k1", "apiKeyValue": "ak_1", "description": "ci", "status": "ACTIVE"},
        {"id": "k2", "apiKeyValue": "ak_2", "description": "old", "status": "REVOKED"}
    ])
}

fn instances_json() -> serde_json::Value {
    json!([
        {"businessId": "biz_a", "projectName": "Payments", "apiType": "MODEL", "status": "ACTIVE"},
        {"businessId": "biz_b", "projectName": "Search", "apiType": "REST", "status": "MAINTENANCE"}
    ])
}

fn script_monitoring(mock: &MockHttpClient) {
    mock.add_envelope(
        "GET /admin/observation/overview",
        200,
        json!({
            "totalInstances": 2,
            "healthyInstances": 1,
            "totalCallCount": 1500,
            "averageSuccessRate": 96.5
        }),
    );
    mock.add_envelope(
        "GET /admin/observation/instances",
        200,
        json!([{
            "businessId": "biz_a",
            "gatewayStatus": "HEALTHY",
            "successRate": 99.1,
            "callCount": 1200
        }]),
    );
    mock.add_envelope(
        "GET /admin/monitoring/timeseries",
        200,
        json!({
            "callVolume": [{"time": "10:00", "value": 12.0}],
            "successRate": [{"time": "10:00", "value": 99.0}],
            "latency": [{"time": "10:00", "value": 240.0}]
        }),
    );
}

#[tokio::test]
async fn fragment_selects_initial_view() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());

    let (console, fragment) = build_console(&mock, Some("#apikeys"));
    console.initialize().await;

    assert_eq!(console.active_menu(), Menu::ApiKeys);
    assert_eq!(console.snapshot().api_keys.len(), 2);
    assert_eq!(fragment.read().as_deref(), Some("#apikeys"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn unknown_fragment_falls_back_to_dashboard() {
    let mock = MockHttpClient::new();
    let (console, fragment) = build_console(&mock, Some("#bogus"));
    console.initialize().await;

    assert_eq!(console.active_menu(), Menu::Dashboard);
    assert_eq!(fragment.read().as_deref(), Some("#bogus"));
}

#[tokio::test]
async fn missing_fragment_is_written() {
    let mock = MockHttpClient::new();
    let (console, fragment) = build_console(&mock, None);
    console.initialize().await;

    assert_eq!(console.active_menu(), Menu::Dashboard);
    assert_eq!(fragment.read().as_deref(), Some("#dashboard"));
}

#[test_log::test(tokio::test)]
async fn dashboard_counts_active_keys() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("GET /admin/instances/with-projects", 200, instances_json());

    let (console, _) = build_console(&mock, Some("#dashboard"));
    console.initialize().await;

    let state = console.snapshot();
    assert_eq!(
        state.dashboard_stats,
        DashboardStats {
            total_projects: 2,
            total_api_keys: 1,
            total_instances: 2
        }
    );
    assert!(console.take_notices().is_empty());
}

#[tokio::test]
async fn dashboard_failure_keeps_partial_data() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 500, json!(null));
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("GET /admin/instances/with-projects", 200, instances_json());

    let (console, _) = build_console(&mock, None);
    assert!(console.load_dashboard().await.is_err());

    let state = console.snapshot();
    assert_eq!(state.dashboard_stats, DashboardStats::default());
    assert_eq!(state.api_keys.len(), 2);
    assert_eq!(state.projects[0].id, "proj_001");

    let messages: Vec<_> = console.take_notices().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, vec!["Failed to load projects", "Failed to load dashboard data"]);
}

#[tokio::test]
async fn failed_project_fetch_uses_fallback() {
    let mock = MockHttpClient::new();
    let (console, _) = build_console(&mock, None);

    let result = console.load_projects().await;
    assert!(result.is_err());

    let state = console.snapshot();
    assert!(!state.project_loading());
    let ids: Vec<_> = state.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["proj_001", "proj_002"]);

    let notices = console.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn backend_message_reaches_notice() {
    let mock = MockHttpClient::new();
    mock.add_response(
        "GET /admin/apikeys",
        Ok(crate::http::HttpResponse {
            status: 200,
            body: json!({"code": 403, "message": "Admin access required", "data": null})
                .to_string(),
        }),
    );

    let (console, _) = build_console(&mock, None);
    assert!(matches!(console.load_api_keys().await, Err(Error::Backend { code: 403, .. })));
    assert_eq!(console.take_notices()[0].message, "Admin access required");
    assert_eq!(console.snapshot().api_keys.len(), 2);
}

#[tokio::test]
async fn empty_fallback_leaves_lists_empty() {
    let mock = MockHttpClient::new();
    let client = AdminClient::new(Arc::new(mock.clone()), MonitoringApi::Observation);
    let console = ViewModel::builder(client, Arc::new(MemorySurface::new()))
        .fallback(Arc::new(crate::fallback::EmptyFallback))
        .build();

    assert!(console.load_instances().await.is_err());
    assert!(console.snapshot().instances.is_empty());
}

#[tokio::test]
async fn failed_creation_keeps_dialog_and_list() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("POST /admin/apikeys", 500, json!(null));

    let (console, _) = build_console(&mock, None);
    console.load_api_keys().await.unwrap();
    let before = console.snapshot().api_keys;

    console.show_create_api_key_dialog();
    console.set_new_api_key(ApiKeyDraft {
        description: "nightly export".to_string(),
        expires_at: None,
    });
    assert!(console.create_api_key().await.is_err());

    let state = console.snapshot();
    assert!(state.create_dialog_open);
    assert_eq!(state.api_keys, before);
    assert_eq!(mock.calls_for("GET /admin/apikeys"), 1);
    assert_eq!(console.take_notices()[0].message, "Failed to create API key");
}

#[tokio::test]
async fn blank_description_is_rejected_locally() {
    let mock = MockHttpClient::new();
    let (console, _) = build_console(&mock, None);

    console.show_create_api_key_dialog();
    assert!(matches!(console.create_api_key().await, Err(Error::Validation { .. })));
    assert_eq!(mock.call_count(), 0);
    assert_eq!(console.take_notices()[0].message, "Please enter an API key description");
}

#[tokio::test]
async fn successful_creation_closes_dialog_and_reloads() {
    let mock = MockHttpClient::new();
    mock.add_envelope("POST /admin/apikeys", 200, json!({"id": "k3"}));
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());

    let (console, _) = build_console(&mock, None);
    console.show_create_api_key_dialog();
    console.set_new_api_key(ApiKeyDraft {
        description: "  reporting ".to_string(),
        expires_at: crate::api::models::parse_timestamp("2025-01-31 00:00:00"),
    });
    console.create_api_key().await.unwrap();

    let state = console.snapshot();
    assert!(!state.create_dialog_open);
    assert_eq!(state.api_keys.len(), 2);

    let post = &mock.get_calls()[0];
    assert_eq!(
        post.body,
        Some(json!({"description": "reporting", "expiresAt": "2025-01-31 00:00:00"}))
    );
    assert_eq!(console.take_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn edit_and_toggle_api_key() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("PUT /admin/apikeys/k1", 200, json!(null));
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("PUT /admin/apikeys/k1/status", 200, json!(null));
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());

    let (console, _) = build_console(&mock, None);
    console.load_api_keys().await.unwrap();
    let key = console.snapshot().api_keys[0].clone();

    console.edit_api_key(&key);
    let state = console.snapshot();
    assert!(state.edit_dialog_open);
    assert_eq!(state.editing_api_key.draft.description, "ci");

    console.set_editing_draft(ApiKeyDraft {
        description: "ci runners".to_string(),
        expires_at: None,
    });
    console.update_api_key().await.unwrap();
    assert!(!console.snapshot().edit_dialog_open);

    assert_eq!(key.status, ApiKeyStatus::Active);
    console.toggle_api_key_status(&key).await.unwrap();

    let calls = mock.get_calls();
    assert_eq!(calls[1].body, Some(json!({"description": "ci runners"})));
    assert_eq!(calls[3].body, Some(json!({"status": "REVOKED"})));
    assert_eq!(mock.calls_for("GET /admin/apikeys"), 3);
}

#[tokio::test]
async fn failed_delete_reports_without_reload() {
    let mock = MockHttpClient::new();
    mock.add_envelope("DELETE /admin/projects/p1", 409, json!(null));
    mock.add_envelope("DELETE /admin/apikeys/k1", 200, json!(null));
    mock.add_envelope("GET /admin/apikeys", 200, json!([]));

    let (console, _) = build_console(&mock, None);
    assert!(console.delete_project("p1").await.is_err());
    assert_eq!(mock.calls_for("GET /admin/projects"), 0);

    console.delete_api_key("k1").await.unwrap();
    assert_eq!(mock.calls_for("GET /admin/apikeys"), 1);

    let levels: Vec<_> = console.take_notices().into_iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
}

#[tokio::test(start_paused = true)]
async fn superseded_response_is_discarded() {
    let mock = MockHttpClient::new();
    mock.add_delayed_envelope(
        "GET /admin/projects",
        Duration::from_secs(2),
        200,
        json!([{"id": "old", "name": "Old"}]),
    );
    mock.add_envelope("GET /admin/projects", 200, json!([{"id": "new", "name": "New"}]));

    let (console, _) = build_console(&mock, None);
    let (slow, fast) = futures::join!(console.load_projects(), console.load_projects());

    assert!(!slow.unwrap());
    assert!(fast.unwrap());
    let state = console.snapshot();
    assert_eq!(state.projects[0].id, "new");
    assert!(!state.project_loading());
}

#[tokio::test(start_paused = true)]
async fn navigation_discards_in_flight_loads() {
    let mock = MockHttpClient::new();
    mock.add_delayed_envelope("GET /admin/projects", Duration::from_secs(1), 200, projects_json());
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());

    let (console, fragment) = build_console(&mock, Some("#projects"));
    let background = console.clone();
    let pending = tokio::spawn(async move { background.initialize().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(console.snapshot().project_loading());

    console.select_menu(Menu::ApiKeys).await;
    pending.await.unwrap();

    let state = console.snapshot();
    assert_eq!(state.active_menu(), Menu::ApiKeys);
    assert!(state.projects.is_empty());
    assert!(!state.project_loading());
    assert_eq!(state.api_keys.len(), 2);
    assert_eq!(fragment.read().as_deref(), Some("#apikeys"));
}

#[tokio::test(start_paused = true)]
async fn navigation_during_dashboard_load_skips_counters() {
    let mock = MockHttpClient::new();
    mock.add_delayed_envelope("GET /admin/projects", Duration::from_secs(1), 200, projects_json());
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    mock.add_envelope("GET /admin/instances/with-projects", 200, instances_json());
    mock.add_envelope("GET /admin/projects", 200, projects_json());

    let (console, _) = build_console(&mock, Some("#dashboard"));
    let background = console.clone();
    let pending = tokio::spawn(async move { background.initialize().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    console.select_menu(Menu::Projects).await;
    pending.await.unwrap();

    let state = console.snapshot();
    assert_eq!(state.active_menu(), Menu::Projects);
    assert_eq!(state.projects.len(), 2);
    assert_eq!(state.dashboard_stats, DashboardStats::default());
    assert!(console.take_notices().is_empty());
    assert_eq!(mock.calls_for("GET /admin/projects"), 2);
}

#[tokio::test]
async fn select_menu_clears_previous_view() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());
    mock.add_envelope("GET /admin/instances/with-projects", 200, instances_json());
    mock.add_envelope("GET /admin/projects/simple", 200, json!([{"id": "p1", "name": "Payments"}]));

    let (console, _) = build_console(&mock, Some("#projects"));
    console.initialize().await;
    assert_eq!(console.snapshot().projects.len(), 2);

    console.set_instance_filter(crate::api::models::instances::InstanceFilter {
        project_id: Some("p1".to_string()),
        status: None,
    });
    console.select_menu(Menu::Instances).await;

    let state = console.snapshot();
    assert!(state.projects.is_empty());
    assert_eq!(state.instances.len(), 2);
    assert_eq!(state.project_options.len(), 1);

    let instance_call = mock
        .get_calls()
        .into_iter()
        .find(|call| call.path == "/admin/instances/with-projects")
        .unwrap();
    assert_eq!(instance_call.query, vec![("projectId", "p1".to_string())]);
}

#[tokio::test]
async fn fragment_change_loads_only_on_new_menu() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());

    let (console, fragment) = build_console(&mock, Some("#projects"));
    console.initialize().await;

    fragment.set("#projects");
    console.handle_fragment_change().await;
    assert_eq!(mock.calls_for("GET /admin/projects"), 1);

    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());
    fragment.set("#apikeys");
    console.handle_fragment_change().await;

    let state = console.snapshot();
    assert_eq!(state.active_menu(), Menu::ApiKeys);
    assert_eq!(state.api_keys.len(), 2);
    // Back/forward keeps the previous view's data until it is replaced
    assert_eq!(state.projects.len(), 2);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn monitoring_view_polls_and_draws_charts() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());
    script_monitoring(&mock);

    let (console, _) = build_console(&mock, Some("monitoring"));
    console.initialize().await;

    assert!(console.auto_refresh_running());
    let state = console.snapshot();
    assert_eq!(state.observation_overview.total_call_count, 1500);
    assert_eq!(state.observation_instances[0].recent_calls, Some(1200));
    assert!(state.last_refreshed_at.is_some());

    let surface = console.chart_surface();
    for kind in ChartKind::ALL {
        assert!(surface.option(kind.mount()).is_some());
    }

    let series_call = mock
        .get_calls()
        .into_iter()
        .find(|call| call.path == "/admin/monitoring/timeseries")
        .unwrap();
    assert_eq!(series_call.query, vec![("timeRange", "24h".to_string())]);

    script_monitoring(&mock);
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(mock.calls_for("GET /admin/observation/overview"), 2);
    assert_eq!(mock.calls_for("GET /admin/projects"), 1);

    console.teardown();
    assert!(!console.auto_refresh_running());
    assert_eq!(surface.chart_count(), 0);
}

#[tokio::test]
async fn failed_series_redraws_charts_from_fallback() {
    let mock = MockHttpClient::new();
    script_monitoring(&mock);
    mock.add_envelope("GET /admin/observation/overview", 200, json!({"totalInstances": 2}));
    mock.add_envelope("GET /admin/observation/instances", 200, json!([]));
    mock.add_envelope("GET /admin/monitoring/timeseries", 500, json!(null));

    let (console, _) = build_console(&mock, None);
    console.load_monitoring().await.unwrap();

    let surface = console.chart_surface();
    let mount = ChartKind::CallVolume.mount();
    let drawn = surface.option(mount).unwrap();
    assert_eq!(drawn["series"][0]["data"], json!([12.0]));

    assert!(console.load_monitoring().await.is_err());

    assert!(console.snapshot().time_series.is_empty());
    let redrawn = surface.option(mount).unwrap();
    assert_eq!(redrawn["series"][0]["data"], json!([]));
    assert_eq!(surface.chart_count(), ChartKind::ALL.len());
}

#[tokio::test(start_paused = true)]
async fn unpausing_on_monitoring_refreshes_at_once() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());
    script_monitoring(&mock);

    let (console, _) = build_console(&mock, Some("#monitoring"));
    console.initialize().await;

    assert!(console.toggle_auto_refresh().await);
    assert!(console.snapshot().auto_refresh_paused);
    assert_eq!(mock.calls_for("GET /admin/observation/instances"), 1);

    script_monitoring(&mock);
    assert!(!console.toggle_auto_refresh().await);
    assert_eq!(mock.calls_for("GET /admin/observation/instances"), 2);
}

#[tokio::test(start_paused = true)]
async fn leaving_monitoring_stops_refresh() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());
    script_monitoring(&mock);
    mock.add_envelope("GET /admin/apikeys", 200, api_keys_json());

    let (console, _) = build_console(&mock, Some("#monitoring"));
    console.initialize().await;
    assert!(console.auto_refresh_running());

    console.select_menu(Menu::ApiKeys).await;
    assert!(!console.auto_refresh_running());

    tokio::time::sleep(Duration::from_secs(180)).await;
    assert_eq!(mock.calls_for("GET /admin/observation/overview"), 1);
}

#[tokio::test]
async fn notices_are_bounded_and_changes_are_published() {
    let mock = MockHttpClient::new();
    let (console, _) = build_console(&mock, None);
    let changes = console.subscribe();
    let start = *changes.borrow();

    for _ in 0..(MAX_NOTICES + 5) {
        let _ = console.load_projects().await;
    }

    assert!(*changes.borrow() > start);
    assert_eq!(console.take_notices().len(), MAX_NOTICES);
    assert!(console.take_notices().is_empty());
}

#[tokio::test]
async fn project_search_filters_loaded_projects() {
    let mock = MockHttpClient::new();
    mock.add_envelope("GET /admin/projects", 200, projects_json());

    let (console, _) = build_console(&mock, None);
    console.load_projects().await.unwrap();
    console.set_project_search("pay");

    let names = console.read(|view| {
        view.filtered_projects()
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>()
    });
    assert_eq!(names, vec!["Payments"]);
}
