use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Offline parsing
        .route("/api/extract", post(handlers::actions::extract))
        // Device routes
        .route("/api/devices", get(handlers::devices::list_devices).post(handlers::devices::create_device))
        .route("/api/devices/:name", get(handlers::devices::get_device).delete(handlers::devices::delete_device))
        .route("/api/devices/:name/config", get(handlers::devices::get_device_config))
        .route("/api/devices/:name/acl-mappings", get(handlers::devices::list_acl_mappings))
        .route("/api/devices/:name/acl-alias-mapping", post(handlers::actions::acl_alias_mapping))
        // Inventory routes
        .route("/api/qos", get(handlers::inventory::list_qos_services).post(handlers::inventory::create_qos_service))
        .route("/api/qos/:id", axum::routing::delete(handlers::inventory::delete_qos_service))
        .route("/api/locations", get(handlers::inventory::list_locations).post(handlers::inventory::create_location))
        .route("/api/locations/:device", axum::routing::delete(handlers::inventory::delete_location))
        .route("/api/id-pools", get(handlers::inventory::list_id_pools).post(handlers::inventory::create_id_pool))
        .route("/api/id-pools/:name/allocations", get(handlers::inventory::list_id_allocations))
        // Service routes
        .route("/api/services/l2vpn", get(handlers::services::list_l2vpn))
        .route(
            "/api/services/l2vpn/:id",
            get(handlers::services::get_l2vpn)
                .put(handlers::services::put_l2vpn)
                .delete(handlers::services::delete_l2vpn),
        )
        .route("/api/services/access", get(handlers::services::list_access))
        .route(
            "/api/services/access/:customer",
            get(handlers::services::get_access)
                .put(handlers::services::put_access)
                .delete(handlers::services::delete_access),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Store;
    use crate::parsers::name_port::tests::IOS_TCP_PORT_HELP;
    use crate::services::access::AccessCallback;
    use crate::services::acl_alias_mapping::tests::ScriptedRunner;
    use crate::services::template::TemplateEngine;

    async fn test_app() -> Router {
        app_with_runner(ScriptedRunner::ok(IOS_TCP_PORT_HELP)).await
    }

    async fn app_with_runner(runner: ScriptedRunner) -> Router {
        let state = Arc::new(AppState {
            store: Store::in_memory().await.unwrap(),
            config: Config::load(),
            templates: TemplateEngine::builtin().unwrap(),
            runner: Arc::new(runner),
            access: AccessCallback::new("vlans"),
        });
        build(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let app = test_app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/extract")
            .body(Body::from("  bgp   Border Gateway Protocol (179)\n  cmd   Remote commands (rcmd, 514)"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"179": "bgp", "514": "cmd"}));
    }

    #[tokio::test]
    async fn test_acl_alias_mapping_action() {
        let app = test_app().await;
        let (status, _) = send(&app, "POST", "/api/devices/ce0/acl-alias-mapping", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/api/devices",
            Some(serde_json::json!({"name": "ce0", "address": "127.0.0.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "POST", "/api/devices/ce0/acl-alias-mapping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["acl_mapping"].as_array().map(Vec::len), Some(35));

        let (status, body) = send(&app, "GET", "/api/devices/ce0/acl-mappings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["port"], 7);
        assert_eq!(body[0]["protocol"], "echo");
    }

    #[tokio::test]
    async fn test_acl_alias_mapping_device_failure() {
        let app = app_with_runner(ScriptedRunner::failing("connection refused")).await;
        send(
            &app,
            "POST",
            "/api/devices",
            Some(serde_json::json!({"name": "ce0", "address": "127.0.0.1"})),
        )
        .await;

        let (status, body) = send(&app, "POST", "/api/devices/ce0/acl-alias-mapping", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap_or_default().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_l2vpn_lifecycle() {
        let app = test_app().await;
        let service = serde_json::to_value(crate::services::l2vpn::tests::sample_service()).unwrap();

        let (status, body) = send(&app, "PUT", "/api/services/l2vpn/42", Some(service.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap_or_default().contains("gold"));

        let (status, _) = send(
            &app,
            "POST",
            "/api/qos",
            Some(serde_json::json!({"id": "gold", "policy_name": "GOLD-IN"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "PUT", "/api/services/l2vpn/42", Some(service)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configs"].as_array().map(Vec::len), Some(2));

        let (_, configs) = send(&app, "GET", "/api/devices/pe1/config", None).await;
        assert_eq!(configs.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, "DELETE", "/api/services/l2vpn/42", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", "/api/services/l2vpn/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_access_lifecycle() {
        let app = test_app().await;
        send(&app, "POST", "/api/id-pools", Some(serde_json::json!({"name": "vlans", "range_start": 300, "range_end": 310}))).await;
        send(&app, "POST", "/api/locations", Some(serde_json::json!({"device": "sw0", "address": "Lab 2"}))).await;

        let service = serde_json::json!({
            "customer": "ignored",
            "device": "sw0",
            "access_ge_interface": "0/1",
            "trunk_ge_interface": "0/24",
        });
        let (status, body) = send(&app, "PUT", "/api/services/access/acme", Some(service)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"]["customer"], "acme");
        assert_eq!(body["service"]["vlan"], 300);

        let (_, allocations) = send(&app, "GET", "/api/id-pools/vlans/allocations", None).await;
        assert_eq!(allocations[0]["owner"], "/access-python[customer='acme']");

        let (status, _) = send(&app, "DELETE", "/api/services/access/acme", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, allocations) = send(&app, "GET", "/api/id-pools/vlans/allocations", None).await;
        assert_eq!(allocations.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let app = test_app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/devices",
            Some(serde_json::json!({"name": "bad name", "address": "127.0.0.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
