pub mod handlers;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use self::handlers::*;

pub use handlers::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(get_health))
        .route("/board", get(get_board))
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{name}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/services/{name}/dependencies", get(list_dependencies))
        .route("/dependencies", post(create_dependency))
        .route("/dependencies/{id}", delete(delete_dependency))
        .route("/update", patch(patch_checks))
        .route("/check", patch(patch_checks))
}

pub fn router(state: AppState) -> Router {
    routes().with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ServiceCatalog;
    use crate::http::middleware::apply_chain;
    use crate::model::{HealthCheck, HealthCheckStatus, Service};
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let catalog = ServiceCatalog::from_store(Arc::new(MemoryStore::default()));
        catalog
            .create(
                Service::new("Auth service")
                    .with_tags(["Prod", "Auth"])
                    .with_checks(vec![
                        HealthCheck::new("Ping https", HealthCheckStatus::Ok),
                        HealthCheck::new("NFS Endpoint", HealthCheckStatus::Ok),
                    ]),
            )
            .await
            .unwrap();
        apply_chain(router(AppState::new(catalog)), 64 * 1024)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_service_patch_scenario() {
        let app = app().await;
        let patch = json!({
            "name": "Auth service",
            "health_checks": [
                {"title": "Ping https", "status": 1},
                {"title": "Unknown Check", "status": 1, "details": "Unknown Check is failing"}
            ]
        });

        let response = app.clone().oneshot(json_request(Method::PATCH, "/update", patch)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["applied"], 1);
        assert_eq!(body["failed_updates"].as_array().unwrap().len(), 1);
        assert_eq!(body["failed_updates"][0]["check_title"], "Unknown Check");

        let response = app
            .oneshot(empty_request(Method::GET, "/services/Auth%20service"))
            .await
            .unwrap();
        let service = body_json(response).await;
        assert_eq!(service["health_checks"][0]["status"], 1);
        assert_eq!(service["health_checks"][1]["status"], 0);
    }

    #[tokio::test]
    async fn test_patch_with_invalid_status_is_rejected() {
        let app = app().await;
        let patch = json!({
            "name": "Auth service",
            "health_checks": [{"title": "Ping https", "status": 9}]
        });

        let response = app.clone().oneshot(json_request(Method::PATCH, "/check", patch)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");

        let response = app
            .oneshot(empty_request(Method::GET, "/services/Auth%20service"))
            .await
            .unwrap();
        let service = body_json(response).await;
        assert_eq!(service["health_checks"][0]["status"], 0);
    }

    #[tokio::test]
    async fn test_patch_unknown_service_is_bad_request() {
        let patch = json!({"name": "Billing", "health_checks": [{"title": "Ping", "status": 0}]});
        let response = app().await.oneshot(json_request(Method::PATCH, "/update", patch)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Billing"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/services")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let app = app().await;

        let created = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/services",
                json!({"name": "NFS share", "status": 1, "tags": ["Prod", "Storage"]}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = body_json(created).await["id"].as_str().unwrap().parse::<i64>().unwrap();
        assert!(id >= 0);

        let duplicate = app
            .clone()
            .oneshot(json_request(Method::POST, "/services", json!({"name": "NFS share"})))
            .await
            .unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let updated = app
            .clone()
            .oneshot(json_request(Method::PUT, "/services/NFS%20share", json!({"status": 2})))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);

        let fetched = body_json(
            app.clone()
                .oneshot(empty_request(Method::GET, "/services/NFS%20share"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(fetched["status"], 2);
        assert_eq!(fetched["tags"], json!(["Prod", "Storage"]));
        assert_eq!(fetched["id"], id);

        let summary = body_json(
            app.clone()
                .oneshot(empty_request(Method::GET, "/services?view=summary"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(summary.as_array().unwrap().len(), 2);
        assert!(summary[0]["health_checks"].as_array().unwrap().is_empty());

        let deleted = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/services/NFS%20share"))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);

        let again = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/services/NFS%20share"))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);

        let missing = app
            .oneshot(json_request(Method::PUT, "/services/NFS%20share", json!({"status": 0})))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dependency_endpoints() {
        let app = app().await;
        let created = app
            .clone()
            .oneshot(json_request(Method::POST, "/services", json!({"name": "NFS share"})))
            .await
            .unwrap();
        let child = body_json(created).await["id"].as_str().unwrap().parse::<i64>().unwrap();

        let edge = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/dependencies",
                json!({"parent_id": 1, "child_id": child}),
            ))
            .await
            .unwrap();
        assert_eq!(edge.status(), StatusCode::CREATED);
        let edge_id = body_json(edge).await["id"].as_str().unwrap().to_string();

        let listed = body_json(
            app.clone()
                .oneshot(empty_request(Method::GET, "/services/NFS%20share/dependencies"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(listed[0]["child_id"], child);

        let removed = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &format!("/dependencies/{}", edge_id)))
            .await
            .unwrap();
        assert_eq!(removed.status(), StatusCode::OK);

        let removed_again = app
            .oneshot(empty_request(Method::DELETE, &format!("/dependencies/{}", edge_id)))
            .await
            .unwrap();
        assert_eq!(removed_again.status(), StatusCode::NOT_FOUND);
    }

    async fn assert_problem(response: Response, status: StatusCode) -> Value {
        assert_eq!(response.status(), status);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");
        body_json(response).await
    }

    #[tokio::test]
    async fn test_rejections_are_problem_json() {
        let app = app().await;

        let bad_id = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/dependencies/abc"))
            .await
            .unwrap();
        let body = assert_problem(bad_id, StatusCode::BAD_REQUEST).await;
        assert!(body["error"].as_str().unwrap().contains("abc"));

        let bad_query = app
            .clone()
            .oneshot(empty_request(Method::GET, "/services?view=a&view=b"))
            .await
            .unwrap();
        assert_problem(bad_query, StatusCode::BAD_REQUEST).await;

        let oversized = app
            .oneshot(json_request(
                Method::POST,
                "/services",
                json!({ "name": "x".repeat(128 * 1024) }),
            ))
            .await
            .unwrap();
        let body = assert_problem(oversized, StatusCode::PAYLOAD_TOO_LARGE).await;
        assert_eq!(body["error"], "request body too large");
    }

    #[tokio::test]
    async fn test_dependency_on_unknown_service_is_not_found() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/dependencies",
                json!({"parent_id": 1, "child_id": 9999}),
            ))
            .await
            .unwrap();
        let body = assert_problem(response, StatusCode::NOT_FOUND).await;
        assert!(body["error"].as_str().unwrap().contains("9999"));

        let listed = body_json(
            app.oneshot(empty_request(Method::GET, "/services/Auth%20service/dependencies"))
                .await
                .unwrap(),
        )
        .await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_board_lists_summaries() {
        let response = app().await.oneshot(empty_request(Method::GET, "/board")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let board = body_json(response).await;
        assert_eq!(board[0]["name"], "Auth service");
        assert!(board[0]["health_checks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app().await.oneshot(empty_request(Method::GET, "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
