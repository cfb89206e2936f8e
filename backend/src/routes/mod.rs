//! Route definitions for the Bloom Monitor API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Bloom lookups
        .nest("/api/bloom", bloom_routes())
        // User management
        .nest("/users", user_routes())
}

/// Bloom lookup routes
fn bloom_routes() -> Router<AppState> {
    Router::new()
        .route("/location", get(handlers::get_bloom_by_location))
        .route("/area", get(handlers::get_bloom_by_area))
        .route("/point", get(handlers::get_bloom_by_point))
        .route("/states", get(handlers::list_states))
}

/// User CRUD routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:id",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
}

#[cfg(test)]
mod tests {
    use crate::create_app;
    use crate::test_support::{test_state, unreachable_url};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(test_state(&unreachable_url()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_email() {
        let (status, body) = send(json_request(
            Method::POST,
            "/users",
            serde_json::json!({ "name": "Ana", "email": "nope", "password": "segredo" }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_user_rejects_missing_fields() {
        let (status, body) = send(json_request(
            Method::POST,
            "/users",
            serde_json::json!({ "name": "Ana" }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_users_rejects_oversized_limit() {
        let (status, body) = send(
            Request::builder()
                .uri("/users?limit=500")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_users_rejects_unknown_sort_field() {
        let (status, _) = send(
            Request::builder()
                .uri("/users?field=password_hash")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_id_must_be_uuid() {
        let (status, body) = send(
            Request::builder()
                .uri("/users/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_user_rejects_empty_name() {
        let (status, _) = send(json_request(
            Method::PATCH,
            "/users/6f1c2a8e-2b7d-4c1e-9f3a-0d5b8e7c4a21",
            serde_json::json!({ "name": "" }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = send(
            Request::builder()
                .uri("/api/bloom/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
