use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use serde_json::{json, Value};
use tablebite_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str =
    "kD93mf02XplQ84hzR61vNcJw75TbGyAe29sLqVuE40oPiZxK17dSnHfM38rjCtUa";

/// Test harness around the full router, backed by an in-memory SQLite
/// database. Each harness gets its own database.
pub struct TestApp {
    router: Router,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection so every query sees the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth_service: auth_service.clone(),
            services,
        };

        let router = Router::new()
            .nest("/api/v1", tablebite_api::api_v1_routes())
            .nest("/auth", tablebite_api::auth_routes())
            .layer(middleware::from_fn_with_state(
                auth_service,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .layer(middleware::from_fn(
                tablebite_api::middleware_helpers::request_id::request_id_middleware,
            ))
            .with_state(state);

        Self {
            router,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Register a restaurant and log it in, returning its id and a bearer token.
    pub async fn register_restaurant(&self, name: &str, email: &str) -> (Uuid, String) {
        let response = self
            .request(
                Method::POST,
                "/api/v1/restaurants",
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "super-secret-pw",
                    "address": "1 Test Street",
                    "phone": "+1-555-0100",
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        let id = Uuid::parse_str(body["data"]["id"].as_str().expect("restaurant id"))
            .expect("restaurant id is a uuid");

        let response = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({
                    "email": email,
                    "password": "super-secret-pw",
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let token = body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string();

        (id, token)
    }

    /// Create a menu item for a restaurant, returning its id.
    pub async fn seed_menu_item(
        &self,
        token: &str,
        name: &str,
        category: &str,
        price: &str,
    ) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/menu",
                Some(json!({
                    "name": name,
                    "price": price,
                    "category": category,
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        Uuid::parse_str(body["data"]["id"].as_str().expect("menu item id"))
            .expect("menu item id is a uuid")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid json")
}
