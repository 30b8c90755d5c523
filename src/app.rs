use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Passwords;
use crate::config::{AppConfig, SchoolConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::basic_auth_middleware;
use crate::services::{CourseService, ProgramService, UserService};

/// Shared state handed to every handler and to the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub passwords: Passwords,
    pub users: UserService,
    pub courses: CourseService,
    pub programs: ProgramService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, passwords: Passwords, rules: SchoolConfig) -> Self {
        Self {
            users: UserService::new(store.clone(), passwords.clone(), rules),
            courses: CourseService::new(store.clone()),
            programs: ProgramService::new(store.clone()),
            store,
            passwords,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let auth = from_fn_with_state(state.clone(), basic_auth_middleware);

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Users
        .route(
            "/api/users",
            get(protected::user_whoami)
                .route_layer(auth.clone())
                .post(public::user_register),
        )
        .route("/api/users/:id", put(protected::user_update).route_layer(auth.clone()))
        // Courses: reads are public, writes need an owner
        .route(
            "/api/courses",
            post(protected::course_create)
                .route_layer(auth.clone())
                .get(public::course_list),
        )
        .route(
            "/api/courses/:id",
            put(protected::course_update)
                .delete(protected::course_delete)
                .route_layer(auth.clone())
                .get(public::course_get),
        )
        // Programs
        .route(
            "/api/programs",
            get(protected::program_list)
                .post(protected::program_create)
                .route_layer(auth.clone()),
        )
        .route(
            "/api/programs/:id",
            get(protected::program_get)
                .put(protected::program_update)
                .route_layer(auth),
        )
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };
    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the School Database REST API project!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route Not Found" })))
}
