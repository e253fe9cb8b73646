use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::require_user;
use crate::state::AppState;

/// Complete router with state, auth middleware and global layers applied
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors_layer(&state.config.security))
        // The configured limit replaces axum's built-in one
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::info::root))
        .route("/semiconductor-info", get(public::info::semiconductor_info))
        .route("/health", get(public::info::health))
        .route("/login", post(public::auth::login))
        .route("/create-user", post(public::auth::create_user))
        .route("/feedback", post(public::feedback::create))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(protected::auth::whoami))
        .route("/visits", get(protected::visits::list).post(protected::visits::create))
        .route("/visits/:id", put(protected::visits::update))
        .route("/opportunities", get(protected::opportunities::list))
        .route("/opportunity", post(protected::opportunities::create))
        .route("/opportunity/:id", put(protected::opportunities::update))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
