use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use chronal_auth::user_routes;

use crate::{
    handlers::{
        access::{
            get_access, grant_access, list_all_access, list_calendar_access, my_access,
            revoke_access, update_access, user_access,
        },
        calendars::{
            create_calendar, delete_calendar, get_calendar, list_calendars, my_calendars,
            update_calendar,
        },
        health::{livez, readyz, root},
        users::{get_user, list_users},
    },
    state::AppState,
};

/// CORS for the API. An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::error!("No valid CORS origins configured, cross-origin requests will be refused");
    }

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        // Account routes live in chronal_auth and run on its own state
        .merge(user_routes().with_state::<AppState>(state.auth.clone()))
        // User routes
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        // Calendar routes
        .route("/calendars", get(list_calendars).post(create_calendar))
        .route("/calendars/me", get(my_calendars))
        .route(
            "/calendars/{id}",
            get(get_calendar)
                .patch(update_calendar)
                .delete(delete_calendar),
        )
        // Access routes scoped to a calendar
        .route(
            "/calendars/{id}/access",
            get(list_calendar_access).post(grant_access),
        )
        .route(
            "/calendars/{id}/access/{access_id}",
            axum::routing::patch(update_access).delete(revoke_access),
        )
        // Access routes across calendars
        .route("/calendars-access", get(list_all_access))
        .route("/calendars-access/me", get(my_access))
        .route("/calendars-access/user/{user_id}", get(user_access))
        .route("/calendars-access/{access_id}", get(get_access))
        .layer(cors_layer(&state.config.cors_allow_origins));

    let router = Router::new()
        .route("/", get(root))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz));

    let prefix = state.config.api_prefix.clone();
    let router = if prefix.is_empty() {
        router.merge(api_routes)
    } else {
        router.nest(&prefix, api_routes)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .with_state(state)
}
