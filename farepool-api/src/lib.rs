use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod middleware;
pub mod requests;
pub mod rides;
pub mod state;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Viewer-optional routes: a token personalizes the response but is
    // never required.
    let public = Router::new()
        .route("/v1/users/register", post(users::register))
        .route("/v1/users/login", post(users::login))
        .route("/v1/rides/upcoming", get(rides::upcoming))
        .route("/v1/rides/{id}", get(rides::detail));

    let protected = Router::new()
        .route("/v1/users/me", get(users::me))
        .route("/v1/rides", post(rides::create))
        .route("/v1/rides/mine", get(rides::mine))
        .route(
            "/v1/rides/{id}/requests",
            post(requests::join).get(requests::for_ride),
        )
        .route(
            "/v1/rides/{id}/requests/{req_id}/{action}",
            put(requests::manage),
        )
        .route("/v1/requests/mine", get(requests::mine))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::rider_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
