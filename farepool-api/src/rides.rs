use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use farepool_domain::CreateRideParams;
use farepool_workflow::views::{collect_user_ids, RideView};

use crate::error::AppError;
use crate::middleware::auth::{optional_viewer, RiderClaims};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserRidesResponse {
    pub created_rides: Vec<RideView>,
    pub accepted_rides: Vec<RideView>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/rides
/// Create a ride owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
    Json(params): Json<CreateRideParams>,
) -> Result<(StatusCode, Json<RideView>), AppError> {
    let owner = claims.user_id()?;
    let ride = state.workflow.create_ride(owner, params).await?;

    let users = state
        .users
        .summaries(&collect_user_ids(std::slice::from_ref(&ride), &[]))
        .await;
    let view = RideView::project(&ride, Some(owner), &Default::default(), &users);

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /v1/rides/upcoming
/// List upcoming rides, viewer optional. Read-through cached per viewer;
/// staleness within the TTL is acceptable and never load-bearing.
pub async fn upcoming(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let viewer = optional_viewer(&headers, &state.auth.secret);
    let cache_key = match viewer {
        Some(v) => format!("upcoming_rides:{}", v),
        None => "upcoming_rides:anonymous".to_string(),
    };

    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(json_body(cached));
    }

    let (rides, viewer_requests) = state.workflow.upcoming_rides(viewer).await;
    let users = state.users.summaries(&collect_user_ids(&rides, &[])).await;
    let views: Vec<RideView> = rides
        .iter()
        .map(|ride| RideView::project(ride, viewer, &viewer_requests, &users))
        .collect();

    let body = serde_json::to_string(&views)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    state
        .cache
        .set(&cache_key, body.clone(), state.listing_ttl)
        .await;

    Ok(json_body(body))
}

/// GET /v1/rides/{id}
/// Ride detail, viewer optional. Join requests are included only for the
/// owner.
pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideView>, AppError> {
    let viewer = optional_viewer(&headers, &state.auth.secret);
    let detail = state.workflow.ride_detail(ride_id, viewer).await?;

    let ids = collect_user_ids(
        std::slice::from_ref(&detail.ride),
        detail.join_requests.as_deref().unwrap_or(&[]),
    );
    let users = state.users.summaries(&ids).await;

    Ok(Json(RideView::project_detail(&detail, viewer, &users)))
}

/// GET /v1/rides/mine
/// Rides the caller owns and rides they were accepted into.
pub async fn mine(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
) -> Result<Json<UserRidesResponse>, AppError> {
    let user = claims.user_id()?;
    let (rides, viewer_requests) = state.workflow.user_rides(user).await;

    let mut all = rides.created.clone();
    all.extend(rides.accepted.iter().cloned());
    let users = state.users.summaries(&collect_user_ids(&all, &[])).await;

    let created_rides = rides
        .created
        .iter()
        .map(|r| RideView::project(r, Some(user), &viewer_requests, &users))
        .collect();
    let accepted_rides = rides
        .accepted
        .iter()
        .map(|r| RideView::project(r, Some(user), &viewer_requests, &users))
        .collect();

    Ok(Json(UserRidesResponse {
        created_rides,
        accepted_rides,
    }))
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
