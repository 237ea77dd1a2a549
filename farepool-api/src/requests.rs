use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use farepool_workflow::views::{collect_user_ids, JoinRequestView, RequestWithRideView};

use crate::error::AppError;
use crate::middleware::auth::RiderClaims;
use crate::state::AppState;

/// POST /v1/rides/{id}/requests
/// Request to join a ride. A duplicate submission returns the existing
/// request with 200 instead of creating a second record.
pub async fn join(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
    Path(ride_id): Path<Uuid>,
) -> Result<(StatusCode, Json<JoinRequestView>), AppError> {
    let requester = claims.user_id()?;
    let outcome = state.workflow.request_to_join(requester, ride_id).await?;

    let users = state.users.summaries(&[outcome.request.user_id]).await;
    let view = JoinRequestView::project(&outcome.request, &users);

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

/// GET /v1/rides/{id}/requests
/// All join requests for a ride. Owner only.
pub async fn for_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Vec<JoinRequestView>>, AppError> {
    let requester = claims.user_id()?;
    let requests = state.workflow.requests_for_ride(requester, ride_id).await?;

    let users = state
        .users
        .summaries(&collect_user_ids(&[], &requests))
        .await;
    let views = requests
        .iter()
        .map(|r| JoinRequestView::project(r, &users))
        .collect();

    Ok(Json(views))
}

/// PUT /v1/rides/{id}/requests/{req_id}/{action}
/// Accept or reject a pending request. Owner only.
pub async fn manage(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
    Path((ride_id, request_id, action)): Path<(Uuid, Uuid, String)>,
) -> Result<Json<JoinRequestView>, AppError> {
    let requester = claims.user_id()?;
    let updated = state
        .workflow
        .manage_request(requester, ride_id, request_id, &action)
        .await?;

    let users = state.users.summaries(&[updated.user_id]).await;
    Ok(Json(JoinRequestView::project(&updated, &users)))
}

/// GET /v1/requests/mine
/// The caller's join requests with their rides embedded.
pub async fn mine(
    State(state): State<AppState>,
    Extension(claims): Extension<RiderClaims>,
) -> Result<Json<Vec<RequestWithRideView>>, AppError> {
    let user = claims.user_id()?;
    let pairs = state.workflow.requests_by_user(user).await;

    let rides: Vec<_> = pairs.iter().map(|(_, ride)| ride.clone()).collect();
    let requests: Vec<_> = pairs.iter().map(|(req, _)| req.clone()).collect();
    let users = state
        .users
        .summaries(&collect_user_ids(&rides, &requests))
        .await;

    let views = pairs
        .iter()
        .map(|(req, ride)| RequestWithRideView::project(req, ride, user, &users))
        .collect();

    Ok(Json(views))
}
