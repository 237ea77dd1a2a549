use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use farepool_domain::{JoinRequest, RequestStatus, Ride, RideStatus};
use farepool_shared::{Masked, UserSummary};

use crate::service::RideDetail;

/// Viewer-specific read shape of a ride. Not a stored entity.
#[derive(Debug, Clone, Serialize)]
pub struct RideView {
    pub id: Uuid,
    pub owner: Option<UserSummary>,
    pub participants: Vec<UserSummary>,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub total_seats: i32,
    pub seats_available: i32,
    pub total_cost: f64,
    pub cost_per_seat: f64,
    pub status: RideStatus,
    pub departure_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_owner: bool,
    pub requested: bool,
    pub requested_status: Option<RequestStatus>,
    /// Present only when the viewer owns the ride; omitted entirely
    /// otherwise (not an empty list).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_requests: Option<Vec<JoinRequestView>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRequestView {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub user_full_name: Option<String>,
    pub user_phone_number: Option<Masked<String>>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

/// A user's join request with its ride embedded.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithRideView {
    pub id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub ride: RideView,
}

impl RideView {
    /// Project a ride for a viewer.
    ///
    /// `viewer_requests` is the precomputed map from ride id to the
    /// viewer's own join request; `users` is a batch-resolved summary map.
    /// Both are supplied by the caller so projection stays a pure function
    /// with no per-ride lookups.
    pub fn project(
        ride: &Ride,
        viewer: Option<Uuid>,
        viewer_requests: &HashMap<Uuid, JoinRequest>,
        users: &HashMap<Uuid, UserSummary>,
    ) -> Self {
        let viewer_request = viewer.and_then(|_| viewer_requests.get(&ride.id));

        Self {
            id: ride.id,
            owner: users.get(&ride.owner).cloned(),
            participants: ride
                .participants
                .iter()
                .filter_map(|id| users.get(id).cloned())
                .collect(),
            pickup_latitude: ride.pickup_latitude,
            pickup_longitude: ride.pickup_longitude,
            destination_latitude: ride.destination_latitude,
            destination_longitude: ride.destination_longitude,
            total_seats: ride.total_seats,
            seats_available: ride.seats_available,
            total_cost: ride.total_cost,
            cost_per_seat: ride.cost_per_seat,
            status: ride.status,
            departure_at: ride.departure_at,
            created_at: ride.created_at,
            is_owner: viewer.map(|v| ride.is_owner(v)).unwrap_or(false),
            requested: viewer_request.is_some(),
            requested_status: viewer_request.map(|r| r.status),
            join_requests: None,
        }
    }

    /// Project a ride detail. The workflow only hands over `join_requests`
    /// when the viewer owns the ride, so the scoping decision is already
    /// made by the time projection runs.
    pub fn project_detail(
        detail: &RideDetail,
        viewer: Option<Uuid>,
        users: &HashMap<Uuid, UserSummary>,
    ) -> Self {
        let viewer_requests = detail
            .viewer_request
            .clone()
            .map(|r| HashMap::from([(r.ride_id, r)]))
            .unwrap_or_default();

        let mut view = Self::project(&detail.ride, viewer, &viewer_requests, users);
        view.join_requests = detail
            .join_requests
            .as_ref()
            .map(|requests| {
                requests
                    .iter()
                    .map(|r| JoinRequestView::project(r, users))
                    .collect()
            });
        view
    }
}

impl JoinRequestView {
    pub fn project(request: &JoinRequest, users: &HashMap<Uuid, UserSummary>) -> Self {
        let user = users.get(&request.user_id);
        Self {
            id: request.id,
            ride_id: request.ride_id,
            user_id: request.user_id,
            user_full_name: user.map(|u| u.full_name.clone()),
            user_phone_number: user.map(|u| u.phone_number.clone()),
            status: request.status,
            requested_at: request.requested_at,
        }
    }
}

impl RequestWithRideView {
    pub fn project(
        request: &JoinRequest,
        ride: &Ride,
        viewer: Uuid,
        users: &HashMap<Uuid, UserSummary>,
    ) -> Self {
        let viewer_requests = HashMap::from([(request.ride_id, request.clone())]);
        Self {
            id: request.id,
            status: request.status,
            requested_at: request.requested_at,
            ride: RideView::project(ride, Some(viewer), &viewer_requests, users),
        }
    }
}

/// Collect every user id a batch of rides and requests refers to, for one
/// batched summary lookup instead of per-item queries.
pub fn collect_user_ids(rides: &[Ride], requests: &[JoinRequest]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();
    for ride in rides {
        ids.push(ride.owner);
        ids.extend(ride.participants.iter().copied());
    }
    ids.extend(requests.iter().map(|r| r.user_id));
    ids.sort();
    ids.dedup();
    ids
}
