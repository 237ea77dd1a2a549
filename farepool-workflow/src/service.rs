use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use farepool_domain::{CreateRideParams, JoinRequest, RequestStatus, Ride, WorkflowError};
use farepool_store::Stores;

/// Result of a join attempt. `created` is false when the request already
/// existed and was returned unchanged.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub request: JoinRequest,
    pub created: bool,
}

/// Rides associated with a user: owned and accepted-into.
#[derive(Debug, Clone)]
pub struct UserRides {
    pub created: Vec<Ride>,
    pub accepted: Vec<Ride>,
}

/// A ride plus the viewer-scoped request data needed for projection.
/// `join_requests` is populated only when the viewer owns the ride.
#[derive(Debug, Clone)]
pub struct RideDetail {
    pub ride: Ride,
    pub viewer_request: Option<JoinRequest>,
    pub join_requests: Option<Vec<JoinRequest>>,
}

/// Orchestrates the ride lifecycle and join-request workflow.
///
/// The single authority for cross-entity invariants: seat counts and
/// request status are only ever mutated together, under one write guard,
/// so a capacity check and the mutation it authorizes can never interleave
/// with a concurrent accept or join on the same ride.
pub struct RideWorkflow {
    stores: RwLock<Stores>,
}

impl RideWorkflow {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(Stores::new()),
        }
    }

    /// Create a ride; the requester becomes owner and sole initial
    /// participant.
    pub async fn create_ride(
        &self,
        requester: Uuid,
        params: CreateRideParams,
    ) -> Result<Ride, WorkflowError> {
        let mut stores = self.stores.write().await;
        let ride = stores.rides.create(requester, params)?;
        tracing::info!(ride_id = %ride.id, owner = %requester, "Ride created");
        Ok(ride)
    }

    /// Request to join a ride.
    pub async fn request_to_join(
        &self,
        requester: Uuid,
        ride_id: Uuid,
    ) -> Result<JoinOutcome, WorkflowError> {
        let mut guard = self.stores.write().await;
        let stores = &mut *guard;

        // 1. Load ride
        let ride = stores.rides.get(ride_id)?;

        // 2. Owners cannot join their own ride
        if ride.is_owner(requester) {
            return Err(WorkflowError::forbidden("You cannot join your own ride"));
        }

        // 3. A duplicate request is an idempotent no-op, not an error
        if let Some(existing) = stores.requests.find_by_ride_and_user(ride_id, requester) {
            return Ok(JoinOutcome {
                request: existing.clone(),
                created: false,
            });
        }

        // 4. Capacity check happens under the same write guard as the insert
        if !ride.has_seats() {
            return Err(WorkflowError::NoSeats);
        }

        // 5. Create a PENDING request
        let request = stores.requests.create(ride_id, requester)?;
        tracing::info!(ride_id = %ride_id, user = %requester, request_id = %request.id, "Join request created");
        Ok(JoinOutcome {
            request,
            created: true,
        })
    }

    /// Accept or reject a pending join request. Owner only.
    ///
    /// The accept path flips the request to ACCEPTED, adds the requester to
    /// the participants and decrements the seat count as one atomic unit.
    pub async fn manage_request(
        &self,
        requester: Uuid,
        ride_id: Uuid,
        request_id: Uuid,
        action: &str,
    ) -> Result<JoinRequest, WorkflowError> {
        let mut guard = self.stores.write().await;
        let stores = &mut *guard;

        // 1. Load ride
        let ride = stores.rides.get(ride_id)?;

        // 2. Only the ride owner can manage requests
        if !ride.is_owner(requester) {
            return Err(WorkflowError::forbidden(
                "Unauthorized. Only ride owner can manage requests.",
            ));
        }

        // 3. Load the request, scoped to this ride
        let request = stores.requests.get(request_id)?;
        if request.ride_id != ride_id {
            return Err(WorkflowError::RequestNotFound(request_id));
        }

        // 4. Must still be pending
        if !request.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str().to_string(),
                to: action.to_uppercase(),
            });
        }
        let request_user = request.user_id;

        match action {
            "accept" => {
                // 5. Capacity check and the mutation it authorizes share
                // this write guard.
                if !ride.has_seats() {
                    return Err(WorkflowError::NoSeats);
                }
                let updated = stores
                    .requests
                    .update_status(request_id, RequestStatus::Accepted)?;
                stores.rides.add_participant(ride_id, request_user)?;
                stores.rides.decrement_seat(ride_id)?;
                tracing::info!(ride_id = %ride_id, request_id = %request_id, "Join request accepted");
                Ok(updated)
            }
            "reject" => {
                // 6. No seat change on reject
                let updated = stores
                    .requests
                    .update_status(request_id, RequestStatus::Rejected)?;
                tracing::info!(ride_id = %ride_id, request_id = %request_id, "Join request rejected");
                Ok(updated)
            }
            _ => Err(WorkflowError::validation(
                "Invalid action. Use \"accept\" or \"reject\".",
            )),
        }
    }

    /// Ride detail plus the viewer-scoped request data.
    pub async fn ride_detail(
        &self,
        ride_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<RideDetail, WorkflowError> {
        let stores = self.stores.read().await;
        let ride = stores.rides.get(ride_id)?.clone();

        let viewer_request = viewer
            .and_then(|v| stores.requests.find_by_ride_and_user(ride_id, v))
            .cloned();
        let join_requests = match viewer {
            Some(v) if ride.is_owner(v) => Some(stores.requests.list_by_ride(ride_id)),
            _ => None,
        };

        Ok(RideDetail {
            ride,
            viewer_request,
            join_requests,
        })
    }

    /// Upcoming rides sorted by departure, plus the viewer's requests
    /// batched into a ride-id map (one ledger scan, no per-ride lookups).
    pub async fn upcoming_rides(
        &self,
        viewer: Option<Uuid>,
    ) -> (Vec<Ride>, HashMap<Uuid, JoinRequest>) {
        let stores = self.stores.read().await;
        let mut rides = stores.rides.list_upcoming();
        rides.sort_by(|a, b| a.departure_at.cmp(&b.departure_at));

        let viewer_requests = match viewer {
            Some(v) => requests_by_ride(&stores, v),
            None => HashMap::new(),
        };
        (rides, viewer_requests)
    }

    /// Rides owned by the user and rides the user was accepted into.
    pub async fn user_rides(&self, user: Uuid) -> (UserRides, HashMap<Uuid, JoinRequest>) {
        let stores = self.stores.read().await;
        let created = stores.rides.list_by_owner(user);

        let user_requests = stores.requests.list_by_user(user);
        let accepted: Vec<Ride> = user_requests
            .iter()
            .filter(|r| r.status == RequestStatus::Accepted)
            .filter_map(|r| stores.rides.get(r.ride_id).ok().cloned())
            .collect();

        let viewer_requests = user_requests
            .into_iter()
            .map(|r| (r.ride_id, r))
            .collect();

        (UserRides { created, accepted }, viewer_requests)
    }

    /// All join requests for a ride. Owner only.
    pub async fn requests_for_ride(
        &self,
        requester: Uuid,
        ride_id: Uuid,
    ) -> Result<Vec<JoinRequest>, WorkflowError> {
        let stores = self.stores.read().await;
        let ride = stores.rides.get(ride_id)?;
        if !ride.is_owner(requester) {
            return Err(WorkflowError::forbidden(
                "You are not authorized to view these requests.",
            ));
        }
        Ok(stores.requests.list_by_ride(ride_id))
    }

    /// The user's join requests with their rides embedded.
    pub async fn requests_by_user(&self, user: Uuid) -> Vec<(JoinRequest, Ride)> {
        let stores = self.stores.read().await;
        stores
            .requests
            .list_by_user(user)
            .into_iter()
            .filter_map(|req| {
                let ride = stores.rides.get(req.ride_id).ok().cloned()?;
                Some((req, ride))
            })
            .collect()
    }
}

impl Default for RideWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

fn requests_by_ride(stores: &Stores, user: Uuid) -> HashMap<Uuid, JoinRequest> {
    stores
        .requests
        .list_by_user(user)
        .into_iter()
        .map(|r| (r.ride_id, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn params(total_seats: i32, total_cost: f64) -> CreateRideParams {
        CreateRideParams {
            pickup_latitude: 12.97,
            pickup_longitude: 77.59,
            destination_latitude: 13.08,
            destination_longitude: 77.58,
            total_seats,
            total_cost,
            departure_at: Utc::now(),
        }
    }

    /// seats_available = total_seats - 1 - count(ACCEPTED), floored at 0.
    async fn assert_seat_invariant(workflow: &RideWorkflow, ride_id: Uuid) {
        let stores = workflow.stores.read().await;
        let ride = stores.rides.get(ride_id).unwrap();
        let accepted = stores
            .requests
            .list_by_ride(ride_id)
            .iter()
            .filter(|r| r.status == RequestStatus::Accepted)
            .count() as i32;
        assert_eq!(ride.seats_available, (ride.total_seats - 1 - accepted).max(0));
    }

    #[tokio::test]
    async fn test_create_ride_seat_and_cost() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();

        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();

        assert_eq!(ride.cost_per_seat, 25.0);
        assert_eq!(ride.seats_available, 3);
        assert_seat_invariant(&workflow, ride.id).await;
    }

    #[tokio::test]
    async fn test_owner_cannot_join_own_ride() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();

        let err = workflow.request_to_join(owner, ride.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_join_missing_ride() {
        let workflow = RideWorkflow::new();
        let err = workflow
            .request_to_join(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RideNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_join_is_idempotent() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();

        let first = workflow.request_to_join(rider, ride.id).await.unwrap();
        assert!(first.created);

        let second = workflow.request_to_join(rider, ride.id).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.request.id, first.request.id);
        assert_eq!(second.request.status, RequestStatus::Pending);

        // No second record
        let requests = workflow.requests_for_ride(owner, ride.id).await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_join_without_seats() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        // One seat total: the owner's. Nothing left to join.
        let ride = workflow.create_ride(owner, params(1, 30.0)).await.unwrap();

        let err = workflow
            .request_to_join(Uuid::new_v4(), ride.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoSeats));
    }

    #[tokio::test]
    async fn test_accept_decrements_and_adds_participant() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        let outcome = workflow.request_to_join(rider, ride.id).await.unwrap();

        let updated = workflow
            .manage_request(owner, ride.id, outcome.request.id, "accept")
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Accepted);

        let detail = workflow.ride_detail(ride.id, Some(owner)).await.unwrap();
        assert_eq!(detail.ride.seats_available, 2);
        assert!(detail.ride.participants.contains(&rider));
        assert_seat_invariant(&workflow, ride.id).await;

        // Accepting again is an invalid transition
        let err = workflow
            .manage_request(owner, ride.id, outcome.request.id, "accept")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_reject_leaves_seats_untouched() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        let outcome = workflow.request_to_join(rider, ride.id).await.unwrap();

        let updated = workflow
            .manage_request(owner, ride.id, outcome.request.id, "reject")
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Rejected);

        let detail = workflow.ride_detail(ride.id, Some(owner)).await.unwrap();
        assert_eq!(detail.ride.seats_available, 3);
        assert!(!detail.ride.participants.contains(&rider));
        assert_seat_invariant(&workflow, ride.id).await;
    }

    #[tokio::test]
    async fn test_accept_without_seats_leaves_request_pending() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        // Two seats: owner + one joinable
        let ride = workflow.create_ride(owner, params(2, 60.0)).await.unwrap();

        let r1 = workflow.request_to_join(first, ride.id).await.unwrap();
        let r2 = workflow.request_to_join(second, ride.id).await.unwrap();

        workflow
            .manage_request(owner, ride.id, r1.request.id, "accept")
            .await
            .unwrap();

        let err = workflow
            .manage_request(owner, ride.id, r2.request.id, "accept")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoSeats));

        // The losing request is still pending
        let requests = workflow.requests_for_ride(owner, ride.id).await.unwrap();
        let losing = requests.iter().find(|r| r.id == r2.request.id).unwrap();
        assert_eq!(losing.status, RequestStatus::Pending);
        assert_seat_invariant(&workflow, ride.id).await;
    }

    #[tokio::test]
    async fn test_non_owner_cannot_manage() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        workflow.request_to_join(rider, ride.id).await.unwrap();

        // Forbidden fires before the request is even looked up: a bogus
        // request id still yields Forbidden, not NotFound.
        let err = workflow
            .manage_request(stranger, ride.id, Uuid::new_v4(), "accept")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_manage_request_from_other_ride() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride_a = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        let ride_b = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        let outcome = workflow.request_to_join(rider, ride_a.id).await.unwrap();

        let err = workflow
            .manage_request(owner, ride_b.id, outcome.request.id, "accept")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RequestNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_action() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        let outcome = workflow.request_to_join(rider, ride.id).await.unwrap();

        let err = workflow
            .manage_request(owner, ride.id, outcome.request.id, "approve")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_accepts_on_last_seat() {
        let workflow = Arc::new(RideWorkflow::new());
        let owner = Uuid::new_v4();
        // Two seats: exactly one joinable seat for two pending requests
        let ride = workflow.create_ride(owner, params(2, 60.0)).await.unwrap();

        let r1 = workflow
            .request_to_join(Uuid::new_v4(), ride.id)
            .await
            .unwrap();
        let r2 = workflow
            .request_to_join(Uuid::new_v4(), ride.id)
            .await
            .unwrap();

        let w1 = workflow.clone();
        let w2 = workflow.clone();
        let ride_id = ride.id;
        let h1 = tokio::spawn(async move {
            w1.manage_request(owner, ride_id, r1.request.id, "accept").await
        });
        let h2 = tokio::spawn(async move {
            w2.manage_request(owner, ride_id, r2.request.id, "accept").await
        });

        let results = [h1.await.unwrap(), h2.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let capacity_losses = results
            .iter()
            .filter(|r| matches!(r, Err(WorkflowError::NoSeats)))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(capacity_losses, 1);

        let detail = workflow.ride_detail(ride.id, Some(owner)).await.unwrap();
        assert_eq!(detail.ride.seats_available, 0);
        assert_seat_invariant(&workflow, ride.id).await;
    }

    #[tokio::test]
    async fn test_user_rides_split() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();

        let owned = workflow.create_ride(rider, params(3, 90.0)).await.unwrap();
        let other = workflow.create_ride(owner, params(3, 90.0)).await.unwrap();
        let outcome = workflow.request_to_join(rider, other.id).await.unwrap();
        workflow
            .manage_request(owner, other.id, outcome.request.id, "accept")
            .await
            .unwrap();

        let (rides, viewer_requests) = workflow.user_rides(rider).await;
        assert_eq!(rides.created.len(), 1);
        assert_eq!(rides.created[0].id, owned.id);
        assert_eq!(rides.accepted.len(), 1);
        assert_eq!(rides.accepted[0].id, other.id);
        assert_eq!(
            viewer_requests[&other.id].status,
            RequestStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_detail_scopes_join_requests_to_owner() {
        let workflow = RideWorkflow::new();
        let owner = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = workflow.create_ride(owner, params(4, 100.0)).await.unwrap();
        workflow.request_to_join(rider, ride.id).await.unwrap();

        let for_owner = workflow.ride_detail(ride.id, Some(owner)).await.unwrap();
        assert_eq!(for_owner.join_requests.as_ref().unwrap().len(), 1);

        let for_rider = workflow.ride_detail(ride.id, Some(rider)).await.unwrap();
        assert!(for_rider.join_requests.is_none());
        assert_eq!(
            for_rider.viewer_request.as_ref().unwrap().user_id,
            rider
        );

        let anonymous = workflow.ride_detail(ride.id, None).await.unwrap();
        assert!(anonymous.join_requests.is_none());
        assert!(anonymous.viewer_request.is_none());
    }
}
