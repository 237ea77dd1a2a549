use std::collections::HashMap;
use uuid::Uuid;

use farepool_domain::{JoinRequest, RequestStatus, WorkflowError};

/// In-memory join-request ledger.
///
/// Owns request records and their state machine. The (ride, user) pair is
/// unique; the secondary index enforces it on create.
pub struct JoinRequestLedger {
    requests: HashMap<Uuid, JoinRequest>,
    by_ride_user: HashMap<(Uuid, Uuid), Uuid>,
}

impl JoinRequestLedger {
    pub fn new() -> Self {
        Self {
            requests: HashMap::new(),
            by_ride_user: HashMap::new(),
        }
    }

    /// Create a PENDING request for (ride, user).
    ///
    /// Fails with `Conflict` when a request already exists for the pair.
    /// The workflow treats that case as an idempotent no-op before ever
    /// reaching this seam.
    pub fn create(&mut self, ride_id: Uuid, user_id: Uuid) -> Result<JoinRequest, WorkflowError> {
        if self.by_ride_user.contains_key(&(ride_id, user_id)) {
            return Err(WorkflowError::Conflict(
                "Join request already exists".to_string(),
            ));
        }

        let request = JoinRequest::new(ride_id, user_id);
        self.by_ride_user.insert((ride_id, user_id), request.id);
        self.requests.insert(request.id, request.clone());
        Ok(request)
    }

    pub fn get(&self, request_id: Uuid) -> Result<&JoinRequest, WorkflowError> {
        self.requests
            .get(&request_id)
            .ok_or(WorkflowError::RequestNotFound(request_id))
    }

    /// Transition a request out of PENDING, exactly once.
    pub fn update_status(
        &mut self,
        request_id: Uuid,
        new_status: RequestStatus,
    ) -> Result<JoinRequest, WorkflowError> {
        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or(WorkflowError::RequestNotFound(request_id))?;
        request.resolve(new_status)?;
        Ok(request.clone())
    }

    /// Requests for a ride, oldest first.
    pub fn list_by_ride(&self, ride_id: Uuid) -> Vec<JoinRequest> {
        let mut requests: Vec<JoinRequest> = self
            .requests
            .values()
            .filter(|r| r.ride_id == ride_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        requests
    }

    /// Requests made by a user, oldest first.
    pub fn list_by_user(&self, user_id: Uuid) -> Vec<JoinRequest> {
        let mut requests: Vec<JoinRequest> = self
            .requests
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        requests
    }

    pub fn find_by_ride_and_user(&self, ride_id: Uuid, user_id: Uuid) -> Option<&JoinRequest> {
        self.by_ride_user
            .get(&(ride_id, user_id))
            .and_then(|id| self.requests.get(id))
    }
}

impl Default for JoinRequestLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_pair_conflicts() {
        let mut ledger = JoinRequestLedger::new();
        let ride_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        ledger.create(ride_id, user_id).unwrap();
        let err = ledger.create(ride_id, user_id).unwrap_err();

        assert!(matches!(err, WorkflowError::Conflict(_)));
        assert_eq!(ledger.list_by_ride(ride_id).len(), 1);
    }

    #[test]
    fn test_same_user_different_rides() {
        let mut ledger = JoinRequestLedger::new();
        let user_id = Uuid::new_v4();

        ledger.create(Uuid::new_v4(), user_id).unwrap();
        ledger.create(Uuid::new_v4(), user_id).unwrap();

        assert_eq!(ledger.list_by_user(user_id).len(), 2);
    }

    #[test]
    fn test_update_status_only_from_pending() {
        let mut ledger = JoinRequestLedger::new();
        let request = ledger.create(Uuid::new_v4(), Uuid::new_v4()).unwrap();

        let updated = ledger
            .update_status(request.id, RequestStatus::Rejected)
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Rejected);

        let err = ledger
            .update_status(request.id, RequestStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_find_by_ride_and_user() {
        let mut ledger = JoinRequestLedger::new();
        let ride_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        assert!(ledger.find_by_ride_and_user(ride_id, user_id).is_none());

        let request = ledger.create(ride_id, user_id).unwrap();
        let found = ledger.find_by_ride_and_user(ride_id, user_id).unwrap();
        assert_eq!(found.id, request.id);
    }
}
