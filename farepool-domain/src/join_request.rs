use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::error::WorkflowError;

/// Join request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
        }
    }
}

/// A user's request to occupy one seat on a ride.
///
/// At most one request exists per (ride, user) pair; the ledger enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

impl JoinRequest {
    pub fn new(ride_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            ride_id,
            user_id,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Transition out of Pending, exactly once.
    ///
    /// Resolving to Pending is not a transition and is rejected outright.
    pub fn resolve(&mut self, new_status: RequestStatus) -> Result<(), WorkflowError> {
        if new_status == RequestStatus::Pending {
            return Err(WorkflowError::validation("cannot resolve a request back to PENDING"));
        }
        if self.status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }
        self.status = new_status;
        Ok(())
    }
}
