use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::error::WorkflowError;

/// Ride status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Upcoming,
    Ongoing,
    Completed,
    Aborted,
}

/// Input for creating a ride. Coordinates are opaque numeric pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRideParams {
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub total_seats: i32,
    pub total_cost: f64,
    pub departure_at: DateTime<Utc>,
}

/// An offered shared trip with fixed seats and total cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub owner: Uuid,
    pub participants: Vec<Uuid>,
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
}

impl Ride {
    /// Create a ride with the owner as sole initial participant.
    ///
    /// The owner takes one seat, so `seats_available` starts at
    /// `total_seats - 1` (floored at 0). `cost_per_seat` is fixed here since
    /// both inputs are immutable afterwards.
    pub fn new(owner: Uuid, params: CreateRideParams) -> Result<Self, WorkflowError> {
        if params.total_seats < 0 {
            return Err(WorkflowError::validation("total_seats must not be negative"));
        }
        if !params.total_cost.is_finite() || params.total_cost < 0.0 {
            return Err(WorkflowError::validation("total_cost must not be negative"));
        }

        let cost_per_seat = if params.total_seats > 0 {
            params.total_cost / params.total_seats as f64
        } else {
            0.0
        };

        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            participants: vec![owner],
            pickup_latitude: params.pickup_latitude,
            pickup_longitude: params.pickup_longitude,
            destination_latitude: params.destination_latitude,
            destination_longitude: params.destination_longitude,
            total_seats: params.total_seats,
            seats_available: (params.total_seats - 1).max(0),
            total_cost: params.total_cost,
            cost_per_seat,
            status: RideStatus::Upcoming,
            departure_at: params.departure_at,
            created_at: Utc::now(),
        })
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }

    pub fn has_seats(&self) -> bool {
        self.seats_available > 0
    }

    /// Idempotent add to the participant set.
    pub fn add_participant(&mut self, user_id: Uuid) {
        if !self.participants.contains(&user_id) {
            self.participants.push(user_id);
        }
    }

    /// Decrement the available seat count, floored at 0.
    pub fn decrement_seat(&mut self) {
        self.seats_available = (self.seats_available - 1).max(0);
    }
}
