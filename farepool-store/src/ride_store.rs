use std::collections::HashMap;
use uuid::Uuid;

use farepool_domain::{CreateRideParams, Ride, RideStatus, WorkflowError};

/// In-memory ride store.
///
/// Owns ride records and their seat accounting. Seat counts are only
/// mutated through the workflow service's accept path.
pub struct RideStore {
    rides: HashMap<Uuid, Ride>,
}

impl RideStore {
    pub fn new() -> Self {
        Self {
            rides: HashMap::new(),
        }
    }

    /// Create a ride owned by `owner`.
    ///
    /// Validation (negative seats or cost) happens in the entity
    /// constructor and surfaces as `Validation`.
    pub fn create(&mut self, owner: Uuid, params: CreateRideParams) -> Result<Ride, WorkflowError> {
        let ride = Ride::new(owner, params)?;
        self.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    pub fn get(&self, ride_id: Uuid) -> Result<&Ride, WorkflowError> {
        self.rides
            .get(&ride_id)
            .ok_or(WorkflowError::RideNotFound(ride_id))
    }

    /// Decrement a ride's available seats, floored at 0.
    ///
    /// Must only be called inside the workflow service's atomic accept.
    pub fn decrement_seat(&mut self, ride_id: Uuid) -> Result<&Ride, WorkflowError> {
        let ride = self.get_mut(ride_id)?;
        ride.decrement_seat();
        Ok(ride)
    }

    /// Idempotent add to a ride's participant set.
    pub fn add_participant(&mut self, ride_id: Uuid, user_id: Uuid) -> Result<(), WorkflowError> {
        let ride = self.get_mut(ride_id)?;
        ride.add_participant(user_id);
        Ok(())
    }

    /// All rides with status UPCOMING. Ordering is unspecified; callers may
    /// sort by departure time.
    pub fn list_upcoming(&self) -> Vec<Ride> {
        self.rides
            .values()
            .filter(|r| r.status == RideStatus::Upcoming)
            .cloned()
            .collect()
    }

    /// Rides owned by `owner`, newest first.
    pub fn list_by_owner(&self, owner: Uuid) -> Vec<Ride> {
        let mut rides: Vec<Ride> = self
            .rides
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rides
    }

    fn get_mut(&mut self, ride_id: Uuid) -> Result<&mut Ride, WorkflowError> {
        self.rides
            .get_mut(&ride_id)
            .ok_or(WorkflowError::RideNotFound(ride_id))
    }
}

impl Default for RideStore {
    fn default() -> Self {
        Self::new()
    }
}
