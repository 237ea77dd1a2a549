pub mod error;
pub mod join_request;
pub mod ride;

pub use error::WorkflowError;
pub use join_request::{JoinRequest, RequestStatus};
pub use ride::{CreateRideParams, Ride, RideStatus};
