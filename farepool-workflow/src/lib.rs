pub mod service;
pub mod views;

pub use service::{JoinOutcome, RideDetail, RideWorkflow, UserRides};
pub use views::{JoinRequestView, RequestWithRideView, RideView};
