use std::sync::Arc;
use std::time::Duration;

use farepool_store::{ListingCache, UserDirectory};
use farepool_workflow::RideWorkflow;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<RideWorkflow>,
    pub users: Arc<UserDirectory>,
    pub cache: Arc<dyn ListingCache>,
    pub auth: AuthConfig,
    pub listing_ttl: Duration,
}
