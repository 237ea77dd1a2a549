pub mod app_config;
pub mod cache;
pub mod request_ledger;
pub mod ride_store;
pub mod user_directory;

pub use cache::{ListingCache, MemoryCache};
pub use request_ledger::JoinRequestLedger;
pub use ride_store::RideStore;
pub use user_directory::UserDirectory;

/// The single logical data store.
///
/// Bundles the ride store and the join-request ledger so the workflow
/// service can lock them as one unit; nothing else is allowed to mutate
/// both together.
#[derive(Default)]
pub struct Stores {
    pub rides: RideStore,
    pub requests: JoinRequestLedger,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }
}
