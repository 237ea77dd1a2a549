pub mod models;
pub mod pii;

pub use models::user::UserSummary;
pub use pii::Masked;
