use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;

/// Compact user shape embedded in ride views and join-request listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: Masked<String>,
}

impl UserSummary {
    pub fn new(id: Uuid, full_name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            phone_number: Masked(phone_number.into()),
        }
    }
}
