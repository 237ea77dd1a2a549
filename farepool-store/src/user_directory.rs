use std::collections::HashMap;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use farepool_domain::WorkflowError;
use farepool_shared::UserSummary;

/// Stored user record. The password never leaves this module in any form
/// other than the salted argon2id digest.
#[derive(Debug, Clone)]
struct UserRecord {
    id: Uuid,
    phone_number: String,
    full_name: String,
    password_hash: String,
    salt: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn summary(&self) -> UserSummary {
        UserSummary::new(self.id, self.full_name.clone(), self.phone_number.clone())
    }
}

#[derive(Default)]
struct DirectoryInner {
    users: HashMap<Uuid, UserRecord>,
    by_phone: HashMap<String, Uuid>,
}

/// Thin user-directory collaborator: identity and credentials only.
///
/// The ride workflow treats users as opaque identifiers; this directory is
/// the single place that resolves them back to displayable summaries.
pub struct UserDirectory {
    inner: RwLock<DirectoryInner>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DirectoryInner::default()),
        }
    }

    pub async fn register(
        &self,
        phone_number: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserSummary, WorkflowError> {
        if phone_number.trim().is_empty() {
            return Err(WorkflowError::validation("The phone number must be set"));
        }
        if full_name.trim().is_empty() {
            return Err(WorkflowError::validation("The full name must be set"));
        }
        if password.is_empty() {
            return Err(WorkflowError::validation("The password must be set"));
        }

        let mut inner = self.inner.write().await;
        if inner.by_phone.contains_key(phone_number) {
            return Err(WorkflowError::Conflict(
                "Phone number already registered".to_string(),
            ));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let record = UserRecord {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            full_name: full_name.to_string(),
            password_hash: hash_password(password, &salt)?,
            salt,
            created_at: Utc::now(),
        };

        let summary = record.summary();
        inner.by_phone.insert(record.phone_number.clone(), record.id);
        inner.users.insert(record.id, record);

        tracing::info!(user_id = %summary.id, "User registered");
        Ok(summary)
    }

    /// Check credentials; `None` means unknown phone or wrong password,
    /// deliberately indistinguishable to the caller.
    pub async fn verify_credentials(
        &self,
        phone_number: &str,
        password: &str,
    ) -> Result<Option<UserSummary>, WorkflowError> {
        let inner = self.inner.read().await;
        let record = match inner
            .by_phone
            .get(phone_number)
            .and_then(|id| inner.users.get(id))
        {
            Some(record) => record,
            None => return Ok(None),
        };

        let candidate = hash_password(password, &record.salt)?;
        if candidate == record.password_hash {
            Ok(Some(record.summary()))
        } else {
            Ok(None)
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserSummary, WorkflowError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&user_id)
            .map(UserRecord::summary)
            .ok_or(WorkflowError::UserNotFound(user_id))
    }

    /// Batch-resolve summaries; unknown ids are silently skipped.
    pub async fn summaries(&self, ids: &[Uuid]) -> HashMap<Uuid, UserSummary> {
        let inner = self.inner.read().await;
        ids.iter()
            .filter_map(|id| inner.users.get(id).map(|r| (*id, r.summary())))
            .collect()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_password(password: &str, salt: &str) -> Result<String, WorkflowError> {
    let params = argon2::Params::new(4096, 3, 1, Some(32))
        .map_err(|e| WorkflowError::Internal(format!("argon2 params: {}", e)))?;
    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut hash = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut hash)
        .map_err(|e| WorkflowError::Internal(format!("argon2 hashing: {}", e)))?;

    Ok(hex::encode(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_login() {
        let directory = UserDirectory::new();

        let user = directory
            .register("15550001111", "Asha Rao", "hunter2")
            .await
            .unwrap();

        let verified = directory
            .verify_credentials("15550001111", "hunter2")
            .await
            .unwrap()
            .expect("credentials should verify");
        assert_eq!(verified.id, user.id);

        let rejected = directory
            .verify_credentials("15550001111", "wrong")
            .await
            .unwrap();
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_number() {
        let directory = UserDirectory::new();
        directory
            .register("15550001111", "Asha Rao", "hunter2")
            .await
            .unwrap();

        let err = directory
            .register("15550001111", "Someone Else", "password")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_phone_rejected() {
        let directory = UserDirectory::new();
        let err = directory.register("", "Asha Rao", "hunter2").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_batch_summaries_skip_unknown() {
        let directory = UserDirectory::new();
        let user = directory
            .register("15550001111", "Asha Rao", "hunter2")
            .await
            .unwrap();

        let summaries = directory.summaries(&[user.id, Uuid::new_v4()]).await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[&user.id].full_name, "Asha Rao");
    }
}
