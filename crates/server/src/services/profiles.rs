//! Profile documents.

use thiserror::Error;

use crate::db::{ProfileRepository, RepositoryError};
use crate::models::{Profile, ProfileUpdate};

/// Profile operation errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("uid is required")]
    MissingUid,

    #[error("profile not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Profile fields as received from the client.
#[derive(Debug, Default)]
pub struct ProfileInput<'a> {
    pub uid: Option<&'a str>,
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub department: Option<&'a str>,
    pub role: Option<&'a str>,
}

pub struct ProfileService<'a> {
    profiles: &'a dyn ProfileRepository,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(profiles: &'a dyn ProfileRepository) -> Self {
        Self { profiles }
    }

    /// Create the profile for `uid`, or update the fields given.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingUid` if no uid was given.
    pub async fn update(&self, input: ProfileInput<'_>) -> Result<Profile, ProfileError> {
        let uid = input
            .uid
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .ok_or(ProfileError::MissingUid)?;

        let profile = self
            .profiles
            .upsert(ProfileUpdate {
                uid: uid.to_owned(),
                name: input.name.map(str::to_owned),
                phone: input.phone.map(str::to_owned),
                department: input.department.map(str::to_owned),
                role: input.role.map(str::to_owned),
            })
            .await?;

        tracing::info!(uid = %profile.uid, "Profile updated");
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if there is no profile for `uid`.
    pub async fn get(&self, uid: &str) -> Result<Profile, ProfileError> {
        self.profiles.get(uid).await?.ok_or(ProfileError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[tokio::test]
    async fn test_update_requires_uid() {
        let store = MemoryStore::default();
        let result = ProfileService::new(&store)
            .update(ProfileInput {
                uid: Some("  "),
                name: Some("Kiran"),
                ..ProfileInput::default()
            })
            .await;
        assert!(matches!(result, Err(ProfileError::MissingUid)));
    }

    #[tokio::test]
    async fn test_update_then_get() {
        let store = MemoryStore::default();
        let service = ProfileService::new(&store);
        service
            .update(ProfileInput {
                uid: Some("emp-77"),
                department: Some("Transmission"),
                ..ProfileInput::default()
            })
            .await
            .unwrap();

        let profile = service.get("emp-77").await.unwrap();
        assert_eq!(profile.department.as_deref(), Some("Transmission"));
        assert!(matches!(
            service.get("emp-78").await,
            Err(ProfileError::NotFound)
        ));
    }
}
