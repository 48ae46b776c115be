//! Authentication service.
//!
//! Password registration and login, password change, and the lightweight
//! user directory. Tokens are stateless; logout needs no server state.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use helpdesk_core::{Email, UserId, UserRole};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};
use crate::services::identity::IdentityProvider;

/// Registration input as received from the client.
#[derive(Debug, Default)]
pub struct Registration<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub employee_id: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// Successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
    /// Dashboard the client should navigate to.
    pub redirect: &'static str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    identity: &'a dyn IdentityProvider,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserRepository,
        identity: &'a dyn IdentityProvider,
        tokens: &'a TokenKeys,
    ) -> Self {
        Self {
            users,
            identity,
            tokens,
        }
    }

    /// Register a new user with email and password.
    ///
    /// The role is normalized against the allow-list; anything unknown
    /// becomes `employee`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if name, email or password is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: Registration<'_>) -> Result<User, AuthError> {
        let (Some(name), Some(email), Some(password)) = (
            present(input.name),
            present(input.email),
            present(input.password),
        ) else {
            return Err(AuthError::MissingFields(
                "Name, email and password are required",
            ));
        };

        let email = Email::parse(email)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                name: name.trim().to_owned(),
                email,
                employee_id: present(input.employee_id).map(str::to_owned),
                role: UserRole::normalize(input.role),
                password_hash: Some(password_hash),
            })
            .await
            .map_err(conflict_as_exists)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Login with email, password and the role the client is signing in as.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has this email.
    /// Returns `AuthError::RoleMismatch` if the stored role differs.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong or unset.
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        let (Some(email), Some(password)) = (present(email), present(password)) else {
            return Err(AuthError::MissingFields("Email and password are required"));
        };

        // A string that is not an email cannot belong to a stored user.
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (user, password_hash) = self
            .users
            .get_with_password_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Case-insensitive; the `agent` alias counts as `support`.
        let requested = role.and_then(|r| r.trim().parse::<UserRole>().ok());
        if requested != Some(user.role) {
            return Err(AuthError::RoleMismatch);
        }

        let password_hash = password_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &password_hash).map_err(|_| AuthError::InvalidCredentials)?;

        let token = self.tokens.issue(&user)?;
        let redirect = user.role.dashboard_path();

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginOutcome {
            user,
            token,
            redirect,
        })
    }

    /// Replace a user's password after verifying the current one.
    ///
    /// The identity provider mirror runs after the local update and its
    /// failure does not fail the change.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    /// Returns `AuthError::IncorrectPassword` if the current password is wrong.
    pub async fn change_password(
        &self,
        id: Option<&str>,
        current_password: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<(), AuthError> {
        let (Some(id), Some(current), Some(new)) =
            (present(id), present(current_password), present(new_password))
        else {
            return Err(AuthError::MissingFields("All fields are required"));
        };

        let id: UserId = id.parse().map_err(|_| AuthError::UserNotFound)?;
        let (user, password_hash) = self
            .users
            .get_with_password_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = password_hash.ok_or(AuthError::IncorrectPassword)?;
        verify_password(current, &password_hash).map_err(|_| AuthError::IncorrectPassword)?;

        let new_hash = hash_password(new)?;
        if !self.users.update_password(user.id, &new_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        if let Err(e) = self.identity.update_password(&user.id.to_string(), new).await {
            tracing::warn!(user_id = %user.id, error = %e, "Identity provider sync failed");
        }

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Create a directory entry without a password.
    ///
    /// Such users cannot log in until a password is set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if name or email is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn add_user(&self, name: Option<&str>, email: Option<&str>) -> Result<User, AuthError> {
        let (Some(name), Some(email)) = (present(name), present(email)) else {
            return Err(AuthError::MissingFields("Name and email are required"));
        };

        let user = self
            .users
            .create(NewUser {
                name: name.trim().to_owned(),
                email: Email::parse(email)?,
                employee_id: None,
                role: UserRole::Employee,
                password_hash: None,
            })
            .await
            .map_err(conflict_as_exists)?;

        tracing::info!(user_id = %user.id, "User added");
        Ok(user)
    }

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }
}

/// Treat blank strings like absent fields.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn conflict_as_exists(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::JwtConfig;
    use crate::db::memory::MemoryStore;
    use crate::services::identity::DisabledIdentityProvider;

    fn tokens() -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: SecretString::from("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%"),
            ttl_hours: 1,
        })
    }

    fn registration<'a>(email: &'a str, role: Option<&'a str>) -> Registration<'a> {
        Registration {
            name: Some("Meera Iyer"),
            email: Some(email),
            password: Some("grid-pass-2024"),
            employee_id: Some("PG2001"),
            role,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("grid-pass-2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("grid-pass-2024", &hash).is_ok());
        assert!(verify_password("wrong-pass", &hash).is_err());
    }

    #[tokio::test]
    async fn test_register_accepts_short_password() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);

        let user = auth
            .register(Registration {
                password: Some("abc"),
                ..registration("short@powergrid.in", Some("employee"))
            })
            .await
            .unwrap();

        let outcome = auth
            .login(Some("short@powergrid.in"), Some("abc"), Some("employee"))
            .await
            .unwrap();
        assert_eq!(outcome.user.id, user.id);
    }

    #[tokio::test]
    async fn test_register_normalizes_role() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);

        let user = auth
            .register(registration("meera@powergrid.in", Some("Wizard")))
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Employee);

        let admin = auth
            .register(registration("chief@powergrid.in", Some("ADMIN")))
            .await
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);

        let result = auth
            .register(Registration {
                password: Some("   "),
                ..registration("meera@powergrid.in", None)
            })
            .await;
        assert!(matches!(result, Err(AuthError::MissingFields(_))));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_login_role_is_case_insensitive() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);
        auth.register(registration("meera@powergrid.in", Some("support")))
            .await
            .unwrap();

        let outcome = auth
            .login(
                Some("Meera@PowerGrid.in"),
                Some("grid-pass-2024"),
                Some("Support"),
            )
            .await
            .unwrap();
        assert_eq!(outcome.redirect, "/support-dashboard");
        assert_eq!(tokens.verify(&outcome.token).unwrap().sub, outcome.user.id);
    }

    #[tokio::test]
    async fn test_login_passwordless_user_is_unauthorized() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);
        auth.add_user(Some("Dev Patel"), Some("dev@powergrid.in"))
            .await
            .unwrap();

        let result = auth
            .login(Some("dev@powergrid.in"), Some("anything"), Some("employee"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_unknown_id() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let auth = AuthService::new(&store, &DisabledIdentityProvider, &tokens);

        let result = auth
            .change_password(Some("not-a-uuid"), Some("old-password"), Some("new-password"))
            .await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_change_password_survives_identity_failure() {
        let store = MemoryStore::default();
        let tokens = tokens();
        let identity = crate::services::identity::tests::FailingIdentityProvider;
        let auth = AuthService::new(&store, &identity, &tokens);
        let user = auth
            .register(registration("meera@powergrid.in", None))
            .await
            .unwrap();

        auth.change_password(
            Some(&user.id.to_string()),
            Some("grid-pass-2024"),
            Some("fresh-pass-2025"),
        )
        .await
        .unwrap();

        let hash = store.password_hash(user.id).unwrap();
        assert!(verify_password("fresh-pass-2025", &hash).is_ok());
    }
}
