//! Login state, registration and the token guard every game page checks.

use std::sync::Arc;

use tracing::{info, warn};

use lingo_core::model::{AuthIdentity, DEFAULT_ROLE};
use lingo_core::validation::{require_text, validate_email, validate_password};
use storage::repository::{ClientStateRepository, StateKey};

use crate::api::{AuthBackend, RegisterRequest};
use crate::error::ApiError;

/// Reads the stored bearer token on behalf of a page.
#[derive(Clone)]
pub struct AuthGuard {
    state: Arc<dyn ClientStateRepository>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(state: Arc<dyn ClientStateRepository>) -> Self {
        Self { state }
    }

    /// Token for authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthMissing` when no token is stored. Callers
    /// should send the player to the login view.
    pub async fn require_token(&self) -> Result<String, ApiError> {
        match self.state.get(StateKey::Token).await? {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => {
                warn!("no auth token stored, redirecting to login");
                Err(ApiError::AuthMissing)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, ApiError> {
        match self.require_token().await {
            Ok(_) => Ok(true),
            Err(ApiError::AuthMissing) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Registration form input, checked before anything is sent.
#[derive(Clone, Default)]
pub struct RegisterDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterDraft {
    /// # Errors
    ///
    /// Returns `ApiError::ValidationFailure` for a blank username, a
    /// malformed email or a short password.
    pub fn validate(&self) -> Result<RegisterRequest, ApiError> {
        let username = require_text("username", &self.username)?;
        let email = validate_email(&self.email)?;
        let password = validate_password(&self.password)?;
        Ok(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for RegisterDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterDraft")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Talks to the auth endpoints and keeps the stored identity in sync.
#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    state: Arc<dyn ClientStateRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(backend: Arc<dyn AuthBackend>, state: Arc<dyn ClientStateRepository>) -> Self {
        Self { backend, state }
    }

    #[must_use]
    pub fn guard(&self) -> AuthGuard {
        AuthGuard::new(Arc::clone(&self.state))
    }

    /// Log in and store token, username and role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ValidationFailure` for blank credentials before any
    /// request, `ApiError::ServerRejected` for bad credentials and
    /// `ApiError::Storage` if the identity cannot be saved.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthIdentity, ApiError> {
        let username = require_text("username", username)?;
        require_text("password", password)?;

        let dto = self.backend.login(username, password).await?;
        let identity = AuthIdentity {
            token: dto.token,
            username: dto.username,
            role: dto
                .role
                .filter(|role| !role.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        };

        self.state.set(StateKey::Token, &identity.token).await?;
        self.state.set(StateKey::Username, &identity.username).await?;
        self.state.set(StateKey::Role, &identity.role).await?;
        info!(username = %identity.username, role = %identity.role, "logged in");
        Ok(identity)
    }

    /// # Errors
    ///
    /// Returns `ApiError::ValidationFailure` before any request when the
    /// draft is invalid, otherwise the backend's error.
    pub async fn register(&self, draft: &RegisterDraft) -> Result<(), ApiError> {
        let request = draft.validate()?;
        self.backend.register(&request).await?;
        info!(username = %request.username, "registered");
        Ok(())
    }

    /// Forget the stored identity. Preferences are kept.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be written.
    pub async fn logout(&self) -> Result<(), ApiError> {
        for key in [StateKey::Token, StateKey::Username, StateKey::Role] {
            self.state.remove(key).await?;
        }
        info!("logged out");
        Ok(())
    }

    /// The stored identity, if a token is present.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub async fn current_identity(&self) -> Result<Option<AuthIdentity>, ApiError> {
        let Some(token) = self.state.get(StateKey::Token).await? else {
            return Ok(None);
        };
        let username = self.state.get(StateKey::Username).await?.unwrap_or_default();
        let role = self
            .state
            .get(StateKey::Role)
            .await?
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());
        Ok(Some(AuthIdentity {
            token,
            username,
            role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::validation::ValidationError;
    use storage::repository::InMemoryRepository;

    use crate::api::InMemoryBackend;

    fn service(backend: InMemoryBackend) -> (AuthService, Arc<InMemoryRepository>) {
        let state = Arc::new(InMemoryRepository::new());
        (AuthService::new(Arc::new(backend), state.clone()), state)
    }

    #[tokio::test]
    async fn guard_rejects_missing_token() {
        let guard = AuthGuard::new(Arc::new(InMemoryRepository::new()));
        let err = guard.require_token().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(!guard.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn login_stores_identity_and_logout_clears_it() {
        let backend = InMemoryBackend::new().with_user("ana", "secret1", "admin");
        let (auth, state) = service(backend);

        let identity = auth.login("ana", "secret1").await.unwrap();
        assert_eq!(identity.role, "admin");
        assert_eq!(
            state.get(StateKey::Token).await.unwrap().as_deref(),
            Some(identity.token.as_str())
        );
        assert!(auth.guard().is_logged_in().await.unwrap());

        auth.logout().await.unwrap();
        assert_eq!(auth.current_identity().await.unwrap(), None);
        assert_eq!(state.get(StateKey::Role).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let backend = InMemoryBackend::new().with_user("ana", "secret1", "user");
        let (auth, _) = service(backend);
        let err = auth.login("ana", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerRejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_backend() {
        let backend = InMemoryBackend::new();
        let (auth, _) = service(backend.clone());
        let draft = RegisterDraft {
            username: "ana".into(),
            email: "ana@example".into(),
            password: "secret1".into(),
        };

        let err = auth.register(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::ValidationFailure(ValidationError::InvalidEmail)
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let backend = InMemoryBackend::new().with_user("ana", "secret1", "user");
        let (auth, _) = service(backend);
        let draft = RegisterDraft {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "secret1".into(),
        };
        let err = auth.register(&draft).await.unwrap_err();
        assert!(matches!(err, ApiError::ServerRejected { status: 409, .. }));
    }
}
