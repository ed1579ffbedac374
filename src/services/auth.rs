//! Login sessions and password verification

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{SessionClaims, User},
    repository::Repository,
};

use super::session::SessionStore;

/// Outcome of a successful login
#[derive(Debug)]
pub struct LoginSession {
    pub token: String,
    pub claims: SessionClaims,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    sessions: Arc<dyn SessionStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, sessions: Arc<dyn SessionStore>, config: AuthConfig) -> Self {
        Self {
            repository,
            sessions,
            config,
        }
    }

    /// Verify credentials, open a session and sign its token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginSession> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!("Failed login for {}", username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let permissions = self.repository.users.get_permissions(user.id).await?;

        let sid = Uuid::new_v4().simple().to_string();
        self.sessions.create(&sid, user.id).await?;

        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user.username.clone(),
            user_id: user.id,
            sid,
            is_superuser: user.is_superuser,
            permissions,
            exp: now + self.config.session_ttl_seconds() as i64,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        self.repository.users.touch_last_login(user.id).await?;
        tracing::info!("User {} logged in", user.username);

        Ok(LoginSession {
            token,
            claims,
            user,
        })
    }

    /// Resolve a token to its claims, provided the session is still open
    pub async fn authenticate(&self, token: &str) -> AppResult<Option<SessionClaims>> {
        let claims = match SessionClaims::from_token(token, &self.config.jwt_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                return Ok(None);
            }
        };

        match self.sessions.user_id(&claims.sid).await? {
            Some(user_id) if user_id == claims.user_id => Ok(Some(claims)),
            _ => Ok(None),
        }
    }

    pub async fn logout(&self, claims: &SessionClaims) -> AppResult<()> {
        self.sessions.destroy(&claims.sid).await?;
        tracing::info!("User {} logged out", claims.sub);
        Ok(())
    }
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUsersRepository;
    use crate::services::session::MockSessionStore;
    use crate::test_util::{hash_password, MockRepository};

    fn user(password: &str, is_active: bool) -> User {
        User {
            id: 3,
            username: "librarian".to_string(),
            password: hash_password(password),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_active,
            is_superuser: false,
        }
    }

    fn service(users: MockUsersRepository, sessions: MockSessionStore) -> AuthService {
        let mut repository = MockRepository::default();
        repository.users = users;
        AuthService::new(repository.build(), Arc::new(sessions), AuthConfig::default())
    }

    #[tokio::test]
    async fn login_opens_session_and_signs_token() {
        let mut users = MockUsersRepository::new();
        let stored = user("secret", true);
        users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_get_permissions()
            .returning(|_| Ok(vec!["catalog.can_mark_returned".to_string()]));
        users.expect_touch_last_login().returning(|_| Ok(()));

        let mut sessions = MockSessionStore::new();
        sessions
            .expect_create()
            .withf(|_, user_id| *user_id == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        let session = service(users, sessions).login("librarian", "secret").await.unwrap();
        let claims = SessionClaims::from_token(&session.token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.user_id, 3);
        assert_eq!(claims.sid, session.claims.sid);
        assert_eq!(claims.permissions, vec!["catalog.can_mark_returned".to_string()]);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_session() {
        let mut users = MockUsersRepository::new();
        let stored = user("secret", true);
        users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let mut sessions = MockSessionStore::new();
        sessions.expect_create().never();

        let result = service(users, sessions).login("librarian", "guess").await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn inactive_users_cannot_log_in() {
        let mut users = MockUsersRepository::new();
        let stored = user("secret", false);
        users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = service(users, MockSessionStore::new())
            .login("librarian", "secret")
            .await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn destroyed_session_no_longer_authenticates() {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "librarian".to_string(),
            user_id: 3,
            sid: "gone".to_string(),
            is_superuser: false,
            permissions: vec![],
            exp: now + 60,
            iat: now,
        };
        let token = claims.create_token(&AuthConfig::default().jwt_secret).unwrap();

        let mut sessions = MockSessionStore::new();
        sessions.expect_user_id().returning(|_| Ok(None));

        let resolved = service(MockUsersRepository::new(), sessions)
            .authenticate(&token)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
