use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    client::ApiClient,
    dto::auth::{AuthPayload, LoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    models::{Session, User},
    response::ApiResponse,
    storage::{SessionPersistence, StorageScope},
    validation::{LoginForm, RegisterForm},
};

/// Signed-in user state, mirrored into one storage scope.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
    client: ApiClient,
    persistence: SessionPersistence,
    session: RwLock<Option<Session>>,
}

impl AuthStore {
    pub fn new(client: ApiClient, persistence: SessionPersistence) -> Self {
        Self {
            inner: Arc::new(AuthStoreInner {
                client,
                persistence,
                session: RwLock::new(None),
            }),
        }
    }

    /// Rebuilds the session from storage: durable first, then ephemeral.
    pub async fn restore(&self) -> AppResult<Option<Session>> {
        let restored = self.inner.persistence.restore()?;
        let session = restored.map(|(scope, session)| {
            tracing::debug!(?scope, user_id = session.user.id, "session restored");
            session
        });
        self.set_session(session.clone()).await;
        Ok(session)
    }

    /// Checks the form locally, then signs in. Nothing is sent when the form
    /// is invalid.
    pub async fn login(&self, form: &LoginForm, remember_me: bool) -> AppResult<Session> {
        form.validate().map_err(AppError::Validation)?;
        let url = self.inner.client.endpoint("/api/auth/login")?;
        let payload = LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let response = self.inner.client.post(url, &payload).await;
        self.establish(response, remember_me, "Login failed").await
    }

    pub async fn register(&self, form: &RegisterForm, remember_me: bool) -> AppResult<Session> {
        form.validate().map_err(AppError::Validation)?;
        let url = self.inner.client.endpoint("/api/auth/register")?;
        let payload = RegisterRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password: form.password.clone(),
        };
        let response = self.inner.client.post(url, &payload).await;
        self.establish(response, remember_me, "Register failed").await
    }

    async fn establish(
        &self,
        response: AppResult<ApiResponse<AuthPayload>>,
        remember_me: bool,
        fallback: &str,
    ) -> AppResult<Session> {
        let payload = match response {
            Ok(ApiResponse {
                data: Some(payload),
                ..
            }) => payload,
            Ok(envelope) => return Err(AppError::Auth(envelope.message_or(fallback))),
            Err(AppError::Api { message, .. }) if !message.is_empty() => {
                return Err(AppError::Auth(message));
            }
            Err(err) => {
                tracing::warn!(error = %err, "auth request failed");
                return Err(AppError::Auth(fallback.to_string()));
            }
        };

        let session = Session {
            user: payload.user,
            token: payload.token,
        };
        let scope = StorageScope::from_remember_me(remember_me);
        self.inner.persistence.persist(scope, &session)?;
        self.set_session(Some(session.clone())).await;
        tracing::info!(user_id = session.user.id, ?scope, "signed in");
        Ok(session)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.set_session(None).await;
        self.inner.persistence.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    async fn set_session(&self, session: Option<Session>) {
        let token = session.as_ref().map(|s| s.token.clone());
        *self.inner.session.write().await = session;
        self.inner.client.set_session_token(token).await;
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.session.read().await.is_some()
    }
}
