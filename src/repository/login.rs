// SPDX-License-Identifier: MPL-2.0

use crate::api::Login;
use crate::repository::RepositoryError;
use crate::repository::source::{LoginLocalSource, LoginRemoteSource};
use crate::state::{SessionHub, TokenSink};
use chrono::Utc;
use std::sync::Arc;

/// Owns the session: signs in, restores and signs out, keeping every token sink in step.
pub struct LoginRepository {
    local: Arc<dyn LoginLocalSource>,
    remote: Arc<dyn LoginRemoteSource>,
    session: SessionHub,
}

impl LoginRepository {
    pub fn new(local: Arc<dyn LoginLocalSource>, remote: Arc<dyn LoginRemoteSource>) -> Self {
        Self {
            local,
            remote,
            session: SessionHub::new(),
        }
    }

    /// Add a source that should carry the session token
    pub fn register_sink(&self, sink: Arc<dyn TokenSink>) {
        self.session.register(sink);
    }

    pub async fn login(&self, handle_name: &str, password: &str) -> Result<Login, RepositoryError> {
        let grant = match self.remote.login(handle_name, password).await {
            Ok(grant) => grant,
            Err(e) => {
                tracing::warn!("login failed for {handle_name}: {e}");
                return Err(e);
            }
        };

        let login = Login {
            user_id: grant.user_id,
            handle_name: handle_name.to_string(),
            email_address: String::new(),
            token: grant.token,
            last_login_at: Utc::now(),
        };
        self.local.store(&login).await?;
        self.session.activate(login.clone());
        tracing::info!("logged in as {handle_name}");
        Ok(login)
    }

    /// The active session, restoring a stored login if there is no session in memory
    pub async fn is_logged_in(&self) -> Result<Option<Login>, RepositoryError> {
        if let Some(login) = self.session.current() {
            return Ok(Some(login));
        }

        let stored = self.local.load().await?;
        if let Some(login) = &stored {
            tracing::info!("restored session for {}", login.handle_name);
            self.session.activate(login.clone());
        }
        Ok(stored)
    }

    pub async fn logout(&self) -> Result<(), RepositoryError> {
        self.local.clear().await?;
        self.session.clear();
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fakes::{
        FakeAccessLogRemote, FakeAnimalRemote, FakeLoginLocal, FakeLoginRemote, login,
    };

    struct Fixture {
        repo: LoginRepository,
        local: Arc<FakeLoginLocal>,
        remote: Arc<FakeLoginRemote>,
        animals: Arc<FakeAnimalRemote>,
        access_log: Arc<FakeAccessLogRemote>,
    }

    fn fixture() -> Fixture {
        let local = Arc::new(FakeLoginLocal::default());
        let remote = Arc::new(FakeLoginRemote::accepting("shibuya", "password"));
        let repo = LoginRepository::new(local.clone(), remote.clone());
        let animals = Arc::new(FakeAnimalRemote::default());
        let access_log = Arc::new(FakeAccessLogRemote::default());
        repo.register_sink(animals.clone());
        repo.register_sink(access_log.clone());
        Fixture {
            repo,
            local,
            remote,
            animals,
            access_log,
        }
    }

    #[tokio::test]
    async fn test_login_pushes_token_to_every_sink() {
        let f = fixture();
        let login = f.repo.login("shibuya", "password").await.unwrap();

        assert_eq!(login.token, "token-for-shibuya");
        assert_eq!(f.animals.token().as_deref(), Some("token-for-shibuya"));
        assert_eq!(f.access_log.token().as_deref(), Some("token-for-shibuya"));
        assert_eq!(f.local.stored().map(|l| l.user_id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_failed_login_changes_nothing() {
        let f = fixture();
        let err = f.repo.login("shibuya", "wrong").await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));

        f.remote.fail_with_network_error();
        assert!(f.repo.login("shibuya", "password").await.is_err());

        assert!(f.animals.token().is_none());
        assert!(f.access_log.token().is_none());
        assert_eq!(f.local.calls("store"), 0);
        assert!(f.repo.is_logged_in().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_login_is_restored_and_propagated() {
        let f = fixture();
        f.local.seed(login("stored-token"));

        let restored = f.repo.is_logged_in().await.unwrap();
        assert_eq!(restored.map(|l| l.token), Some("stored-token".to_string()));
        assert_eq!(f.animals.token().as_deref(), Some("stored-token"));

        // memory session answers from now on
        f.repo.is_logged_in().await.unwrap();
        assert_eq!(f.local.calls("load"), 1);
    }

    #[tokio::test]
    async fn test_logout_retracts_tokens() {
        let f = fixture();
        f.repo.login("shibuya", "password").await.unwrap();
        f.repo.logout().await.unwrap();

        assert!(f.animals.token().is_none());
        assert!(f.access_log.token().is_none());
        assert!(f.local.stored().is_none());
        assert!(f.repo.is_logged_in().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sink_registered_after_login_gets_token() {
        let f = fixture();
        f.repo.login("shibuya", "password").await.unwrap();
        let late = Arc::new(FakeAnimalRemote::default());
        f.repo.register_sink(late.clone());
        assert_eq!(late.token().as_deref(), Some("token-for-shibuya"));
    }
}
