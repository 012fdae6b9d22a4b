// SPDX-License-Identifier: MPL-2.0

use crate::api::{
    AccessLog, Animal, AnimalMetadata, AnimalQuery, AnimalRegistration, Animals, AnimalsClient,
    ClientError, Credentials, LoginGrant,
};
use crate::repository::RepositoryError;
use crate::repository::source::{AccessLogRemoteSource, AnimalRemoteSource, LoginRemoteSource};
use crate::state::TokenSink;
use async_trait::async_trait;
use std::sync::RwLock;

/// Per-source copy of the session credentials
#[derive(Default)]
struct CredentialSlot(RwLock<Option<Credentials>>);

impl CredentialSlot {
    fn set(&self, credentials: Option<Credentials>) {
        *self.0.write().expect("credentials lock poisoned") = credentials;
    }

    fn get(&self) -> Result<Credentials, RepositoryError> {
        self.0
            .read()
            .expect("credentials lock poisoned")
            .clone()
            .ok_or(RepositoryError::Client(ClientError::NotAuthenticated))
    }

    fn is_set(&self) -> bool {
        self.0.read().expect("credentials lock poisoned").is_some()
    }
}

/// Animal endpoints of the backend
pub struct HttpAnimalSource {
    client: AnimalsClient,
    credentials: CredentialSlot,
}

impl HttpAnimalSource {
    pub fn new(client: AnimalsClient) -> Self {
        Self {
            client,
            credentials: CredentialSlot::default(),
        }
    }
}

impl TokenSink for HttpAnimalSource {
    fn set_credentials(&self, credentials: Option<Credentials>) {
        self.credentials.set(credentials);
    }

    fn has_credentials(&self) -> bool {
        self.credentials.is_set()
    }
}

#[async_trait]
impl AnimalRemoteSource for HttpAnimalSource {
    async fn search(&self, query: &AnimalQuery) -> Result<Animals, RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.search(&creds.token, query).await?)
    }

    async fn search_similar(&self, id: &str) -> Result<Animals, RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.search_similar(&creds.token, id).await?)
    }

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.get_animal(&creds.token, id).await?)
    }

    async fn create(&self, registration: &AnimalRegistration) -> Result<Animal, RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.create_animal(&creds, registration).await?)
    }

    async fn like(&self, id: &str) -> Result<(), RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.like(&creds, id).await?)
    }

    async fn metadata(&self) -> Result<AnimalMetadata, RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.metadata(&creds.token).await?)
    }
}

/// Login endpoint; unauthenticated, so it holds no token
pub struct HttpLoginSource {
    client: AnimalsClient,
}

impl HttpLoginSource {
    pub fn new(client: AnimalsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoginRemoteSource for HttpLoginSource {
    async fn login(&self, handle_name: &str, password: &str) -> Result<LoginGrant, RepositoryError> {
        Ok(self.client.login(handle_name, password).await?)
    }
}

/// Access log endpoint
pub struct HttpAccessLogSource {
    client: AnimalsClient,
    credentials: CredentialSlot,
}

impl HttpAccessLogSource {
    pub fn new(client: AnimalsClient) -> Self {
        Self {
            client,
            credentials: CredentialSlot::default(),
        }
    }
}

impl TokenSink for HttpAccessLogSource {
    fn set_credentials(&self, credentials: Option<Credentials>) {
        self.credentials.set(credentials);
    }

    fn has_credentials(&self) -> bool {
        self.credentials.is_set()
    }
}

#[async_trait]
impl AccessLogRemoteSource for HttpAccessLogSource {
    async fn post(&self, log: &AccessLog) -> Result<(), RepositoryError> {
        let creds = self.credentials.get()?;
        Ok(self.client.post_access_log(&creds.token, log).await?)
    }
}
