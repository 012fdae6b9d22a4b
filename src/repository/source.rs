// SPDX-License-Identifier: MPL-2.0

use crate::api::{
    AccessLog, Animal, AnimalCategory, AnimalMetadata, AnimalQuery, AnimalRegistration,
    AnimalSearchSortKey, AnimalSubcategory, Animals, Login, LoginGrant, NameFilter,
};
use crate::repository::RepositoryError;
use crate::state::TokenSink;
use async_trait::async_trait;

/// Device-resident animal storage
#[async_trait]
pub trait AnimalLocalSource: Send + Sync {
    async fn list(&self, query: &AnimalQuery) -> Result<Vec<Animal>, RepositoryError>;

    /// Candidates for "similar animals" when the backend is not consulted
    async fn list_others(&self, id: &str) -> Result<Vec<Animal>, RepositoryError>;

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError>;

    async fn save(&self, animal: &Animal) -> Result<(), RepositoryError>;

    async fn save_batch(&self, animals: &[Animal]) -> Result<(), RepositoryError>;

    async fn remove(&self, id: &str) -> Result<(), RepositoryError>;

    /// Returns false when the animal is not stored locally
    async fn set_like(&self, id: &str, like: i64) -> Result<bool, RepositoryError>;

    async fn replace_metadata(&self, metadata: &AnimalMetadata) -> Result<(), RepositoryError>;

    async fn list_categories(&self) -> Result<Vec<AnimalCategory>, RepositoryError>;

    async fn list_subcategories(
        &self,
        category: Option<&NameFilter>,
    ) -> Result<Vec<AnimalSubcategory>, RepositoryError>;

    async fn list_sort_keys(&self) -> Result<Vec<AnimalSearchSortKey>, RepositoryError>;

    async fn get_category(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalCategory>, RepositoryError>;

    async fn get_subcategory(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalSubcategory>, RepositoryError>;
}

/// Backend animal endpoints; every call needs the credentials pushed in via [`TokenSink`]
#[async_trait]
pub trait AnimalRemoteSource: TokenSink {
    async fn search(&self, query: &AnimalQuery) -> Result<Animals, RepositoryError>;

    async fn search_similar(&self, id: &str) -> Result<Animals, RepositoryError>;

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError>;

    async fn create(&self, registration: &AnimalRegistration) -> Result<Animal, RepositoryError>;

    async fn like(&self, id: &str) -> Result<(), RepositoryError>;

    async fn metadata(&self) -> Result<AnimalMetadata, RepositoryError>;
}

#[async_trait]
pub trait LoginLocalSource: Send + Sync {
    async fn store(&self, login: &Login) -> Result<(), RepositoryError>;

    async fn load(&self) -> Result<Option<Login>, RepositoryError>;

    async fn clear(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait LoginRemoteSource: Send + Sync {
    async fn login(&self, handle_name: &str, password: &str) -> Result<LoginGrant, RepositoryError>;
}

#[async_trait]
pub trait AccessLogRemoteSource: TokenSink {
    async fn post(&self, log: &AccessLog) -> Result<(), RepositoryError>;
}
