// SPDX-License-Identifier: MPL-2.0

use crate::api::{
    Animal, AnimalCategory, AnimalMetadata, AnimalQuery, AnimalSearchSortKey, AnimalSubcategory,
    Login, NameFilter,
};
use crate::cache::{AnimalCache, CacheDb, CacheError, LoginCache, MetadataCache};
use crate::config::DEFAULT_PAGE_LIMIT;
use crate::repository::RepositoryError;
use crate::repository::source::{AnimalLocalSource, LoginLocalSource};
use async_trait::async_trait;

/// Run a cache operation on the blocking pool so SQLite never stalls the async workers
async fn blocking<T, F>(db: &CacheDb, op: F) -> Result<T, RepositoryError>
where
    F: FnOnce(&CacheDb) -> Result<T, CacheError> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || op(&db))
        .await
        .map_err(|e| RepositoryError::Task(e.to_string()))?
        .map_err(RepositoryError::from)
}

/// Turn the cache's NotFound into a plain miss
fn found<T>(result: Result<T, CacheError>) -> Result<Option<T>, CacheError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CacheError::NotFound) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Animal storage backed by the SQLite cache
#[derive(Clone)]
pub struct SqliteAnimalSource {
    db: CacheDb,
}

impl SqliteAnimalSource {
    pub fn new(db: CacheDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnimalLocalSource for SqliteAnimalSource {
    async fn list(&self, query: &AnimalQuery) -> Result<Vec<Animal>, RepositoryError> {
        let query = query.clone();
        blocking(&self.db, move |db| {
            AnimalCache::new(db).list(&query, DEFAULT_PAGE_LIMIT)
        })
        .await
    }

    async fn list_others(&self, id: &str) -> Result<Vec<Animal>, RepositoryError> {
        let id = id.to_string();
        blocking(&self.db, move |db| {
            AnimalCache::new(db).list_others(&id, DEFAULT_PAGE_LIMIT)
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError> {
        let id = id.to_string();
        blocking(&self.db, move |db| found(AnimalCache::new(db).get(&id))).await
    }

    async fn save(&self, animal: &Animal) -> Result<(), RepositoryError> {
        let animal = animal.clone();
        blocking(&self.db, move |db| AnimalCache::new(db).store(&animal)).await
    }

    async fn save_batch(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        let animals = animals.to_vec();
        blocking(&self.db, move |db| AnimalCache::new(db).store_batch(&animals)).await
    }

    async fn remove(&self, id: &str) -> Result<(), RepositoryError> {
        let id = id.to_string();
        blocking(&self.db, move |db| AnimalCache::new(db).remove(&id).map(|_| ())).await
    }

    async fn set_like(&self, id: &str, like: i64) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        blocking(&self.db, move |db| AnimalCache::new(db).set_like(&id, like)).await
    }

    async fn replace_metadata(&self, metadata: &AnimalMetadata) -> Result<(), RepositoryError> {
        let metadata = metadata.clone();
        blocking(&self.db, move |db| MetadataCache::new(db).replace(&metadata)).await
    }

    async fn list_categories(&self) -> Result<Vec<AnimalCategory>, RepositoryError> {
        blocking(&self.db, |db| MetadataCache::new(db).list_categories()).await
    }

    async fn list_subcategories(
        &self,
        category: Option<&NameFilter>,
    ) -> Result<Vec<AnimalSubcategory>, RepositoryError> {
        let category = category.cloned();
        blocking(&self.db, move |db| {
            MetadataCache::new(db).list_subcategories(category.as_ref())
        })
        .await
    }

    async fn list_sort_keys(&self) -> Result<Vec<AnimalSearchSortKey>, RepositoryError> {
        blocking(&self.db, |db| MetadataCache::new(db).list_sort_keys()).await
    }

    async fn get_category(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalCategory>, RepositoryError> {
        let filter = filter.clone();
        blocking(&self.db, move |db| {
            found(MetadataCache::new(db).get_category(&filter))
        })
        .await
    }

    async fn get_subcategory(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalSubcategory>, RepositoryError> {
        let filter = filter.clone();
        blocking(&self.db, move |db| {
            found(MetadataCache::new(db).get_subcategory(&filter))
        })
        .await
    }
}

/// Login storage backed by the SQLite cache
#[derive(Clone)]
pub struct SqliteLoginSource {
    db: CacheDb,
}

impl SqliteLoginSource {
    pub fn new(db: CacheDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginLocalSource for SqliteLoginSource {
    async fn store(&self, login: &Login) -> Result<(), RepositoryError> {
        let login = login.clone();
        blocking(&self.db, move |db| LoginCache::new(db).store(&login)).await
    }

    async fn load(&self) -> Result<Option<Login>, RepositoryError> {
        blocking(&self.db, |db| found(LoginCache::new(db).get())).await
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        blocking(&self.db, |db| LoginCache::new(db).clear().map(|_| ())).await
    }
}
