// SPDX-License-Identifier: MPL-2.0

use crate::api::{
    Animal, AnimalCategory, AnimalMetadata, AnimalQuery, AnimalRegistration, AnimalSearchSortKey,
    AnimalSubcategory, Animals, NameFilter,
};
use crate::config::MEMORY_CACHE_CAPACITY;
use crate::repository::source::{AnimalLocalSource, AnimalRemoteSource};
use crate::repository::{LruCache, RepositoryError};
use std::sync::{Arc, Mutex};

/// How the backend half of a registration went. The local write has already succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteWrite {
    /// The backend accepted it; this is its copy
    Stored(Animal),
    /// No session, so nothing was sent
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registered {
    /// The record now held locally: the backend's copy when stored, else the provisional one
    pub animal: Animal,
    pub remote: RemoteWrite,
}

/// Local-first animal repository with remote fallback and a per-session memory cache.
pub struct AnimalRepository {
    local: Arc<dyn AnimalLocalSource>,
    remote: Arc<dyn AnimalRemoteSource>,
    use_local_data: bool,
    memory: Mutex<LruCache<Animal>>,
}

impl AnimalRepository {
    pub fn new(
        local: Arc<dyn AnimalLocalSource>,
        remote: Arc<dyn AnimalRemoteSource>,
        use_local_data: bool,
    ) -> Self {
        Self {
            local,
            remote,
            use_local_data,
            memory: Mutex::new(LruCache::new(MEMORY_CACHE_CAPACITY)),
        }
    }

    pub fn uses_local_data(&self) -> bool {
        self.use_local_data
    }

    fn memory(&self) -> std::sync::MutexGuard<'_, LruCache<Animal>> {
        self.memory.lock().expect("memory cache lock poisoned")
    }

    fn remember(&self, animals: &[Animal]) {
        let mut memory = self.memory();
        for animal in animals {
            memory.insert(animal.id.clone(), animal.clone());
        }
    }

    /// Memory first, then whichever source the local-data flag selects
    pub async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError> {
        let cached = self.memory().get(id);
        if cached.is_some() {
            return Ok(cached);
        }

        let animal = if self.use_local_data {
            self.local.get(id).await?
        } else {
            self.remote.get(id).await?
        };

        if let Some(animal) = &animal {
            self.remember(std::slice::from_ref(animal));
        } else {
            tracing::debug!("animal {id} not found");
        }
        Ok(animal)
    }

    /// Local results when enabled and non-empty, otherwise the backend's page
    pub async fn list(&self, query: &AnimalQuery) -> Result<Animals, RepositoryError> {
        if self.use_local_data {
            let local = self.local.list(query).await?;
            if !local.is_empty() {
                tracing::debug!("listing {} animals from local store", local.len());
                self.remember(&local);
                return Ok(Animals::from_list(local, &query.sort_by, query.offset));
            }
        }

        let page = self.remote.search(query).await?;
        tracing::debug!(
            "listing {} animals from backend (search {})",
            page.animals.len(),
            page.search_id
        );
        self.remember(&page.animals);
        Ok(page)
    }

    /// Animals that look like `id`
    pub async fn search_similar(&self, id: &str) -> Result<Animals, RepositoryError> {
        if self.use_local_data {
            let local = self.local.list_others(id).await?;
            if !local.is_empty() {
                return Ok(Animals::from_list(local, "image_similarity", 0));
            }
        }

        let page = self.remote.search_similar(id).await?;
        self.remember(&page.animals);
        Ok(page)
    }

    /// Write through to the local store and the memory cache
    pub async fn save(&self, animal: &Animal) -> Result<(), RepositoryError> {
        self.local.save(animal).await?;
        self.remember(std::slice::from_ref(animal));
        Ok(())
    }

    pub async fn save_all(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        self.local.save_batch(animals).await?;
        self.remember(animals);
        Ok(())
    }

    /// Save a new listing locally, then post it to the backend when signed in
    pub async fn register(
        &self,
        registration: &AnimalRegistration,
    ) -> Result<Registered, RepositoryError> {
        let provisional = Animal {
            id: Animal::generate_id(),
            name: registration.name.clone(),
            description: registration.description.clone(),
            like: 0,
            photo_url: registration.photo_file_name.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            animal_category_name_en: None,
            animal_category_name_ja: None,
            animal_subcategory_name_en: None,
            animal_subcategory_name_ja: None,
            user_handle_name: None,
        };
        tracing::info!("registering animal {} ({})", provisional.id, provisional.name);
        self.save(&provisional).await?;

        if !self.remote.has_credentials() {
            tracing::info!("not signed in; {} kept locally only", provisional.id);
            return Ok(Registered {
                animal: provisional,
                remote: RemoteWrite::Skipped,
            });
        }

        match self.remote.create(registration).await {
            Ok(stored) => {
                // The backend assigns its own id; its record replaces the provisional one.
                // Local cleanup failures are only logged once the backend holds the animal.
                self.memory().remove(&provisional.id);
                if let Err(e) = self.local.remove(&provisional.id).await {
                    tracing::warn!("failed to drop provisional animal {}: {e}", provisional.id);
                }
                if let Err(e) = self.save(&stored).await {
                    tracing::warn!("failed to cache registered animal {}: {e}", stored.id);
                }
                Ok(Registered {
                    animal: stored.clone(),
                    remote: RemoteWrite::Stored(stored),
                })
            }
            Err(e) => {
                tracing::warn!("backend rejected registration of {}: {e}", provisional.id);
                Ok(Registered {
                    animal: provisional,
                    remote: RemoteWrite::Failed(e.to_string()),
                })
            }
        }
    }

    /// Like on the backend, then bump the count wherever the animal is cached
    pub async fn like(&self, id: &str) -> Result<(), RepositoryError> {
        self.remote.like(id).await?;

        let mut bumped = None;
        self.memory().update(id, |animal| {
            animal.like += 1;
            bumped = Some(animal.like);
        });

        let like = match bumped {
            Some(like) => Some(like),
            None => self.local.get(id).await?.map(|a| a.like + 1),
        };
        if let Some(like) = like {
            self.local.set_like(id, like).await?;
        }
        Ok(())
    }

    /// Refresh cached metadata from the backend when `refresh` is set
    pub async fn load_metadata(&self, refresh: bool) -> Result<(), RepositoryError> {
        if !refresh {
            return Ok(());
        }
        let metadata = self.remote.metadata().await?;
        tracing::info!(
            "caching metadata: {} categories, {} subcategories, {} sort keys",
            metadata.categories.len(),
            metadata.subcategories.len(),
            metadata.sort_keys.len()
        );
        self.local.replace_metadata(&metadata).await
    }

    pub async fn list_categories(&self) -> Result<Vec<AnimalCategory>, RepositoryError> {
        let data = self.local.list_categories().await?;
        if !data.is_empty() {
            return Ok(data);
        }
        self.load_metadata(true).await?;
        self.local.list_categories().await
    }

    pub async fn list_subcategories(
        &self,
        category: Option<&NameFilter>,
    ) -> Result<Vec<AnimalSubcategory>, RepositoryError> {
        let data = self.local.list_subcategories(category).await?;
        if !data.is_empty() {
            return Ok(data);
        }
        self.load_metadata(true).await?;
        self.local.list_subcategories(category).await
    }

    pub async fn list_sort_keys(&self) -> Result<Vec<AnimalSearchSortKey>, RepositoryError> {
        let data = self.local.list_sort_keys().await?;
        if !data.is_empty() {
            return Ok(data);
        }
        self.load_metadata(true).await?;
        self.local.list_sort_keys().await
    }

    pub async fn get_category(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalCategory>, RepositoryError> {
        if let Some(category) = self.local.get_category(filter).await? {
            return Ok(Some(category));
        }
        let metadata = self.remote_metadata().await?;
        Ok(metadata
            .categories
            .into_iter()
            .find(|c| filter.matches(&c.name_en, &c.name_ja)))
    }

    pub async fn get_subcategory(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalSubcategory>, RepositoryError> {
        if let Some(subcategory) = self.local.get_subcategory(filter).await? {
            return Ok(Some(subcategory));
        }
        let metadata = self.remote_metadata().await?;
        Ok(metadata
            .subcategories
            .into_iter()
            .find(|s| filter.matches(&s.name_en, &s.name_ja)))
    }

    async fn remote_metadata(&self) -> Result<AnimalMetadata, RepositoryError> {
        let metadata = self.remote.metadata().await?;
        self.local.replace_metadata(&metadata).await?;
        Ok(metadata)
    }

    /// Forget everything cached in memory for this session
    pub fn clear_memory(&self) {
        self.memory().clear();
    }
}
