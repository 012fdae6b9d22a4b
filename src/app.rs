// SPDX-License-Identifier: MPL-2.0

use crate::api::{AccessAction, AccessLog, AnimalQuery, Animals, AnimalsClient, Login};
use crate::cache::CacheDb;
use crate::config::APP_NAME;
use crate::repository::{
    AccessLogRemoteSource, AccessLogRepository, AnimalLocalSource, AnimalRemoteSource,
    AnimalRepository, HttpAccessLogSource, HttpAnimalSource, HttpLoginSource, LoginLocalSource,
    LoginRemoteSource, LoginRepository, RepositoryError, SqliteAnimalSource, SqliteLoginSource,
};
use crate::state::ClientSettings;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Composition root: builds every source and repository once and wires the session through them.
pub struct AnimalsApp {
    settings: ClientSettings,
    animals: Arc<AnimalRepository>,
    login: Arc<LoginRepository>,
    access_log: AccessLogRepository,
}

impl AnimalsApp {
    /// Open the on-disk cache and connect to the configured backend
    pub fn open(settings: ClientSettings) -> Result<Self, RepositoryError> {
        let db = CacheDb::open_default(settings.data_dir.as_deref())?;
        Self::with_db(settings, db)
    }

    pub fn with_db(settings: ClientSettings, db: CacheDb) -> Result<Self, RepositoryError> {
        let client = AnimalsClient::new(&settings.api_base_url, settings.request_timeout())?;
        tracing::info!(
            "{APP_NAME} backend {} (local data: {})",
            settings.api_base_url,
            settings.use_local_data
        );

        Ok(Self::from_parts(
            settings,
            Arc::new(SqliteAnimalSource::new(db.clone())),
            Arc::new(HttpAnimalSource::new(client.clone())),
            Arc::new(SqliteLoginSource::new(db)),
            Arc::new(HttpLoginSource::new(client.clone())),
            Arc::new(HttpAccessLogSource::new(client)),
        ))
    }

    /// Wire arbitrary sources together; the remote animal and access-log sources receive the session token
    pub fn from_parts<R, A>(
        settings: ClientSettings,
        animal_local: Arc<dyn AnimalLocalSource>,
        animal_remote: Arc<R>,
        login_local: Arc<dyn LoginLocalSource>,
        login_remote: Arc<dyn LoginRemoteSource>,
        access_log_remote: Arc<A>,
    ) -> Self
    where
        R: AnimalRemoteSource + 'static,
        A: AccessLogRemoteSource + 'static,
    {
        let login = LoginRepository::new(login_local, login_remote);
        login.register_sink(animal_remote.clone());
        login.register_sink(access_log_remote.clone());

        let animals = AnimalRepository::new(animal_local, animal_remote, settings.use_local_data);

        Self {
            settings,
            animals: Arc::new(animals),
            login: Arc::new(login),
            access_log: AccessLogRepository::new(access_log_remote),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn animals(&self) -> &AnimalRepository {
        &self.animals
    }

    pub fn login(&self) -> &LoginRepository {
        &self.login
    }

    pub fn access_log(&self) -> &AccessLogRepository {
        &self.access_log
    }

    /// Pick up a stored login, if any, and propagate its token
    pub async fn restore_session(&self) -> Option<Login> {
        match self.login.is_logged_in().await {
            Ok(login) => login,
            Err(e) => {
                tracing::error!("failed to restore session: {e}");
                None
            }
        }
    }

    /// List animals, treating any failure as an empty page
    pub async fn browse(&self, query: &AnimalQuery) -> Animals {
        match self.animals.list(query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("failed to list animals: {e}");
                Animals::from_list(Vec::new(), &query.sort_by, query.offset)
            }
        }
    }

    /// Similar animals, treating any failure as an empty page
    pub async fn similar(&self, id: &str) -> Animals {
        match self.animals.search_similar(id).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("failed to find animals similar to {id}: {e}");
                Animals::default()
            }
        }
    }

    /// Post an access log in the background; the caller never waits on the backend
    pub fn record_access(&self, log: AccessLog) -> JoinHandle<()> {
        let access_log = self.access_log.clone();
        tokio::spawn(async move { access_log.record(&log).await })
    }

    /// Describe an interaction with `animal_id` as it appeared in `page`, resolving
    /// the query's category names to ids from the metadata cache
    pub async fn access_log_for(
        &self,
        page: &Animals,
        query: &AnimalQuery,
        animal_id: &str,
        action: AccessAction,
    ) -> AccessLog {
        let animal_category_id = match &query.category {
            Some(filter) => match self.animals.get_category(filter).await {
                Ok(category) => category.map(|c| c.id),
                Err(e) => {
                    tracing::debug!("could not resolve category {}: {e}", filter.value());
                    None
                }
            },
            None => None,
        };
        let animal_subcategory_id = match &query.subcategory {
            Some(filter) => match self.animals.get_subcategory(filter).await {
                Ok(subcategory) => subcategory.map(|s| s.id),
                Err(e) => {
                    tracing::debug!("could not resolve subcategory {}: {e}", filter.value());
                    None
                }
            },
            None => None,
        };

        let sort_by = if page.sort_by.is_empty() {
            query.sort_by.clone()
        } else {
            page.sort_by.clone()
        };

        AccessLog {
            search_id: page.search_id.clone(),
            phrases: query.phrases(),
            animal_category_id,
            animal_subcategory_id,
            sort_by,
            model_name: page.model_name.clone(),
            animal_id: animal_id.to_string(),
            action,
        }
    }

    /// Like an animal and report the like to the access log
    pub async fn like(
        &self,
        page: &Animals,
        query: &AnimalQuery,
        animal_id: &str,
    ) -> Result<(), RepositoryError> {
        if let Err(e) = self.animals.like(animal_id).await {
            tracing::warn!("failed to like {animal_id}: {e}");
            return Err(e);
        }
        let log = self
            .access_log_for(page, query, animal_id, AccessAction::Like)
            .await;
        self.record_access(log);
        Ok(())
    }
}
