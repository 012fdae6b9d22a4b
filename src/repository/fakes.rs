// SPDX-License-Identifier: MPL-2.0

//! In-memory sources with call counters for repository tests.

use crate::api::{
    AccessLog, Animal, AnimalCategory, AnimalMetadata, AnimalQuery, AnimalRegistration,
    AnimalSearchSortKey, AnimalSubcategory, Animals, ClientError, Credentials, Login, LoginGrant,
    NameFilter,
};
use crate::cache::CacheError;
use crate::repository::RepositoryError;
use crate::repository::source::{
    AccessLogRemoteSource, AnimalLocalSource, AnimalRemoteSource, LoginLocalSource,
    LoginRemoteSource,
};
use crate::state::TokenSink;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn animal(id: &str) -> Animal {
    Animal {
        id: id.to_string(),
        name: format!("animal {id}"),
        description: "fluffy".to_string(),
        like: 0,
        photo_url: format!("https://img/{id}.jpg"),
        created_at: "2021-11-24T00:00:00+00:00".to_string(),
        animal_category_name_en: None,
        animal_category_name_ja: None,
        animal_subcategory_name_en: None,
        animal_subcategory_name_ja: None,
        user_handle_name: None,
    }
}

pub fn metadata() -> AnimalMetadata {
    AnimalMetadata {
        categories: vec![
            AnimalCategory {
                id: 1,
                name_en: "cat".to_string(),
                name_ja: "ネコ".to_string(),
            },
            AnimalCategory {
                id: 2,
                name_en: "dog".to_string(),
                name_ja: "イヌ".to_string(),
            },
        ],
        subcategories: vec![
            AnimalSubcategory {
                id: 10,
                animal_category_id: 1,
                name_en: "mix".to_string(),
                name_ja: "ミックス".to_string(),
            },
            AnimalSubcategory {
                id: 20,
                animal_category_id: 2,
                name_en: "shiba".to_string(),
                name_ja: "柴犬".to_string(),
            },
        ],
        sort_keys: vec![
            AnimalSearchSortKey {
                name: "score".to_string(),
            },
            AnimalSearchSortKey {
                name: "like".to_string(),
            },
        ],
    }
}

pub fn login(token: &str) -> Login {
    Login {
        user_id: "u1".to_string(),
        handle_name: "shibuya".to_string(),
        email_address: String::new(),
        token: token.to_string(),
        last_login_at: Utc::now(),
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Client(ClientError::Network("offline".to_string()))
}

#[derive(Default)]
struct Calls(Mutex<HashMap<&'static str, usize>>);

impl Calls {
    fn hit(&self, name: &'static str) {
        *self.0.lock().unwrap().entry(name).or_default() += 1;
    }

    fn get(&self, name: &str) -> usize {
        self.0.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn total(&self) -> usize {
        self.0.lock().unwrap().values().sum()
    }
}

#[derive(Default)]
struct Slot(Mutex<Option<Credentials>>);

impl Slot {
    fn set(&self, credentials: Option<Credentials>) {
        *self.0.lock().unwrap() = credentials;
    }

    fn token(&self) -> Option<String> {
        self.0.lock().unwrap().as_ref().map(|c| c.token.clone())
    }
}

#[derive(Default)]
pub struct FakeAnimalLocal {
    animals: Mutex<Vec<Animal>>,
    metadata: Mutex<AnimalMetadata>,
    calls: Calls,
    writes_left: Mutex<Option<usize>>,
}

impl FakeAnimalLocal {
    pub fn seed(&self, animals: Vec<Animal>) {
        self.animals.lock().unwrap().extend(animals);
    }

    pub fn stored(&self, id: &str) -> Option<Animal> {
        self.animals.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        self.animals.lock().unwrap().len()
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.get(name)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.total()
    }

    /// Let `n` more saves or removes succeed, then fail every one after
    pub fn fail_writes_after(&self, n: usize) {
        *self.writes_left.lock().unwrap() = Some(n);
    }

    fn write(&self) -> Result<(), RepositoryError> {
        match &mut *self.writes_left.lock().unwrap() {
            Some(0) => Err(RepositoryError::Cache(CacheError::InvalidData(
                "disk full".to_string(),
            ))),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AnimalLocalSource for FakeAnimalLocal {
    async fn list(&self, _query: &AnimalQuery) -> Result<Vec<Animal>, RepositoryError> {
        self.calls.hit("list");
        Ok(self.animals.lock().unwrap().clone())
    }

    async fn list_others(&self, id: &str) -> Result<Vec<Animal>, RepositoryError> {
        self.calls.hit("list_others");
        Ok(self
            .animals
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError> {
        self.calls.hit("get");
        Ok(self.stored(id))
    }

    async fn save(&self, animal: &Animal) -> Result<(), RepositoryError> {
        self.calls.hit("save");
        self.write()?;
        let mut animals = self.animals.lock().unwrap();
        animals.retain(|a| a.id != animal.id);
        animals.push(animal.clone());
        Ok(())
    }

    async fn save_batch(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        for animal in animals {
            self.save(animal).await?;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RepositoryError> {
        self.calls.hit("remove");
        self.write()?;
        self.animals.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn set_like(&self, id: &str, like: i64) -> Result<bool, RepositoryError> {
        self.calls.hit("set_like");
        let mut animals = self.animals.lock().unwrap();
        match animals.iter_mut().find(|a| a.id == id) {
            Some(animal) => {
                animal.like = like;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_metadata(&self, metadata: &AnimalMetadata) -> Result<(), RepositoryError> {
        self.calls.hit("replace_metadata");
        *self.metadata.lock().unwrap() = metadata.clone();
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<AnimalCategory>, RepositoryError> {
        self.calls.hit("list_categories");
        Ok(self.metadata.lock().unwrap().categories.clone())
    }

    async fn list_subcategories(
        &self,
        category: Option<&NameFilter>,
    ) -> Result<Vec<AnimalSubcategory>, RepositoryError> {
        self.calls.hit("list_subcategories");
        let metadata = self.metadata.lock().unwrap();
        let Some(filter) = category else {
            return Ok(metadata.subcategories.clone());
        };
        let ids: Vec<i64> = metadata
            .categories
            .iter()
            .filter(|c| filter.matches(&c.name_en, &c.name_ja))
            .map(|c| c.id)
            .collect();
        Ok(metadata
            .subcategories
            .iter()
            .filter(|s| ids.contains(&s.animal_category_id))
            .cloned()
            .collect())
    }

    async fn list_sort_keys(&self) -> Result<Vec<AnimalSearchSortKey>, RepositoryError> {
        self.calls.hit("list_sort_keys");
        Ok(self.metadata.lock().unwrap().sort_keys.clone())
    }

    async fn get_category(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalCategory>, RepositoryError> {
        self.calls.hit("get_category");
        let metadata = self.metadata.lock().unwrap();
        Ok(metadata
            .categories
            .iter()
            .find(|c| filter.matches(&c.name_en, &c.name_ja))
            .cloned())
    }

    async fn get_subcategory(
        &self,
        filter: &NameFilter,
    ) -> Result<Option<AnimalSubcategory>, RepositoryError> {
        self.calls.hit("get_subcategory");
        let metadata = self.metadata.lock().unwrap();
        Ok(metadata
            .subcategories
            .iter()
            .find(|s| filter.matches(&s.name_en, &s.name_ja))
            .cloned())
    }
}

/// Backend stand-in; it does not enforce credentials itself
#[derive(Default)]
pub struct FakeAnimalRemote {
    animals: Mutex<Vec<Animal>>,
    metadata: Mutex<AnimalMetadata>,
    credentials: Slot,
    offline: AtomicBool,
    calls: Calls,
}

impl FakeAnimalRemote {
    pub fn seed(&self, animals: Vec<Animal>) {
        self.animals.lock().unwrap().extend(animals);
    }

    pub fn set_metadata(&self, metadata: AnimalMetadata) {
        *self.metadata.lock().unwrap() = metadata;
    }

    pub fn sign_in(&self) {
        self.set_credentials(Some(Credentials::from(&login("remote-token"))));
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.token()
    }

    pub fn fail_with_network_error(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.get(name)
    }

    fn enter(&self, name: &'static str) -> Result<(), RepositoryError> {
        self.calls.hit(name);
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline());
        }
        Ok(())
    }

    fn page(&self) -> Animals {
        let animals = self.animals.lock().unwrap().clone();
        Animals {
            hits: animals.len(),
            animals,
            search_id: "remote-search".to_string(),
            sort_by: "score".to_string(),
            model_name: Some("fake".to_string()),
            offset: 0,
        }
    }
}

impl TokenSink for FakeAnimalRemote {
    fn set_credentials(&self, credentials: Option<Credentials>) {
        self.credentials.set(credentials);
    }

    fn has_credentials(&self) -> bool {
        self.credentials.token().is_some()
    }
}

#[async_trait]
impl AnimalRemoteSource for FakeAnimalRemote {
    async fn search(&self, _query: &AnimalQuery) -> Result<Animals, RepositoryError> {
        self.enter("search")?;
        Ok(self.page())
    }

    async fn search_similar(&self, _id: &str) -> Result<Animals, RepositoryError> {
        self.enter("search_similar")?;
        Ok(self.page())
    }

    async fn get(&self, id: &str) -> Result<Option<Animal>, RepositoryError> {
        self.enter("get")?;
        Ok(self.animals.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, registration: &AnimalRegistration) -> Result<Animal, RepositoryError> {
        self.enter("create")?;
        let mut stored = animal("server-id");
        stored.name = registration.name.clone();
        stored.description = registration.description.clone();
        self.animals.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn like(&self, _id: &str) -> Result<(), RepositoryError> {
        self.enter("like")
    }

    async fn metadata(&self) -> Result<AnimalMetadata, RepositoryError> {
        self.enter("metadata")?;
        Ok(self.metadata.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeLoginLocal {
    stored: Mutex<Option<Login>>,
    calls: Calls,
}

impl FakeLoginLocal {
    pub fn seed(&self, login: Login) {
        *self.stored.lock().unwrap() = Some(login);
    }

    pub fn stored(&self) -> Option<Login> {
        self.stored.lock().unwrap().clone()
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.get(name)
    }
}

#[async_trait]
impl LoginLocalSource for FakeLoginLocal {
    async fn store(&self, login: &Login) -> Result<(), RepositoryError> {
        self.calls.hit("store");
        *self.stored.lock().unwrap() = Some(login.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Login>, RepositoryError> {
        self.calls.hit("load");
        Ok(self.stored())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.calls.hit("clear");
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

/// Accepts exactly one handle/password pair
pub struct FakeLoginRemote {
    handle_name: String,
    password: String,
    offline: AtomicBool,
}

impl FakeLoginRemote {
    pub fn accepting(handle_name: &str, password: &str) -> Self {
        Self {
            handle_name: handle_name.to_string(),
            password: password.to_string(),
            offline: AtomicBool::new(false),
        }
    }

    pub fn fail_with_network_error(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LoginRemoteSource for FakeLoginRemote {
    async fn login(&self, handle_name: &str, password: &str) -> Result<LoginGrant, RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline());
        }
        if handle_name != self.handle_name || password != self.password {
            return Err(RepositoryError::Client(ClientError::Auth(
                "invalid handle name or password".to_string(),
            )));
        }
        Ok(LoginGrant {
            user_id: "u1".to_string(),
            token: format!("token-for-{handle_name}"),
        })
    }
}

#[derive(Default)]
pub struct FakeAccessLogRemote {
    posted: Mutex<Vec<AccessLog>>,
    credentials: Slot,
    offline: AtomicBool,
}

impl FakeAccessLogRemote {
    pub fn posted(&self) -> Vec<AccessLog> {
        self.posted.lock().unwrap().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.token()
    }

    pub fn fail_with_network_error(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl TokenSink for FakeAccessLogRemote {
    fn set_credentials(&self, credentials: Option<Credentials>) {
        self.credentials.set(credentials);
    }

    fn has_credentials(&self) -> bool {
        self.credentials.token().is_some()
    }
}

#[async_trait]
impl AccessLogRemoteSource for FakeAccessLogRemote {
    async fn post(&self, log: &AccessLog) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.posted.lock().unwrap().push(log.clone());
        Ok(())
    }
}
