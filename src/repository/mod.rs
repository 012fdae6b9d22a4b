// SPDX-License-Identifier: MPL-2.0

//! Repositories arbitrate between the device cache and the backend.

mod access_log;
mod animal;
#[cfg(test)]
mod fakes;
mod local;
mod login;
mod memory;
mod remote;
mod source;

pub use access_log::AccessLogRepository;
pub use animal::{AnimalRepository, Registered, RemoteWrite};
pub use local::{SqliteAnimalSource, SqliteLoginSource};
pub use login::LoginRepository;
pub use memory::LruCache;
pub use remote::{HttpAccessLogSource, HttpAnimalSource, HttpLoginSource};
pub use source::{
    AccessLogRemoteSource, AnimalLocalSource, AnimalRemoteSource, LoginLocalSource,
    LoginRemoteSource,
};

use crate::api::ClientError;
use crate::cache::CacheError;
use thiserror::Error;

/// The one error type every repository operation returns
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("local store: {0}")]
    Cache(#[from] CacheError),
    #[error("backend: {0}")]
    Client(#[from] ClientError),
    #[error("background task failed: {0}")]
    Task(String),
}

impl RepositoryError {
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::Client(ClientError::NotAuthenticated))
    }
}
