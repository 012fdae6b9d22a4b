// SPDX-License-Identifier: MPL-2.0

mod animals;
mod db;
mod logins;
mod metadata;
mod schema;

pub use animals::AnimalCache;
pub use db::CacheDb;
pub use logins::LoginCache;
pub use metadata::MetadataCache;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("invalid stored value: {0}")]
    InvalidData(String),
    #[error("not found")]
    NotFound,
    #[error("database path error: {0}")]
    Path(String),
}
