// SPDX-License-Identifier: MPL-2.0

//! Data layer of the AIAnimals client: animal listings resolved local-first
//! with a backend fallback, the login session, metadata and access logs.

pub mod api;
mod app;
pub mod cache;
pub mod config;
pub mod logging;
pub mod repository;
pub mod state;
#[cfg(test)]
mod test_support;

pub use api::{
    AccessAction, AccessLog, Animal, AnimalCategory, AnimalQuery, AnimalRegistration,
    AnimalSubcategory, Animals, Login, NameFilter,
};
pub use app::AnimalsApp;
pub use repository::{Registered, RemoteWrite, RepositoryError};
pub use state::ClientSettings;
