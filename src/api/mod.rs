// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::{AnimalsClient, ClientError, LoginGrant};
pub use types::{
    AccessAction, AccessLog, Animal, AnimalCategory, AnimalMetadata, AnimalQuery,
    AnimalRegistration, AnimalSearchSortKey, AnimalSubcategory, Animals, Credentials, Login,
    NameFilter, SORT_BY_SCORE,
};
