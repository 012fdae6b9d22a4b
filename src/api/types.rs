// SPDX-License-Identifier: MPL-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default `sort_by` for searches; the backend ranks by relevance score.
pub const SORT_BY_SCORE: &str = "score";

/// An animal listing. Owned by us, decoupled from the backend response shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub like: i64,
    pub photo_url: String,
    pub created_at: String,
    pub animal_category_name_en: Option<String>,
    pub animal_category_name_ja: Option<String>,
    pub animal_subcategory_name_en: Option<String>,
    pub animal_subcategory_name_ja: Option<String>,
    pub user_handle_name: Option<String>,
}

impl Animal {
    /// Generate a fresh animal id (32 lowercase hex chars, no dashes)
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// One page of listing or search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animals {
    pub animals: Vec<Animal>,
    pub hits: usize,
    pub search_id: String,
    pub sort_by: String,
    pub model_name: Option<String>,
    pub offset: usize,
}

impl Animals {
    /// Wrap a list that did not come from a backend search (no search id)
    pub fn from_list(animals: Vec<Animal>, sort_by: &str, offset: usize) -> Self {
        Self {
            hits: animals.len(),
            animals,
            search_id: String::new(),
            sort_by: sort_by.to_string(),
            model_name: None,
            offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

/// Lookup by English or Japanese name; exactly one is always given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameFilter {
    En(String),
    Ja(String),
}

impl NameFilter {
    pub fn value(&self) -> &str {
        match self {
            Self::En(v) | Self::Ja(v) => v,
        }
    }

    pub fn matches(&self, name_en: &str, name_ja: &str) -> bool {
        match self {
            Self::En(v) => v == name_en,
            Self::Ja(v) => v == name_ja,
        }
    }
}

/// Filters for listing and searching animals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalQuery {
    pub category: Option<NameFilter>,
    pub subcategory: Option<NameFilter>,
    /// Free text; split on whitespace into search phrases
    pub query: Option<String>,
    pub sort_by: String,
    pub offset: usize,
}

impl Default for AnimalQuery {
    fn default() -> Self {
        Self {
            category: None,
            subcategory: None,
            query: None,
            sort_by: SORT_BY_SCORE.to_string(),
            offset: 0,
        }
    }
}

impl AnimalQuery {
    pub fn phrases(&self) -> Vec<String> {
        self.query
            .as_deref()
            .map(|q| q.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalCategory {
    pub id: i64,
    pub name_en: String,
    pub name_ja: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalSubcategory {
    pub id: i64,
    pub animal_category_id: i64,
    pub name_en: String,
    pub name_ja: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalSearchSortKey {
    pub name: String,
}

/// Reference data served by `GET /v0/metadata`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalMetadata {
    pub categories: Vec<AnimalCategory>,
    pub subcategories: Vec<AnimalSubcategory>,
    pub sort_keys: Vec<AnimalSearchSortKey>,
}

/// A new listing to be posted with its photo
#[derive(Debug, Clone)]
pub struct AnimalRegistration {
    pub name: String,
    pub description: String,
    pub animal_category_id: i64,
    pub animal_subcategory_id: i64,
    pub photo: Vec<u8>,
    pub photo_file_name: String,
}

/// The authenticated user on this device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub user_id: String,
    pub handle_name: String,
    pub email_address: String,
    pub token: String,
    pub last_login_at: DateTime<Utc>,
}

/// What remote sources need to make authenticated calls
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl From<&Login> for Credentials {
    fn from(login: &Login) -> Self {
        Self {
            user_id: login.user_id.clone(),
            token: login.token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Select,
    SeeLong,
    Like,
}

/// Telemetry event; never stored locally
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessLog {
    pub search_id: String,
    pub phrases: Vec<String>,
    pub animal_category_id: Option<i64>,
    pub animal_subcategory_id: Option<i64>,
    pub sort_by: String,
    pub model_name: Option<String>,
    pub animal_id: String,
    pub action: AccessAction,
}
