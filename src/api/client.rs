// SPDX-License-Identifier: MPL-2.0

use crate::api::types::{
    AccessLog, Animal, AnimalCategory, AnimalMetadata, AnimalQuery, AnimalRegistration,
    AnimalSearchSortKey, AnimalSubcategory, Animals, Credentials, NameFilter,
};
use crate::config::DEFAULT_PAGE_LIMIT;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const TOKEN_HEADER: &str = "token";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

/// What a successful `POST /v0/user/login` grants
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginGrant {
    pub user_id: String,
    pub token: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    handle_name: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SearchRequest {
    animal_category_name_en: Option<String>,
    animal_category_name_ja: Option<String>,
    animal_subcategory_name_en: Option<String>,
    animal_subcategory_name_ja: Option<String>,
    phrases: Vec<String>,
    sort_by: String,
}

impl From<&AnimalQuery> for SearchRequest {
    fn from(query: &AnimalQuery) -> Self {
        let split = |f: &Option<NameFilter>| match f {
            Some(NameFilter::En(v)) => (Some(v.clone()), None),
            Some(NameFilter::Ja(v)) => (None, Some(v.clone())),
            None => (None, None),
        };
        let (category_en, category_ja) = split(&query.category);
        let (subcategory_en, subcategory_ja) = split(&query.subcategory);
        Self {
            animal_category_name_en: category_en,
            animal_category_name_ja: category_ja,
            animal_subcategory_name_en: subcategory_en,
            animal_subcategory_name_ja: subcategory_ja,
            phrases: query.phrases(),
            sort_by: query.sort_by.clone(),
        }
    }
}

#[derive(Serialize)]
struct SimilarSearchRequest<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct AnimalCreateRequest<'a> {
    animal_category_id: i64,
    animal_subcategory_id: i64,
    user_id: &'a str,
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct LikeRequest<'a> {
    animal_id: &'a str,
    user_id: &'a str,
}

/// Covers the full animal response as well as search hits; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct AnimalPayload {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    photo_url: String,
    #[serde(default)]
    like: i64,
    #[serde(default)]
    created_at: String,
    animal_category_name_en: Option<String>,
    animal_category_name_ja: Option<String>,
    animal_subcategory_name_en: Option<String>,
    animal_subcategory_name_ja: Option<String>,
    user_handle_name: Option<String>,
}

impl From<AnimalPayload> for Animal {
    fn from(p: AnimalPayload) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            like: p.like,
            photo_url: p.photo_url,
            created_at: p.created_at,
            animal_category_name_en: p.animal_category_name_en,
            animal_category_name_ja: p.animal_category_name_ja,
            animal_subcategory_name_en: p.animal_subcategory_name_en,
            animal_subcategory_name_ja: p.animal_subcategory_name_ja,
            user_handle_name: p.user_handle_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    hits: usize,
    results: Vec<AnimalPayload>,
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    search_id: String,
    #[serde(default)]
    sort_by: String,
    model_name: Option<String>,
}

impl From<SearchPayload> for Animals {
    fn from(p: SearchPayload) -> Self {
        Self {
            hits: p.hits,
            animals: p.results.into_iter().map(Animal::from).collect(),
            search_id: p.search_id,
            sort_by: p.sort_by,
            model_name: p.model_name,
            offset: p.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataPayload {
    #[serde(default)]
    animal_category: Vec<AnimalCategory>,
    #[serde(default)]
    animal_subcategory: Vec<AnimalSubcategory>,
    #[serde(default)]
    animal_search_sort_key: Vec<String>,
}

impl From<MetadataPayload> for AnimalMetadata {
    fn from(p: MetadataPayload) -> Self {
        Self {
            categories: p.animal_category,
            subcategories: p.animal_subcategory,
            sort_keys: p
                .animal_search_sort_key
                .into_iter()
                .map(|name| AnimalSearchSortKey { name })
                .collect(),
        }
    }
}

/// Thin wrapper over the AIAnimals REST API. Holds no session state;
/// callers pass the token for every authenticated call.
#[derive(Clone)]
pub struct AnimalsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AnimalsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // Url::join replaces the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("aianimals/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{path} returned HTTP {}", status.as_u16());
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(path, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("{path}: {e}")))
    }

    pub async fn login(&self, handle_name: &str, password: &str) -> Result<LoginGrant, ClientError> {
        let path = "/v0/user/login";
        let request = self.http.post(self.endpoint(path)?).json(&LoginRequest {
            handle_name,
            password,
        });

        // The backend answers unknown credentials with `null` rather than an error status
        let grant: Option<LoginGrant> = match self.send_json(path, request).await {
            Err(ClientError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                return Err(ClientError::Auth(format!("rejected with HTTP {status}")));
            }
            other => other?,
        };

        grant.ok_or_else(|| ClientError::Auth("invalid handle name or password".to_string()))
    }

    pub async fn metadata(&self, token: &str) -> Result<AnimalMetadata, ClientError> {
        let path = "/v0/metadata";
        let request = self.http.get(self.endpoint(path)?).header(TOKEN_HEADER, token);
        let payload: MetadataPayload = self.send_json(path, request).await?;
        Ok(payload.into())
    }

    pub async fn search(&self, token: &str, query: &AnimalQuery) -> Result<Animals, ClientError> {
        let path = "/v0/animal/search";
        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(TOKEN_HEADER, token)
            .query(&[
                ("limit", DEFAULT_PAGE_LIMIT.to_string()),
                ("offset", query.offset.to_string()),
            ])
            .json(&SearchRequest::from(query));
        let payload: SearchPayload = self.send_json(path, request).await?;
        Ok(payload.into())
    }

    pub async fn search_similar(&self, token: &str, animal_id: &str) -> Result<Animals, ClientError> {
        let path = "/v0/animal/search/similar";
        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(TOKEN_HEADER, token)
            .json(&SimilarSearchRequest { id: animal_id });
        let payload: SearchPayload = self.send_json(path, request).await?;
        let mut animals = Animals::from(payload);
        if animals.hits == 0 {
            animals.hits = animals.animals.len();
        }
        Ok(animals)
    }

    pub async fn get_animal(&self, token: &str, animal_id: &str) -> Result<Option<Animal>, ClientError> {
        let path = "/v0/animal";
        let request = self
            .http
            .get(self.endpoint(path)?)
            .header(TOKEN_HEADER, token)
            .query(&[
                ("id", animal_id),
                ("deactivated", "false"),
                ("limit", "1"),
                ("offset", "0"),
            ]);
        let payload: Vec<AnimalPayload> = self.send_json(path, request).await?;
        Ok(payload.into_iter().next().map(Animal::from))
    }

    pub async fn create_animal(
        &self,
        credentials: &Credentials,
        registration: &AnimalRegistration,
    ) -> Result<Animal, ClientError> {
        let path = "/v0/animal";
        let body = serde_json::to_string(&AnimalCreateRequest {
            animal_category_id: registration.animal_category_id,
            animal_subcategory_id: registration.animal_subcategory_id,
            user_id: &credentials.user_id,
            name: &registration.name,
            description: &registration.description,
        })
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let file = Part::bytes(registration.photo.clone())
            .file_name(registration.photo_file_name.clone())
            .mime_str("image/jpeg")
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let form = Form::new().text("request", body).part("file", file);

        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(TOKEN_HEADER, &credentials.token)
            .multipart(form);
        let payload: AnimalPayload = self.send_json(path, request).await?;
        Ok(payload.into())
    }

    pub async fn like(&self, credentials: &Credentials, animal_id: &str) -> Result<(), ClientError> {
        let path = "/v0/like";
        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(TOKEN_HEADER, &credentials.token)
            .json(&LikeRequest {
                animal_id,
                user_id: &credentials.user_id,
            });
        self.send(path, request).await?;
        Ok(())
    }

    pub async fn post_access_log(&self, token: &str, log: &AccessLog) -> Result<(), ClientError> {
        let path = "/v0/access_log";
        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(TOKEN_HEADER, token)
            .json(log);
        self.send(path, request).await?;
        Ok(())
    }
}
