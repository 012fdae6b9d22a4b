// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "com.example.aianimals";
pub const APP_NAME: &str = "AIAnimals";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Page size the backend uses for search and listing endpoints
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Upper bound on animals kept in the per-session memory cache
pub const MEMORY_CACHE_CAPACITY: usize = 500;

/// Environment overrides for [`crate::state::ClientSettings`]
pub const ENV_API_BASE_URL: &str = "AIANIMALS_API_BASE_URL";
pub const ENV_USE_LOCAL_DATA: &str = "AIANIMALS_USE_LOCAL_DATA";
pub const ENV_LOG: &str = "AIANIMALS_LOG";
