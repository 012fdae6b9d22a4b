// SPDX-License-Identifier: MPL-2.0

/// SQL schema for the cache database
pub const SCHEMA: &str = r#"
-- Database version for migrations
PRAGMA user_version = 1;
PRAGMA foreign_keys = ON;

-- animals: listings seen or registered on this device
CREATE TABLE IF NOT EXISTS animals (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    like_count INTEGER NOT NULL DEFAULT 0,
    photo_url TEXT NOT NULL,
    created_at TEXT NOT NULL,
    animal_category_name_en TEXT,
    animal_category_name_ja TEXT,
    animal_subcategory_name_en TEXT,
    animal_subcategory_name_ja TEXT,
    user_handle_name TEXT,
    fetched_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_animals_created_at ON animals(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_animals_category ON animals(animal_category_name_en);

-- logins: at most one row, the current device session
CREATE TABLE IF NOT EXISTS logins (
    slot INTEGER PRIMARY KEY CHECK (slot = 0),
    user_id TEXT NOT NULL,
    handle_name TEXT NOT NULL,
    email_address TEXT NOT NULL,
    token TEXT NOT NULL,
    last_login_at TEXT NOT NULL
);

-- metadata: replaced wholesale on every refresh
CREATE TABLE IF NOT EXISTS animal_categories (
    id INTEGER PRIMARY KEY,
    name_en TEXT NOT NULL,
    name_ja TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_animal_categories_name_en ON animal_categories(name_en);
CREATE INDEX IF NOT EXISTS idx_animal_categories_name_ja ON animal_categories(name_ja);

CREATE TABLE IF NOT EXISTS animal_subcategories (
    id INTEGER PRIMARY KEY,
    animal_category_id INTEGER NOT NULL
        REFERENCES animal_categories(id) ON DELETE CASCADE,
    name_en TEXT NOT NULL,
    name_ja TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_animal_subcategories_category ON animal_subcategories(animal_category_id);

CREATE TABLE IF NOT EXISTS animal_search_sort_keys (
    name TEXT PRIMARY KEY
);
"#;
