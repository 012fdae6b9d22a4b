// SPDX-License-Identifier: MPL-2.0

use crate::api::{AnimalCategory, AnimalMetadata, AnimalSearchSortKey, AnimalSubcategory, NameFilter};
use crate::cache::{CacheDb, CacheError};
use rusqlite::params;
use std::collections::HashSet;

/// Cache operations for categories, subcategories and sort keys
pub struct MetadataCache<'a> {
    db: &'a CacheDb,
}

impl<'a> MetadataCache<'a> {
    pub fn new(db: &'a CacheDb) -> Self {
        Self { db }
    }

    /// Replace all cached metadata in one transaction
    pub fn replace(&self, metadata: &AnimalMetadata) -> Result<(), CacheError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM animal_subcategories", [])?;
        tx.execute("DELETE FROM animal_categories", [])?;
        tx.execute("DELETE FROM animal_search_sort_keys", [])?;

        for category in &metadata.categories {
            tx.execute(
                "INSERT OR REPLACE INTO animal_categories (id, name_en, name_ja) VALUES (?1, ?2, ?3)",
                params![category.id, category.name_en, category.name_ja],
            )?;
        }

        let known: HashSet<i64> = metadata.categories.iter().map(|c| c.id).collect();
        for subcategory in &metadata.subcategories {
            if !known.contains(&subcategory.animal_category_id) {
                tracing::warn!(
                    "skipping subcategory {} with unknown category {}",
                    subcategory.id,
                    subcategory.animal_category_id
                );
                continue;
            }
            tx.execute(
                r#"
                INSERT OR REPLACE INTO animal_subcategories (id, animal_category_id, name_en, name_ja)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    subcategory.id,
                    subcategory.animal_category_id,
                    subcategory.name_en,
                    subcategory.name_ja
                ],
            )?;
        }

        for key in &metadata.sort_keys {
            tx.execute(
                "INSERT OR IGNORE INTO animal_search_sort_keys (name) VALUES (?1)",
                [&key.name],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<AnimalCategory>, CacheError> {
        let conn = self.db.conn();
        let mut stmt =
            conn.prepare("SELECT id, name_en, name_ja FROM animal_categories ORDER BY id")?;
        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// All subcategories, or only those under the named category
    pub fn list_subcategories(
        &self,
        category: Option<&NameFilter>,
    ) -> Result<Vec<AnimalSubcategory>, CacheError> {
        let conn = self.db.conn();
        let base = r#"
            SELECT s.id, s.animal_category_id, s.name_en, s.name_ja
            FROM animal_subcategories s
            JOIN animal_categories c ON s.animal_category_id = c.id
        "#;

        let subcategories = match category {
            None => {
                let mut stmt = conn.prepare(&format!("{base} ORDER BY s.id"))?;
                let rows = stmt
                    .query_map([], Self::row_to_subcategory)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            Some(filter) => {
                let column = match filter {
                    NameFilter::En(_) => "c.name_en",
                    NameFilter::Ja(_) => "c.name_ja",
                };
                let mut stmt = conn.prepare(&format!("{base} WHERE {column} = ? ORDER BY s.id"))?;
                let rows = stmt
                    .query_map([filter.value()], Self::row_to_subcategory)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(subcategories)
    }

    pub fn list_sort_keys(&self) -> Result<Vec<AnimalSearchSortKey>, CacheError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT name FROM animal_search_sort_keys ORDER BY rowid")?;
        let keys = stmt
            .query_map([], |row| Ok(AnimalSearchSortKey { name: row.get(0)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    pub fn get_category(&self, filter: &NameFilter) -> Result<AnimalCategory, CacheError> {
        let column = match filter {
            NameFilter::En(_) => "name_en",
            NameFilter::Ja(_) => "name_ja",
        };
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name_en, name_ja FROM animal_categories WHERE {column} = ?"
        ))?;

        let category = stmt
            .query_row([filter.value()], Self::row_to_category)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CacheError::NotFound,
                other => CacheError::Database(other),
            })?;

        Ok(category)
    }

    pub fn get_subcategory(&self, filter: &NameFilter) -> Result<AnimalSubcategory, CacheError> {
        let column = match filter {
            NameFilter::En(_) => "name_en",
            NameFilter::Ja(_) => "name_ja",
        };
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, animal_category_id, name_en, name_ja FROM animal_subcategories WHERE {column} = ?"
        ))?;

        let subcategory = stmt
            .query_row([filter.value()], Self::row_to_subcategory)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CacheError::NotFound,
                other => CacheError::Database(other),
            })?;

        Ok(subcategory)
    }

    fn row_to_category(row: &rusqlite::Row) -> Result<AnimalCategory, rusqlite::Error> {
        Ok(AnimalCategory {
            id: row.get(0)?,
            name_en: row.get(1)?,
            name_ja: row.get(2)?,
        })
    }

    fn row_to_subcategory(row: &rusqlite::Row) -> Result<AnimalSubcategory, rusqlite::Error> {
        Ok(AnimalSubcategory {
            id: row.get(0)?,
            animal_category_id: row.get(1)?,
            name_en: row.get(2)?,
            name_ja: row.get(3)?,
        })
    }
}
