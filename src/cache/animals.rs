// SPDX-License-Identifier: MPL-2.0

use crate::api::{Animal, AnimalQuery, NameFilter};
use crate::cache::{CacheDb, CacheError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

const ANIMAL_COLUMNS: &str = r#"
    id, name, description, like_count, photo_url, created_at,
    animal_category_name_en, animal_category_name_ja,
    animal_subcategory_name_en, animal_subcategory_name_ja,
    user_handle_name
"#;

const UPSERT_ANIMAL: &str = r#"
    INSERT INTO animals (
        id, name, description, like_count, photo_url, created_at,
        animal_category_name_en, animal_category_name_ja,
        animal_subcategory_name_en, animal_subcategory_name_ja,
        user_handle_name, fetched_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        description = excluded.description,
        like_count = excluded.like_count,
        photo_url = excluded.photo_url,
        created_at = excluded.created_at,
        animal_category_name_en = COALESCE(excluded.animal_category_name_en, animals.animal_category_name_en),
        animal_category_name_ja = COALESCE(excluded.animal_category_name_ja, animals.animal_category_name_ja),
        animal_subcategory_name_en = COALESCE(excluded.animal_subcategory_name_en, animals.animal_subcategory_name_en),
        animal_subcategory_name_ja = COALESCE(excluded.animal_subcategory_name_ja, animals.animal_subcategory_name_ja),
        user_handle_name = COALESCE(excluded.user_handle_name, animals.user_handle_name),
        fetched_at = excluded.fetched_at
"#;

/// Make `%`, `_` and `\` match themselves in a LIKE pattern with `ESCAPE '\'`
fn escape_like(phrase: &str) -> String {
    let mut escaped = String::with_capacity(phrase.len());
    for c in phrase.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Cache operations for animals
pub struct AnimalCache<'a> {
    db: &'a CacheDb,
}

impl<'a> AnimalCache<'a> {
    pub fn new(db: &'a CacheDb) -> Self {
        Self { db }
    }

    /// Store a single animal (upserts)
    pub fn store(&self, animal: &Animal) -> Result<(), CacheError> {
        let conn = self.db.conn();
        conn.execute(
            UPSERT_ANIMAL,
            params_from_iter(Self::upsert_params(animal, CacheDb::now())),
        )?;
        Ok(())
    }

    /// Store multiple animals in a transaction
    pub fn store_batch(&self, animals: &[Animal]) -> Result<(), CacheError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        let now = CacheDb::now();

        for animal in animals {
            tx.execute(UPSERT_ANIMAL, params_from_iter(Self::upsert_params(animal, now)))?;
        }

        tx.commit()?;
        Ok(())
    }

    fn upsert_params(animal: &Animal, now: i64) -> [Value; 12] {
        let opt = |v: &Option<String>| v.clone().map(Value::Text).unwrap_or(Value::Null);
        [
            Value::Text(animal.id.clone()),
            Value::Text(animal.name.clone()),
            Value::Text(animal.description.clone()),
            Value::Integer(animal.like),
            Value::Text(animal.photo_url.clone()),
            Value::Text(animal.created_at.clone()),
            opt(&animal.animal_category_name_en),
            opt(&animal.animal_category_name_ja),
            opt(&animal.animal_subcategory_name_en),
            opt(&animal.animal_subcategory_name_ja),
            opt(&animal.user_handle_name),
            Value::Integer(now),
        ]
    }

    /// Get animal by id
    pub fn get(&self, id: &str) -> Result<Animal, CacheError> {
        let conn = self.db.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id = ?"))?;

        stmt.query_row([id], Self::row_to_animal)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CacheError::NotFound,
                other => CacheError::Database(other),
            })
    }

    /// List animals matching the query's filters, one page at a time
    pub fn list(&self, query: &AnimalQuery, limit: usize) -> Result<Vec<Animal>, CacheError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        for (filter, column_en, column_ja) in [
            (
                &query.category,
                "animal_category_name_en",
                "animal_category_name_ja",
            ),
            (
                &query.subcategory,
                "animal_subcategory_name_en",
                "animal_subcategory_name_ja",
            ),
        ] {
            match filter {
                Some(NameFilter::En(v)) => {
                    clauses.push(format!("{column_en} = ?"));
                    values.push(Value::Text(v.clone()));
                }
                Some(NameFilter::Ja(v)) => {
                    clauses.push(format!("{column_ja} = ?"));
                    values.push(Value::Text(v.clone()));
                }
                None => {}
            }
        }

        // Every phrase must hit the name or the description, literally
        for phrase in query.phrases() {
            clauses.push(r"(name LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\')".to_string());
            let pattern = format!("%{}%", escape_like(&phrase));
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let order_by = match query.sort_by.as_str() {
            "like" | "likes" => "like_count DESC, created_at DESC",
            _ => "created_at DESC, id ASC",
        };

        // Past the end of any table
        let Ok(offset) = i64::try_from(query.offset) else {
            return Ok(Vec::new());
        };
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(offset));

        let sql = format!(
            "SELECT {ANIMAL_COLUMNS} FROM animals {where_clause} ORDER BY {order_by} LIMIT ? OFFSET ?"
        );

        let conn = self.db.conn();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut animals = Vec::new();

        while let Some(row) = rows.next()? {
            animals.push(Self::row_to_animal(row)?);
        }

        Ok(animals)
    }

    /// Everything except the given animal, newest first
    pub fn list_others(&self, id: &str, limit: usize) -> Result<Vec<Animal>, CacheError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ANIMAL_COLUMNS} FROM animals WHERE id != ? ORDER BY created_at DESC LIMIT ?"
        ))?;

        let mut rows = stmt.query(params![id, limit as i64])?;
        let mut animals = Vec::new();

        while let Some(row) = rows.next()? {
            animals.push(Self::row_to_animal(row)?);
        }

        Ok(animals)
    }

    /// Update the like count; returns false if the animal is not cached
    pub fn set_like(&self, id: &str, like: i64) -> Result<bool, CacheError> {
        let conn = self.db.conn();
        let updated = conn.execute(
            "UPDATE animals SET like_count = ? WHERE id = ?",
            params![like, id],
        )?;
        Ok(updated > 0)
    }

    /// Delete an animal; returns whether it was cached
    pub fn remove(&self, id: &str) -> Result<bool, CacheError> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM animals WHERE id = ?", [id])?;
        Ok(removed > 0)
    }

    fn row_to_animal(row: &rusqlite::Row) -> Result<Animal, rusqlite::Error> {
        Ok(Animal {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            like: row.get(3)?,
            photo_url: row.get(4)?,
            created_at: row.get(5)?,
            animal_category_name_en: row.get(6)?,
            animal_category_name_ja: row.get(7)?,
            animal_subcategory_name_en: row.get(8)?,
            animal_subcategory_name_ja: row.get(9)?,
            user_handle_name: row.get(10)?,
        })
    }
}
