//! Durable home of the keyword list: a JSON array under a fixed settings
//! key, loaded once at startup to seed the live watch settings.

use sqlx::Row;

use super::Database;
use crate::Result;

const KEYWORDS_KEY: &str = "keywords";

/// Fallback when no list was ever saved or the stored value is corrupt.
pub const DEFAULT_KEYWORDS: &[&str] = &["stocks"];

pub struct KeywordRepository<'a> {
    db: &'a Database,
}

impl<'a> KeywordRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Load the persisted keyword list, falling back to the built-in
    /// default when the row is absent or does not parse.
    pub async fn load(&self) -> Result<Vec<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(KEYWORDS_KEY)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(default_keywords());
        };

        let value: String = row.try_get("value")?;
        match serde_json::from_str::<Vec<String>>(&value) {
            Ok(keywords) if !keywords.is_empty() => Ok(keywords),
            Ok(_) => Ok(default_keywords()),
            Err(e) => {
                tracing::warn!("Stored keyword list is corrupt ({}), using default", e);
                Ok(default_keywords())
            }
        }
    }

    /// Persist the ordered keyword list.
    pub async fn save(&self, keywords: &[String]) -> Result<()> {
        let value = serde_json::to_string(keywords)?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(KEYWORDS_KEY)
        .bind(value)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
