//! Configurable ticket categories, each rendered as one panel button.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A configurable reason a ticket can be opened for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCategory {
    pub id: String,
    pub guild_id: String,
    pub category_key: String,
    pub category_name: String,
    pub button_label: String,
    pub button_emoji: Option<String>,
    pub button_style: i64,
    pub discord_category_id: Option<String>,
    pub open_message: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields applied by the final step of the category edit wizard
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate<'a> {
    pub category_name: Option<&'a str>,
    pub button_label: Option<&'a str>,
    pub button_emoji: Option<Option<&'a str>>,
    pub button_style: Option<i64>,
    pub discord_category_id: Option<Option<&'a str>>,
    pub open_message: Option<Option<&'a str>>,
}

/// Normalize user input into a category key: lowercase, `[a-z0-9]` only.
/// Returns None when nothing survives.
pub fn sanitize_category_key(input: &str) -> Option<String> {
    let key: String = input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if key.is_empty() { None } else { Some(key) }
}

#[derive(sqlx::FromRow)]
struct TicketCategoryRow {
    id: String,
    guild_id: String,
    category_key: String,
    category_name: String,
    button_label: String,
    button_emoji: Option<String>,
    button_style: i64,
    discord_category_id: Option<String>,
    open_message: Option<String>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<TicketCategoryRow> for TicketCategory {
    fn from(row: TicketCategoryRow) -> Self {
        TicketCategory {
            id: row.id,
            guild_id: row.guild_id,
            category_key: row.category_key,
            category_name: row.category_name,
            button_label: row.button_label,
            button_emoji: row.button_emoji,
            button_style: row.button_style,
            discord_category_id: row.discord_category_id,
            open_message: row.open_message,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, guild_id, category_key, category_name, button_label, \
     button_emoji, button_style, discord_category_id, open_message, is_active, \
     created_at, updated_at";

/// Repository for ticket category operations
pub struct TicketCategoryRepository;

impl TicketCategoryRepository {
    /// Create a new category. Keys are unique per guild.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &SqlitePool,
        guild_id: &str,
        category_key: &str,
        category_name: &str,
        button_label: &str,
        button_emoji: Option<&str>,
        button_style: i64,
        discord_category_id: Option<&str>,
        open_message: Option<&str>,
    ) -> DbResult<TicketCategory> {
        if Self::get_by_key(pool, guild_id, category_key)
            .await?
            .is_some()
        {
            return Err(DbError::DuplicateCategoryKey(category_key.to_string()));
        }

        let id = format!("tc_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO ticket_categories
             (id, guild_id, category_key, category_name, button_label, button_emoji,
              button_style, discord_category_id, open_message, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(guild_id)
        .bind(category_key)
        .bind(category_name)
        .bind(button_label)
        .bind(button_emoji)
        .bind(button_style)
        .bind(discord_category_id)
        .bind(open_message)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(
            "Created ticket category '{}' (key {}) in guild {}",
            category_name, category_key, guild_id
        );

        Self::get_by_id(pool, &id)
            .await?
            .ok_or_else(|| DbError::CategoryNotFound(id))
    }

    /// Get a category by row id
    pub async fn get_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<TicketCategory>> {
        let row = sqlx::query_as::<_, TicketCategoryRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_categories WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(TicketCategory::from))
    }

    /// Get a category by its guild-scoped key
    pub async fn get_by_key(
        pool: &SqlitePool,
        guild_id: &str,
        category_key: &str,
    ) -> DbResult<Option<TicketCategory>> {
        let row = sqlx::query_as::<_, TicketCategoryRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_categories
             WHERE guild_id = ? AND category_key = ?"
        ))
        .bind(guild_id)
        .bind(category_key)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(TicketCategory::from))
    }

    /// All categories in a guild, oldest first
    pub async fn list_by_guild(pool: &SqlitePool, guild_id: &str) -> DbResult<Vec<TicketCategory>> {
        let rows = sqlx::query_as::<_, TicketCategoryRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_categories
             WHERE guild_id = ? ORDER BY created_at ASC"
        ))
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TicketCategory::from).collect())
    }

    /// Active categories in a guild, oldest first (the set rendered on panels)
    pub async fn list_active_by_guild(
        pool: &SqlitePool,
        guild_id: &str,
    ) -> DbResult<Vec<TicketCategory>> {
        let rows = sqlx::query_as::<_, TicketCategoryRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_categories
             WHERE guild_id = ? AND is_active = 1 ORDER BY created_at ASC"
        ))
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TicketCategory::from).collect())
    }

    /// Apply a partial update. The key itself is never changed by an edit.
    pub async fn update(pool: &SqlitePool, id: &str, update: CategoryUpdate<'_>) -> DbResult<()> {
        let current = Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::CategoryNotFound(id.to_string()))?;

        let now = Utc::now().timestamp();
        sqlx::query(
            "UPDATE ticket_categories
             SET category_name = ?, button_label = ?, button_emoji = ?, button_style = ?,
                 discord_category_id = ?, open_message = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(update.category_name.unwrap_or(&current.category_name))
        .bind(update.button_label.unwrap_or(&current.button_label))
        .bind(
            update
                .button_emoji
                .unwrap_or(current.button_emoji.as_deref()),
        )
        .bind(update.button_style.unwrap_or(current.button_style))
        .bind(
            update
                .discord_category_id
                .unwrap_or(current.discord_category_id.as_deref()),
        )
        .bind(
            update
                .open_message
                .unwrap_or(current.open_message.as_deref()),
        )
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a category. Panel buttons referencing its key will fail at
    /// click time until the panel is re-rendered.
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM ticket_categories WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!("Deleted ticket category {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_sanitize_category_key() {
        assert_eq!(sanitize_category_key("Support"), Some("support".into()));
        assert_eq!(
            sanitize_category_key("  Tech Niques 2!  "),
            Some("techniques2".into())
        );
        assert_eq!(sanitize_category_key("---"), None);
        assert_eq!(sanitize_category_key(""), None);
    }

    #[tokio::test]
    async fn test_create_and_key_lookup() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        TicketCategoryRepository::create(
            pool,
            "g1",
            "support",
            "Support",
            "Get help",
            Some("🎫"),
            1,
            Some("dc1"),
            Some("Welcome!"),
        )
        .await
        .unwrap();

        let by_key = TicketCategoryRepository::get_by_key(pool, "g1", "support")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_key.category_name, "Support");
        assert!(by_key.is_active);

        // Keys are guild-scoped
        assert!(
            TicketCategoryRepository::get_by_key(pool, "g2", "support")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        TicketCategoryRepository::create(
            pool, "g1", "support", "Support", "Help", None, 1, None, None,
        )
        .await
        .unwrap();

        let duplicate = TicketCategoryRepository::create(
            pool, "g1", "support", "Other", "Other", None, 2, None, None,
        )
        .await;
        assert!(matches!(duplicate, Err(DbError::DuplicateCategoryKey(_))));
    }

    #[tokio::test]
    async fn test_name_only_edit_preserves_key_style_emoji() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let support = TicketCategoryRepository::create(
            pool,
            "g1",
            "support",
            "Support",
            "Get help",
            Some("🎫"),
            1,
            None,
            None,
        )
        .await
        .unwrap();
        let billing = TicketCategoryRepository::create(
            pool, "g1", "billing", "Billing", "Billing", None, 3, None, None,
        )
        .await
        .unwrap();

        TicketCategoryRepository::update(
            pool,
            &support.id,
            CategoryUpdate {
                category_name: Some("Technical Support"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let edited = TicketCategoryRepository::get_by_id(pool, &support.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.category_name, "Technical Support");
        assert_eq!(edited.category_key, "support");
        assert_eq!(edited.button_style, 1);
        assert_eq!(edited.button_emoji.as_deref(), Some("🎫"));

        // Other categories are untouched
        let other = TicketCategoryRepository::get_by_id(pool, &billing.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.category_name, "Billing");
        assert_eq!(other.button_style, 3);
    }

    #[tokio::test]
    async fn test_active_listing_and_delete() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let a = TicketCategoryRepository::create(
            pool, "g1", "alpha", "Alpha", "Alpha", None, 1, None, None,
        )
        .await
        .unwrap();
        TicketCategoryRepository::create(pool, "g1", "beta", "Beta", "Beta", None, 2, None, None)
            .await
            .unwrap();

        let active = TicketCategoryRepository::list_active_by_guild(pool, "g1")
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].category_key, "alpha");

        TicketCategoryRepository::delete(pool, &a.id).await.unwrap();
        let remaining = TicketCategoryRepository::list_by_guild(pool, "g1")
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category_key, "beta");
    }
}
