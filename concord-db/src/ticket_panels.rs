//! Persistent panel messages, the front door for ticket creation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Default embed color for new panels
pub const DEFAULT_PANEL_COLOR: i64 = 0x0099FF;

/// A persistent message carrying one button per active category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPanel {
    pub id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub panel_title: String,
    pub panel_description: Option<String>,
    pub panel_color: i64,
    pub created_by: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct TicketPanelRow {
    id: String,
    guild_id: String,
    channel_id: String,
    message_id: String,
    panel_title: String,
    panel_description: Option<String>,
    panel_color: i64,
    created_by: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<TicketPanelRow> for TicketPanel {
    fn from(row: TicketPanelRow) -> Self {
        TicketPanel {
            id: row.id,
            guild_id: row.guild_id,
            channel_id: row.channel_id,
            message_id: row.message_id,
            panel_title: row.panel_title,
            panel_description: row.panel_description,
            panel_color: row.panel_color,
            created_by: row.created_by,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, guild_id, channel_id, message_id, panel_title, \
     panel_description, panel_color, created_by, is_active, created_at, updated_at";

/// Repository for ticket panel operations
pub struct TicketPanelRepository;

impl TicketPanelRepository {
    /// Persist a freshly sent panel message
    pub async fn create(
        pool: &SqlitePool,
        guild_id: &str,
        channel_id: &str,
        message_id: &str,
        panel_title: &str,
        panel_description: Option<&str>,
        panel_color: i64,
        created_by: &str,
    ) -> DbResult<TicketPanel> {
        let id = format!("tp_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO ticket_panels
             (id, guild_id, channel_id, message_id, panel_title, panel_description,
              panel_color, created_by, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(guild_id)
        .bind(channel_id)
        .bind(message_id)
        .bind(panel_title)
        .bind(panel_description)
        .bind(panel_color)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(
            "Created ticket panel '{}' in guild {} channel {}",
            panel_title, guild_id, channel_id
        );

        Self::get_by_id(pool, &id)
            .await?
            .ok_or_else(|| DbError::PanelNotFound(id))
    }

    /// Get a panel by row id
    pub async fn get_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<TicketPanel>> {
        let row = sqlx::query_as::<_, TicketPanelRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_panels WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(TicketPanel::from))
    }

    /// All active panels in a guild, newest first
    pub async fn list_active_by_guild(
        pool: &SqlitePool,
        guild_id: &str,
    ) -> DbResult<Vec<TicketPanel>> {
        let rows = sqlx::query_as::<_, TicketPanelRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM ticket_panels
             WHERE guild_id = ? AND is_active = 1 ORDER BY created_at DESC"
        ))
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TicketPanel::from).collect())
    }

    /// Update the customizable fields after an edit wizard completes
    pub async fn update_customization(
        pool: &SqlitePool,
        id: &str,
        panel_title: &str,
        panel_description: Option<&str>,
        panel_color: i64,
    ) -> DbResult<()> {
        let now = Utc::now().timestamp();
        sqlx::query(
            "UPDATE ticket_panels
             SET panel_title = ?, panel_description = ?, panel_color = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(panel_title)
        .bind(panel_description)
        .bind(panel_color)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a panel row (the Discord message is removed by the caller first)
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM ticket_panels WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!("Deleted ticket panel {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_create_with_defaults() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let panel = TicketPanelRepository::create(
            pool,
            "g1",
            "c1",
            "m1",
            "Open a ticket",
            Some("Pick a reason below"),
            DEFAULT_PANEL_COLOR,
            "u1",
        )
        .await
        .unwrap();

        assert!(panel.is_active);
        assert_eq!(panel.panel_color, 0x0099FF);
        assert_eq!(panel.created_by, "u1");
    }

    #[tokio::test]
    async fn test_list_active_newest_first() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let older = TicketPanelRepository::create(
            pool, "g1", "c1", "m1", "First", None, DEFAULT_PANEL_COLOR, "u1",
        )
        .await
        .unwrap();
        // Force distinct created_at ordering
        sqlx::query("UPDATE ticket_panels SET created_at = created_at - 10 WHERE id = ?")
            .bind(&older.id)
            .execute(pool)
            .await
            .unwrap();
        TicketPanelRepository::create(
            pool, "g1", "c2", "m2", "Second", None, DEFAULT_PANEL_COLOR, "u1",
        )
        .await
        .unwrap();

        let panels = TicketPanelRepository::list_active_by_guild(pool, "g1")
            .await
            .unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].panel_title, "Second");
    }

    #[tokio::test]
    async fn test_customize_and_delete() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let panel = TicketPanelRepository::create(
            pool, "g1", "c1", "m1", "Title", None, DEFAULT_PANEL_COLOR, "u1",
        )
        .await
        .unwrap();

        TicketPanelRepository::update_customization(
            pool,
            &panel.id,
            "New title",
            Some("New description"),
            0xFF0000,
        )
        .await
        .unwrap();

        let updated = TicketPanelRepository::get_by_id(pool, &panel.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.panel_title, "New title");
        assert_eq!(updated.panel_color, 0xFF0000);
        // Message location does not change on customize
        assert_eq!(updated.message_id, "m1");

        TicketPanelRepository::delete(pool, &panel.id).await.unwrap();
        assert!(
            TicketPanelRepository::get_by_id(pool, &panel.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
