//! Support tickets and their open/close lifecycle.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Lifecycle status of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(DbError::InvalidStatus(s.to_string())),
        }
    }
}

/// A single support conversation bound to one private channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_id: String,
    pub user_id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub category_id: Option<String>,
    pub ticket_type: String,
    pub status: TicketStatus,
    pub closed_by: Option<String>,
    pub close_reason: Option<String>,
    pub closed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Per-guild ticket counts for the stats view
#[derive(Debug, Clone, Default)]
pub struct TicketStats {
    pub open: i64,
    pub closed: i64,
    pub by_type: Vec<(String, i64)>,
}

impl TicketStats {
    pub fn total(&self) -> i64 {
        self.open + self.closed
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    ticket_id: String,
    user_id: String,
    guild_id: String,
    channel_id: String,
    category_id: Option<String>,
    ticket_type: String,
    status: String,
    closed_by: Option<String>,
    close_reason: Option<String>,
    closed_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DbError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Ticket {
            id: row.id,
            ticket_id: row.ticket_id,
            user_id: row.user_id,
            guild_id: row.guild_id,
            channel_id: row.channel_id,
            category_id: row.category_id,
            ticket_type: row.ticket_type,
            status: row.status.parse()?,
            closed_by: row.closed_by,
            close_reason: row.close_reason,
            closed_at: row.closed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, ticket_id, user_id, guild_id, channel_id, category_id, \
     ticket_type, status, closed_by, close_reason, closed_at, created_at, updated_at";

/// Repository for ticket operations
pub struct TicketRepository;

impl TicketRepository {
    /// Persist a newly opened ticket
    pub async fn create(
        pool: &SqlitePool,
        ticket_id: &str,
        user_id: &str,
        guild_id: &str,
        channel_id: &str,
        ticket_type: &str,
        category_id: Option<&str>,
    ) -> DbResult<Ticket> {
        let id = format!("tk_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO tickets
             (id, ticket_id, user_id, guild_id, channel_id, category_id, ticket_type,
              status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'open', ?, ?)",
        )
        .bind(&id)
        .bind(ticket_id)
        .bind(user_id)
        .bind(guild_id)
        .bind(channel_id)
        .bind(category_id)
        .bind(ticket_type)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(
            "Opened ticket {} for user {} in guild {}",
            ticket_id, user_id, guild_id
        );

        Self::get_by_ticket_id(pool, ticket_id)
            .await?
            .ok_or_else(|| DbError::TicketNotFound(ticket_id.to_string()))
    }

    /// Get a ticket by its human-readable identifier
    pub async fn get_by_ticket_id(pool: &SqlitePool, ticket_id: &str) -> DbResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tickets WHERE ticket_id = ?"
        ))
        .bind(ticket_id)
        .fetch_optional(pool)
        .await?;

        row.map(Ticket::try_from).transpose()
    }

    /// The open ticket a user has in a guild, if any
    pub async fn find_open_by_user(
        pool: &SqlitePool,
        user_id: &str,
        guild_id: &str,
    ) -> DbResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tickets
             WHERE user_id = ? AND guild_id = ? AND status = 'open'
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(guild_id)
        .fetch_optional(pool)
        .await?;

        row.map(Ticket::try_from).transpose()
    }

    /// Close a ticket. Conditional on the row still being open; returns
    /// whether the close took effect.
    pub async fn close_if_open(
        pool: &SqlitePool,
        ticket_id: &str,
        closed_by: &str,
        reason: Option<&str>,
    ) -> DbResult<bool> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "UPDATE tickets
             SET status = 'closed', closed_by = ?, close_reason = ?, closed_at = ?, updated_at = ?
             WHERE ticket_id = ? AND status = 'open'",
        )
        .bind(closed_by)
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(ticket_id)
        .execute(pool)
        .await?;

        let closed = result.rows_affected() > 0;
        if closed {
            info!("Closed ticket {} (by {})", ticket_id, closed_by);
        }
        Ok(closed)
    }

    /// Per-guild counts for the stats view
    pub async fn stats_by_guild(pool: &SqlitePool, guild_id: &str) -> DbResult<TicketStats> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tickets WHERE guild_id = ? GROUP BY status",
        )
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        let by_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT ticket_type, COUNT(*) FROM tickets
             WHERE guild_id = ? GROUP BY ticket_type ORDER BY COUNT(*) DESC",
        )
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        let mut stats = TicketStats {
            by_type,
            ..Default::default()
        };
        for (status, count) in counts {
            match status.parse::<TicketStatus>()? {
                TicketStatus::Open => stats.open = count,
                TicketStatus::Closed => stats.closed = count,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_single_open_ticket_lifecycle() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        assert!(
            TicketRepository::find_open_by_user(pool, "u1", "g1")
                .await
                .unwrap()
                .is_none()
        );

        let ticket = TicketRepository::create(
            pool,
            "ticket-support-1700000000",
            "u1",
            "g1",
            "c1",
            "support",
            Some("cat1"),
        )
        .await
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        // The open ticket is found by the pre-creation guard query
        let open = TicketRepository::find_open_by_user(pool, "u1", "g1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open.ticket_id, "ticket-support-1700000000");

        let closed = TicketRepository::close_if_open(pool, &ticket.ticket_id, "u1", None)
            .await
            .unwrap();
        assert!(closed);

        // After closing, a new ticket may be opened
        assert!(
            TicketRepository::find_open_by_user(pool, "u1", "g1")
                .await
                .unwrap()
                .is_none()
        );
        TicketRepository::create(
            pool,
            "ticket-support-1700000100",
            "u1",
            "g1",
            "c2",
            "support",
            None,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_close_is_conditional() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let ticket = TicketRepository::create(
            pool,
            "ticket-billing-1700000000",
            "u1",
            "g1",
            "c1",
            "billing",
            None,
        )
        .await
        .unwrap();

        let first = TicketRepository::close_if_open(pool, &ticket.ticket_id, "staff1", Some("done"))
            .await
            .unwrap();
        assert!(first);

        let second = TicketRepository::close_if_open(pool, &ticket.ticket_id, "staff2", None)
            .await
            .unwrap();
        assert!(!second);

        let row = TicketRepository::get_by_ticket_id(pool, &ticket.ticket_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, TicketStatus::Closed);
        assert_eq!(row.closed_by.as_deref(), Some("staff1"));
        assert_eq!(row.close_reason.as_deref(), Some("done"));
        assert!(row.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_stats_by_guild() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        for (n, ty) in [(1, "support"), (2, "support"), (3, "billing")] {
            TicketRepository::create(
                pool,
                &format!("ticket-{ty}-{n}"),
                &format!("u{n}"),
                "g1",
                &format!("c{n}"),
                ty,
                None,
            )
            .await
            .unwrap();
        }
        TicketRepository::close_if_open(pool, "ticket-billing-3", "staff1", None)
            .await
            .unwrap();

        let stats = TicketRepository::stats_by_guild(pool, "g1").await.unwrap();
        assert_eq!(stats.open, 2);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.by_type[0], ("support".to_string(), 2));
    }
}
