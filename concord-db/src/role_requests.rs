//! Role change requests and their approval lifecycle.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Kind of role change being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Add,
    Remove,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Add => write!(f, "add"),
            RequestType::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for RequestType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(RequestType::Add),
            "remove" => Ok(RequestType::Remove),
            _ => Err(DbError::InvalidStatus(s.to_string())),
        }
    }
}

/// Lifecycle status of a role request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Denied => write!(f, "denied"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "denied" => Ok(RequestStatus::Denied),
            _ => Err(DbError::InvalidStatus(s.to_string())),
        }
    }
}

/// One user's request for one role change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequest {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub guild_id: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub channel_id: Option<String>,
    pub message_id: Option<String>,
    pub approver_id: Option<String>,
    pub approval_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct RoleRequestRow {
    id: String,
    user_id: String,
    role_id: String,
    guild_id: String,
    request_type: String,
    status: String,
    channel_id: Option<String>,
    message_id: Option<String>,
    approver_id: Option<String>,
    approval_reason: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RoleRequestRow> for RoleRequest {
    type Error = DbError;

    fn try_from(row: RoleRequestRow) -> Result<Self, Self::Error> {
        Ok(RoleRequest {
            id: row.id,
            user_id: row.user_id,
            role_id: row.role_id,
            guild_id: row.guild_id,
            request_type: row.request_type.parse()?,
            status: row.status.parse()?,
            channel_id: row.channel_id,
            message_id: row.message_id,
            approver_id: row.approver_id,
            approval_reason: row.approval_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, user_id, role_id, guild_id, request_type, status, \
     channel_id, message_id, approver_id, approval_reason, created_at, updated_at";

/// Repository for role request operations
pub struct RoleRequestRepository;

impl RoleRequestRepository {
    /// Create a new pending request.
    ///
    /// Rejects creation when a pending request already exists for the same
    /// (user, role, kind) triple.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        role_id: &str,
        guild_id: &str,
        request_type: RequestType,
    ) -> DbResult<RoleRequest> {
        if Self::find_pending(pool, user_id, role_id, guild_id, request_type)
            .await?
            .is_some()
        {
            return Err(DbError::DuplicatePendingRequest {
                user_id: user_id.to_string(),
                role_id: role_id.to_string(),
            });
        }

        let id = format!("rr_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO role_requests
             (id, user_id, role_id, guild_id, request_type, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(role_id)
        .bind(guild_id)
        .bind(request_type.to_string())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(
            "Created {} role request {} for user {} role {}",
            request_type, id, user_id, role_id
        );

        Self::get_by_id(pool, &id)
            .await?
            .ok_or_else(|| DbError::RequestNotFound(id))
    }

    /// Get a request by row id
    pub async fn get_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<RoleRequest>> {
        let row = sqlx::query_as::<_, RoleRequestRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(RoleRequest::try_from).transpose()
    }

    /// Find the pending request for a (user, role, kind) triple, if any
    pub async fn find_pending(
        pool: &SqlitePool,
        user_id: &str,
        role_id: &str,
        guild_id: &str,
        request_type: RequestType,
    ) -> DbResult<Option<RoleRequest>> {
        let row = sqlx::query_as::<_, RoleRequestRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_requests
             WHERE user_id = ? AND role_id = ? AND guild_id = ?
               AND request_type = ? AND status = 'pending'"
        ))
        .bind(user_id)
        .bind(role_id)
        .bind(guild_id)
        .bind(request_type.to_string())
        .fetch_optional(pool)
        .await?;

        row.map(RoleRequest::try_from).transpose()
    }

    /// All pending requests for a guild, oldest first
    pub async fn find_pending_by_guild(
        pool: &SqlitePool,
        guild_id: &str,
    ) -> DbResult<Vec<RoleRequest>> {
        let rows = sqlx::query_as::<_, RoleRequestRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_requests
             WHERE guild_id = ? AND status = 'pending'
             ORDER BY created_at ASC"
        ))
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(RoleRequest::try_from).collect()
    }

    /// All pending requests one user has in a guild
    pub async fn find_pending_by_user(
        pool: &SqlitePool,
        user_id: &str,
        guild_id: &str,
    ) -> DbResult<Vec<RoleRequest>> {
        let rows = sqlx::query_as::<_, RoleRequestRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_requests
             WHERE user_id = ? AND guild_id = ? AND status = 'pending'
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(RoleRequest::try_from).collect()
    }

    /// Record where the approval message for a request was posted.
    ///
    /// Removal requests go to a staff channel rather than the channel the
    /// request came from, so the channel is stored alongside the message.
    pub async fn set_approval_message(
        pool: &SqlitePool,
        id: &str,
        channel_id: &str,
        message_id: &str,
    ) -> DbResult<()> {
        let now = Utc::now().timestamp();
        sqlx::query(
            "UPDATE role_requests SET channel_id = ?, message_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(channel_id)
        .bind(message_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transition a request from pending to approved/denied.
    ///
    /// The update is conditional on the row still being pending, so two
    /// concurrent approvals cannot both succeed. Returns whether the
    /// transition took effect.
    pub async fn resolve_if_pending(
        pool: &SqlitePool,
        id: &str,
        status: RequestStatus,
        approver_id: &str,
        reason: Option<&str>,
    ) -> DbResult<bool> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "UPDATE role_requests
             SET status = ?, approver_id = ?, approval_reason = ?, updated_at = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(status.to_string())
        .bind(approver_id)
        .bind(reason)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        let resolved = result.rows_affected() > 0;
        if resolved {
            info!("Request {} resolved as {} by {}", id, status, approver_id);
        }
        Ok(resolved)
    }

    /// Delete one request by row id
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM role_requests WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete every pending request in a guild, returning how many were removed
    pub async fn delete_pending_by_guild(pool: &SqlitePool, guild_id: &str) -> DbResult<u64> {
        let result =
            sqlx::query("DELETE FROM role_requests WHERE guild_id = ? AND status = 'pending'")
                .bind(guild_id)
                .execute(pool)
                .await?;

        info!(
            "Cleared {} pending requests in guild {}",
            result.rows_affected(),
            guild_id
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let request = RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();

        assert_eq!(request.user_id, "u1");
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.request_type, RequestType::Add);
        assert!(request.approver_id.is_none());

        let fetched = RoleRequestRepository::get_by_id(pool, &request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, request.id);
    }

    #[tokio::test]
    async fn test_duplicate_pending_rejected() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();

        let second = RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add).await;
        assert!(matches!(
            second,
            Err(DbError::DuplicatePendingRequest { .. })
        ));

        // A removal request for the same role is a different kind and is allowed
        RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Remove)
            .await
            .unwrap();

        let pending = RoleRequestRepository::find_pending_by_guild(pool, "g1")
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_is_conditional() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let request = RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();

        let first = RoleRequestRepository::resolve_if_pending(
            pool,
            &request.id,
            RequestStatus::Approved,
            "staff1",
            None,
        )
        .await
        .unwrap();
        assert!(first);

        // Second actor racing on a stale render loses
        let second = RoleRequestRepository::resolve_if_pending(
            pool,
            &request.id,
            RequestStatus::Denied,
            "staff2",
            None,
        )
        .await
        .unwrap();
        assert!(!second);

        let resolved = RoleRequestRepository::get_by_id(pool, &request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.status, RequestStatus::Approved);
        assert_eq!(resolved.approver_id.as_deref(), Some("staff1"));
    }

    #[tokio::test]
    async fn test_pending_resubmit_after_denial() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let request = RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();
        RoleRequestRepository::resolve_if_pending(
            pool,
            &request.id,
            RequestStatus::Denied,
            "staff1",
            Some("not yet"),
        )
        .await
        .unwrap();

        // Once resolved, the user may ask again
        RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clear_pending_by_guild() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();
        RoleRequestRepository::create(pool, "u2", "r2", "g1", RequestType::Add)
            .await
            .unwrap();
        let other_guild = RoleRequestRepository::create(pool, "u1", "r1", "g2", RequestType::Add)
            .await
            .unwrap();

        let cleared = RoleRequestRepository::delete_pending_by_guild(pool, "g1")
            .await
            .unwrap();
        assert_eq!(cleared, 2);

        let untouched = RoleRequestRepository::get_by_id(pool, &other_guild.id)
            .await
            .unwrap();
        assert!(untouched.is_some());
    }

    #[tokio::test]
    async fn test_set_approval_message() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let request = RoleRequestRepository::create(pool, "u1", "r1", "g1", RequestType::Add)
            .await
            .unwrap();
        assert!(request.channel_id.is_none());

        // Removal posts land in a staff channel, so the channel must be
        // remembered with the message or later cleanup deletes from the
        // wrong place.
        RoleRequestRepository::set_approval_message(pool, &request.id, "c42", "m123")
            .await
            .unwrap();

        let fetched = RoleRequestRepository::get_by_id(pool, &request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.channel_id.as_deref(), Some("c42"));
        assert_eq!(fetched.message_id.as_deref(), Some("m123"));
    }
}
