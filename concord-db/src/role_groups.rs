//! Named role bundles that members can request as a unit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// One role inside a group's ordered role list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

/// A named, ordered bundle of roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGroup {
    pub id: String,
    pub guild_id: String,
    pub group_name: String,
    pub roles: Vec<RoleRef>,
    pub required_role_id: Option<String>,
    pub required_role_name: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct RoleGroupRow {
    id: String,
    guild_id: String,
    group_name: String,
    roles_config: String,
    required_role_id: Option<String>,
    required_role_name: Option<String>,
    description: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RoleGroupRow> for RoleGroup {
    type Error = DbError;

    fn try_from(row: RoleGroupRow) -> Result<Self, Self::Error> {
        let roles: Vec<RoleRef> = serde_json::from_str(&row.roles_config)?;
        Ok(RoleGroup {
            id: row.id,
            guild_id: row.guild_id,
            group_name: row.group_name,
            roles,
            required_role_id: row.required_role_id,
            required_role_name: row.required_role_name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, guild_id, group_name, roles_config, required_role_id, \
     required_role_name, description, created_at, updated_at";

/// Repository for role group operations
pub struct RoleGroupRepository;

impl RoleGroupRepository {
    /// Create a new group. Group names are unique per guild.
    pub async fn create(
        pool: &SqlitePool,
        guild_id: &str,
        group_name: &str,
        roles: &[RoleRef],
        description: Option<&str>,
    ) -> DbResult<RoleGroup> {
        if Self::get_by_name(pool, guild_id, group_name).await?.is_some() {
            return Err(DbError::DuplicateGroupName(group_name.to_string()));
        }

        let id = format!("rg_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();
        let roles_config = serde_json::to_string(roles)?;

        sqlx::query(
            "INSERT INTO role_groups
             (id, guild_id, group_name, roles_config, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(guild_id)
        .bind(group_name)
        .bind(&roles_config)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(
            "Created role group '{}' ({} roles) in guild {}",
            group_name,
            roles.len(),
            guild_id
        );

        Self::get_by_id(pool, &id)
            .await?
            .ok_or_else(|| DbError::GroupNotFound(id))
    }

    /// Get a group by row id
    pub async fn get_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<RoleGroup>> {
        let row = sqlx::query_as::<_, RoleGroupRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_groups WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(RoleGroup::try_from).transpose()
    }

    /// Get a group by its display name within a guild
    pub async fn get_by_name(
        pool: &SqlitePool,
        guild_id: &str,
        group_name: &str,
    ) -> DbResult<Option<RoleGroup>> {
        let row = sqlx::query_as::<_, RoleGroupRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_groups WHERE guild_id = ? AND group_name = ?"
        ))
        .bind(guild_id)
        .bind(group_name)
        .fetch_optional(pool)
        .await?;

        row.map(RoleGroup::try_from).transpose()
    }

    /// All groups in a guild, alphabetical
    pub async fn list_by_guild(pool: &SqlitePool, guild_id: &str) -> DbResult<Vec<RoleGroup>> {
        let rows = sqlx::query_as::<_, RoleGroupRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM role_groups WHERE guild_id = ? ORDER BY group_name ASC"
        ))
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(RoleGroup::try_from).collect()
    }

    /// Rename a group. The new name must still be unique in the guild.
    pub async fn update_name(pool: &SqlitePool, id: &str, group_name: &str) -> DbResult<()> {
        let group = Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::GroupNotFound(id.to_string()))?;

        if let Some(existing) = Self::get_by_name(pool, &group.guild_id, group_name).await? {
            if existing.id != id {
                return Err(DbError::DuplicateGroupName(group_name.to_string()));
            }
        }

        let now = Utc::now().timestamp();
        sqlx::query("UPDATE role_groups SET group_name = ?, updated_at = ? WHERE id = ?")
            .bind(group_name)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update a group's description
    pub async fn update_description(
        pool: &SqlitePool,
        id: &str,
        description: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now().timestamp();
        sqlx::query("UPDATE role_groups SET description = ?, updated_at = ? WHERE id = ?")
            .bind(description)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Set or clear the role a member must already hold to request the group
    pub async fn set_required_role(
        pool: &SqlitePool,
        id: &str,
        role: Option<(&str, &str)>,
    ) -> DbResult<()> {
        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::GroupNotFound(id.to_string()))?;

        let (role_id, role_name) = match role {
            Some((role_id, role_name)) => (Some(role_id), Some(role_name)),
            None => (None, None),
        };
        let now = Utc::now().timestamp();
        sqlx::query(
            "UPDATE role_groups
             SET required_role_id = ?, required_role_name = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(role_id)
        .bind(role_name)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a group
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM role_groups WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!("Deleted role group {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    fn roles(ids: &[(&str, &str)]) -> Vec<RoleRef> {
        ids.iter()
            .map(|(id, name)| RoleRef {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_create_preserves_role_order() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let group = RoleGroupRepository::create(
            pool,
            "g1",
            "Moderation",
            &roles(&[("r3", "Mod"), ("r1", "Helper"), ("r2", "Support")]),
            Some("staff bundle"),
        )
        .await
        .unwrap();

        let fetched = RoleGroupRepository::get_by_id(pool, &group.id)
            .await
            .unwrap()
            .unwrap();
        let names: Vec<&str> = fetched.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mod", "Helper", "Support"]);
        assert_eq!(fetched.description.as_deref(), Some("staff bundle"));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_per_guild() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        RoleGroupRepository::create(pool, "g1", "Moderation", &roles(&[("r1", "Mod")]), None)
            .await
            .unwrap();

        let duplicate =
            RoleGroupRepository::create(pool, "g1", "Moderation", &roles(&[("r2", "Helper")]), None)
                .await;
        assert!(matches!(duplicate, Err(DbError::DuplicateGroupName(_))));

        // Same name in another guild is fine
        RoleGroupRepository::create(pool, "g2", "Moderation", &roles(&[("r1", "Mod")]), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rename_checks_uniqueness() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let a = RoleGroupRepository::create(pool, "g1", "Alpha", &roles(&[("r1", "A")]), None)
            .await
            .unwrap();
        RoleGroupRepository::create(pool, "g1", "Beta", &roles(&[("r2", "B")]), None)
            .await
            .unwrap();

        let clash = RoleGroupRepository::update_name(pool, &a.id, "Beta").await;
        assert!(matches!(clash, Err(DbError::DuplicateGroupName(_))));

        // Renaming to its own current name is a no-op, not a clash
        RoleGroupRepository::update_name(pool, &a.id, "Alpha")
            .await
            .unwrap();

        RoleGroupRepository::update_name(pool, &a.id, "Gamma")
            .await
            .unwrap();
        let renamed = RoleGroupRepository::get_by_id(pool, &a.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.group_name, "Gamma");
    }

    #[tokio::test]
    async fn test_required_role_set_and_clear() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let group = RoleGroupRepository::create(pool, "g1", "Staff", &roles(&[("r1", "Mod")]), None)
            .await
            .unwrap();
        assert!(group.required_role_id.is_none());

        RoleGroupRepository::set_required_role(pool, &group.id, Some(("r9", "Member")))
            .await
            .unwrap();
        let gated = RoleGroupRepository::get_by_id(pool, &group.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gated.required_role_id.as_deref(), Some("r9"));
        assert_eq!(gated.required_role_name.as_deref(), Some("Member"));

        RoleGroupRepository::set_required_role(pool, &group.id, None)
            .await
            .unwrap();
        let open = RoleGroupRepository::get_by_id(pool, &group.id)
            .await
            .unwrap()
            .unwrap();
        assert!(open.required_role_id.is_none());
        assert!(open.required_role_name.is_none());

        let missing = RoleGroupRepository::set_required_role(pool, "rg_missing", None).await;
        assert!(matches!(missing, Err(DbError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let group = RoleGroupRepository::create(pool, "g1", "Alpha", &roles(&[("r1", "A")]), None)
            .await
            .unwrap();
        RoleGroupRepository::delete(pool, &group.id).await.unwrap();

        assert!(
            RoleGroupRepository::get_by_id(pool, &group.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
