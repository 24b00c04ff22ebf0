//! Database error types.

/// Database operation errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// SQL error from sqlx
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Role request not found
    #[error("Role request not found: {0}")]
    RequestNotFound(String),

    /// A pending request already exists for this (user, role, kind)
    #[error("Duplicate pending request for user {user_id} and role {role_id}")]
    DuplicatePendingRequest { user_id: String, role_id: String },

    /// Role group not found
    #[error("Role group not found: {0}")]
    GroupNotFound(String),

    /// A group with this name already exists in the guild
    #[error("Duplicate group name in guild: {0}")]
    DuplicateGroupName(String),

    /// Ticket not found
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    /// Ticket category not found
    #[error("Ticket category not found: {0}")]
    CategoryNotFound(String),

    /// A category with this key already exists in the guild
    #[error("Duplicate category key in guild: {0}")]
    DuplicateCategoryKey(String),

    /// Ticket panel not found
    #[error("Ticket panel not found: {0}")]
    PanelNotFound(String),

    /// Invalid status string stored in the database
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    /// Invalid roles_config JSON
    #[error("Invalid roles config: {0}")]
    InvalidRolesConfig(#[from] serde_json::Error),

    /// Config directory not found
    #[error("Config/data directory not found")]
    NoConfigDir,

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;
