//! concord-db: SQLite storage layer for the Concord bot.
//!
//! This crate provides database operations for:
//! - Role request approval/denial workflows
//! - Role groups requestable as a unit
//! - Ticket lifecycle, categories and panels

pub mod concord_db;
pub mod error;
pub mod role_groups;
pub mod role_requests;
mod sqlite_runtime;
pub mod ticket_categories;
pub mod ticket_panels;
pub mod tickets;

// Re-export commonly used types
pub use concord_db::ConcordDbPool;
pub use error::{DbError, DbResult};
pub use role_groups::{RoleGroup, RoleGroupRepository, RoleRef};
pub use role_requests::{RequestStatus, RequestType, RoleRequest, RoleRequestRepository};
pub use ticket_categories::{
    CategoryUpdate, TicketCategory, TicketCategoryRepository, sanitize_category_key,
};
pub use ticket_panels::{DEFAULT_PANEL_COLOR, TicketPanel, TicketPanelRepository};
pub use tickets::{Ticket, TicketRepository, TicketStats, TicketStatus};

// Re-export test helpers when running tests or when test-helpers feature is enabled
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
