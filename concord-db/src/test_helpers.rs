//! Test helpers for the Concord database.

use crate::{
    concord_db::ConcordDbPool,
    error::{DbError, DbResult},
    sqlite_runtime::create_in_memory_pool,
};

/// Create an in-memory Concord database for testing
pub async fn create_test_pool() -> DbResult<ConcordDbPool> {
    let pool = create_in_memory_pool(1).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))?;

    Ok(ConcordDbPool::from_pool(pool))
}
