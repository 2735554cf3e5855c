//! Shared test scaffolding: a migrated SQLite store backed by a temp file.
//!
//! A file-backed pool (rather than `sqlite::memory:`) is used deliberately —
//! `open_pool` hands out up to 10 pooled connections, and each would open its
//! own empty database under `:memory:`, unlike the teacher's `setup_test_db`
//! which gets away with `:memory:` because it never pools more than one.

use std::sync::Arc;

use swarmd::adapters::sqlite::{all_embedded_migrations, open_pool, Migrator, SqliteStore};
use swarmd::domain::ports::Store;

#[allow(dead_code)]
pub struct TestStore {
    pub store: Arc<dyn Store>,
    _db_file: tempfile::NamedTempFile,
}

#[allow(dead_code)]
pub async fn test_store() -> TestStore {
    let db_file = tempfile::NamedTempFile::new().expect("failed to create temp db file");
    let database_url = format!("sqlite:{}", db_file.path().display());

    let pool = open_pool(&database_url).await.expect("failed to open pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("failed to run migrations");

    TestStore {
        store: Arc::new(SqliteStore::new(pool)),
        _db_file: db_file,
    }
}
