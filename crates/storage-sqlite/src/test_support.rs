//! Temp-dir database fixture shared by the repository tests.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use fintrack_core::owners::{NewOwner, OwnerRepositoryTrait};

use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::owners::OwnerRepository;

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _temp_dir: TempDir,
}

pub async fn setup() -> TestDb {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let pool = create_pool(&db_path_str).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    TestDb {
        pool,
        writer,
        _temp_dir: temp_dir,
    }
}

/// Registers `owner_id` with email `<owner_id>@example.com`, on 2025-01-01.
pub async fn seed_owner(db: &TestDb, owner_id: &str) {
    OwnerRepository::new(db.pool.clone(), db.writer.clone())
        .create(
            NewOwner {
                id: Some(owner_id.to_string()),
                email: format!("{}@example.com", owner_id),
                display_name: owner_id.to_string(),
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .await
        .expect("Failed to seed owner");
}
