// File: zolory-core/src/test_utils/helpers.rs

use std::time::Duration;
use tempfile::TempDir;

use crate::db::Database;
use crate::Error;

/// A migrated database in its own temporary directory. The directory (and
/// the database file) is removed when this is dropped.
pub struct TestDatabase {
    pub db: Database,
    _dir: TempDir,
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

/// Creates a fresh file-backed SQLite database and applies all migrations.
/// File-backed so every pooled connection shares one store.
pub async fn setup_test_database() -> Result<TestDatabase, Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ledger_test.db");

    let db = Database::open_file(&path, 5, Duration::from_secs(5)).await?;
    db.migrate().await?;

    Ok(TestDatabase { db, _dir: dir })
}

/// Moves a column's stored epoch back by `seconds` for every matching row.
///
/// `table` and `column` come from test code only.
pub async fn backdate(
    db: &Database,
    table: &str,
    column: &str,
    seconds: i64,
) -> Result<u64, Error> {
    let sql = format!("UPDATE {table} SET {column} = {column} - ?1");
    let affected = sqlx::query(&sql)
        .bind(seconds)
        .execute(db.pool())
        .await?
        .rows_affected();
    Ok(affected)
}
