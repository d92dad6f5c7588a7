pub mod models;
pub mod schema;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{FileBasedMigrations, MigrationHarness};

const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

/// Loads the canonical migration set for the importer schema.
pub fn migrations() -> FileBasedMigrations {
    FileBasedMigrations::from_path(MIGRATIONS_DIR).expect("failed to load importer migrations")
}

/// Runs all pending migrations against the database before the daemon starts.
pub fn run_migrations(db_url: &str) {
    let mut conn = PgConnection::establish(db_url).expect("failed to connect for migrations");
    conn.run_pending_migrations(migrations())
        .expect("failed to run importer migrations");
}
