use chrono::{DateTime, Utc};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Pins the publication time of a listing, so orderings don't depend on
/// the clock resolution.
#[allow(dead_code)]
pub async fn set_published(db: &DatabaseConnection, bb_id: i32, published: DateTime<Utc>) {
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "UPDATE bbs SET published = ?, updated_at = ? WHERE id = ?",
        [published.into(), published.into(), bb_id.into()],
    ))
    .await
    .unwrap();
}
