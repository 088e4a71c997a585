use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./bboard.db?mode=rwc";

/// Picks the database to migrate: an explicit `DATABASE_URL` wins, then the
/// SQLite file the server is configured with (`BBOARD__SERVER__DATABASE__SQLITE`),
/// then the default board file.
fn database_url(database_url: Option<String>, sqlite_path: Option<String>) -> String {
    if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
        return url;
    }
    match sqlite_path.filter(|path| !path.trim().is_empty()) {
        Some(path) => format!("sqlite:{path}?mode=rwc"),
        None => DEFAULT_DATABASE_URL.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("BBOARD__SERVER__DATABASE__SQLITE").ok(),
    );

    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
        }
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|down|fresh|status]");
            eprintln!(
                "Database: DATABASE_URL, else BBOARD__SERVER__DATABASE__SQLITE, else {DEFAULT_DATABASE_URL}"
            );
            std::process::exit(2);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        assert_eq!(
            database_url(
                Some("sqlite::memory:".to_string()),
                Some("board.db".to_string())
            ),
            "sqlite::memory:"
        );
    }

    #[test]
    fn server_sqlite_setting_is_used() {
        assert_eq!(
            database_url(None, Some("/var/lib/bboard/board.db".to_string())),
            "sqlite:/var/lib/bboard/board.db?mode=rwc"
        );
        assert_eq!(
            database_url(Some("  ".to_string()), Some("board.db".to_string())),
            "sqlite:board.db?mode=rwc"
        );
    }

    #[test]
    fn falls_back_to_the_board_file() {
        assert_eq!(database_url(None, None), DEFAULT_DATABASE_URL);
    }
}
