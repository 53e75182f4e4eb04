//! Database connection pool and schema setup

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
}

/// Split SQL into statements, keeping $$ delimited blocks intact
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_dollar_block = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if c == '$' && chars.peek() == Some(&'$') {
            current.push('$');
            chars.next();
            in_dollar_block = !in_dollar_block;
        } else if c == ';' && !in_dollar_block {
            if has_sql_content(&current) {
                statements.push(current.trim().to_string());
            }
            current.clear();
        }
    }

    if has_sql_content(&current) {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Whether a chunk holds anything besides comments and whitespace
fn has_sql_content(s: &str) -> bool {
    s.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with("--")
    })
}

/// Apply the schema. Every statement is idempotent, so this runs on each start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migration_sql = include_str!("migrations/001_initial.sql");

    for statement in split_sql_statements(migration_sql) {
        sqlx::query(&statement).execute(pool).await.map_err(|e| {
            tracing::error!("Migration statement failed: {}", e);
            e
        })?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_dollar_blocks_together() {
        let sql = r#"
            -- enum
            DO $$ BEGIN
                CREATE TYPE x AS ENUM ('a');
            EXCEPTION WHEN duplicate_object THEN NULL;
            END $$;

            CREATE TABLE IF NOT EXISTS t (id INT);
        "#;

        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TYPE x"));
        assert!(statements[0].ends_with("END $$;"));
        assert!(statements[1].starts_with("CREATE TABLE"));
    }

    #[test]
    fn test_split_drops_comment_only_chunks() {
        let statements = split_sql_statements("-- only a comment\n");
        assert!(statements.is_empty());
    }

    #[test]
    fn test_schema_file_splits_cleanly() {
        let statements = split_sql_statements(include_str!("migrations/001_initial.sql"));
        assert!(statements.iter().any(|s| s.contains("CREATE TABLE IF NOT EXISTS bookings")));
        assert!(statements
            .iter()
            .any(|s| s.contains("CREATE TYPE booking_status")));
        assert!(statements.iter().all(|s| s.trim_end().ends_with(';')));
    }
}
