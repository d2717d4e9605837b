//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically
//! - Helpers shared by services that keep the artist's booked-date list in sync

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each migration runs only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

/// Format a date the way it is stored in `artists.booked_dates`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Lock an artist row and return its booked dates.
///
/// Returns `None` when the artist does not exist. Must be called inside a
/// transaction; the row stays locked until commit or rollback.
pub async fn lock_artist_booked_dates(
    conn: &mut PgConnection,
    artist_id: Uuid,
) -> Result<Option<Vec<String>>, sqlx::Error> {
    sqlx::query_scalar("SELECT booked_dates FROM artists WHERE id = $1 FOR UPDATE")
        .bind(artist_id)
        .fetch_optional(conn)
        .await
}

/// Append dates to an artist's booked-date list.
pub async fn add_booked_dates(
    conn: &mut PgConnection,
    artist_id: Uuid,
    dates: &[NaiveDate],
) -> Result<(), sqlx::Error> {
    let keys: Vec<String> = dates.iter().copied().map(date_key).collect();

    sqlx::query(
        "UPDATE artists SET booked_dates = booked_dates || $1::text[], updated_at = NOW() WHERE id = $2",
    )
    .bind(&keys)
    .bind(artist_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Remove a single date from an artist's booked-date list.
pub async fn remove_booked_date(
    conn: &mut PgConnection,
    artist_id: Uuid,
    date: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE artists SET booked_dates = array_remove(booked_dates, $1), updated_at = NOW() WHERE id = $2",
    )
    .bind(date_key(date))
    .bind(artist_id)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_is_iso_formatted() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date_key(date), "2026-03-07");
    }
}
