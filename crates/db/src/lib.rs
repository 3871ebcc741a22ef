pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use eyre::Result;
use salonbook_core::errors::BookingError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

/// Maps a repository failure into the domain taxonomy. Pool exhaustion and
/// connection-level I/O failures are transient and safe for the caller to
/// retry; anything else is a database fault.
pub fn classify_error(err: eyre::Report) -> BookingError {
    let transient = err
        .downcast_ref::<sqlx::Error>()
        .map(|e| {
            matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        })
        .unwrap_or(false);

    if transient {
        BookingError::Unavailable(err.to_string())
    } else {
        BookingError::Database(err)
    }
}


pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
