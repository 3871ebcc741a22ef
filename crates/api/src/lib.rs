//! # SalonBook API
//!
//! Web server for the SalonBook reservation service: salon discovery,
//! customer authentication, availability queries, and reservation
//! booking/cancellation.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database access.
//! The booking admission sequence (fetch snapshot, check, insert) is
//! serialized per staff member and day through [`BookingLocks`], so two
//! concurrent requests for overlapping intervals cannot both pass the
//! check; the database's exclusion constraint backstops the same invariant
//! across processes.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use axum::Router;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

/// Per-`(staff, date)` booking serialization.
///
/// Booking admission is a read-check-insert sequence; without mutual exclusion
/// two concurrent calls could both observe a free slot and both insert.
/// Each key gets its own async mutex so bookings for different staff
/// members or days never contend with each other.
///
/// The map holds weak references: once every in-flight booking for a key
/// has dropped its `Arc`, the entry is dead and gets pruned on the next
/// acquisition, so the map tracks only keys with active bookings instead
/// of growing for the lifetime of the server.
#[derive(Default)]
pub struct BookingLocks {
    by_key: Mutex<HashMap<(Uuid, NaiveDate), Weak<tokio::sync::Mutex<()>>>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex guarding bookings for one staff member and day.
    /// The caller holds the guard across the whole check-then-insert.
    pub fn lock_for(&self, staff_id: Uuid, date: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        let mut by_key = self.by_key.lock().expect("booking lock map poisoned");
        by_key.retain(|_, lock| lock.strong_count() > 0);

        match by_key.get(&(staff_id, date)).and_then(Weak::upgrade) {
            Some(lock) => lock,
            None => {
                let lock = Arc::new(tokio::sync::Mutex::new(()));
                by_key.insert((staff_id, date), Arc::downgrade(&lock));
                lock
            }
        }
    }

    /// Number of keys currently tracked (live or awaiting the next prune).
    pub fn tracked_keys(&self) -> usize {
        self.by_key.lock().expect("booking lock map poisoned").len()
    }
}

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Loaded server configuration (JWT secret, slot step, ...)
    pub config: config::ApiConfig,
    /// Booking admission serialization (see [`BookingLocks`])
    pub booking_locks: BookingLocks,
}

/// Starts the API server with the provided configuration and database
/// connection: installs the tracing subscriber, assembles the router,
/// applies CORS and timeout layers, and serves until shutdown.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let addr = config.server_addr();
    let request_timeout = config.request_timeout;
    let cors_origins = config.cors_origins.clone();

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        config,
        booking_locks: BookingLocks::new(),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration and login
        .merge(routes::auth::routes())
        // Salon listing and administration
        .merge(routes::salon::routes())
        // Available-slot queries
        .merge(routes::availability::routes())
        // Reservation booking and cancellation
        .merge(routes::reservation::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(request_timeout),
    ));

    // Start the HTTP server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
