use color_eyre::eyre::Result;
use dotenv::dotenv;
use eyre::WrapErr;
use salonbook_db::schema::initialize_database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Get database connection string from environment variable
    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    println!("Connecting to database...");
    // Create database connection pool
    let db_pool = salonbook_db::create_pool(&database_url).await?;

    // Initialize database schema
    println!("Initializing database schema...");
    initialize_database(&db_pool).await?;
    println!("Database schema initialized successfully.");

    Ok(())
}
