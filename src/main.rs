use color_eyre::eyre::Result;
use cuetime_api::config::ApiConfig;
use cuetime_db::{create_pool, schema::initialize_database};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Drop sessions that expired while the server was down
    let removed = cuetime_db::repositories::session::delete_expired_sessions(&db_pool).await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    // Start API server
    cuetime_api::start_server(config, db_pool).await?;

    Ok(())
}
