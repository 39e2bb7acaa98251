use std::error::Error;

use sea_orm::{EntityTrait, PaginatorTrait};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barn::models::{asset, book, reading_list};
use barn::{config, db, seed, storage, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barn=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db_with_pool(&config.database_url, config.max_connections).await?;
    let store = storage::from_config(&config).await?;
    let state = AppState::new(db, store);

    if config.seed_demo_data {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&state).await {
            tracing::error!("Failed to seed data: {}", e);
        }
    }

    let books = book::Entity::find().count(state.db()).await?;
    let assets = asset::Entity::find().count(state.db()).await?;
    let lists = reading_list::Entity::find().count(state.db()).await?;
    tracing::info!(
        "Catalog ready at {}: {} books, {} assets, {} reading lists",
        config.database_url,
        books,
        assets,
        lists
    );

    Ok(())
}
