/// Musicify Server - music catalog and playlist API
use clap::{Parser, Subcommand};
use musicify_server::{
    config::ServerConfig,
    create_router,
    services::{AuthService, FileStorage, SpotifyMetadata},
    state::AppState,
};
use musicify_storage::{relationships, users, Database};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "musicify-server")]
#[command(about = "Musicify catalog and playlist server", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "MUSICIFY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// List all users
    ListUsers,
    /// Rebuild genre and artist back-references from song data
    Repair,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "musicify_server=info,musicify_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::ListUsers => list_users(&config).await?,
        Commands::Repair => repair(&config).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Musicify server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let db = Database::connect(&config.storage.database_url).await?;
    tracing::info!("Database connected");

    // Initialize file storage
    let file_storage = FileStorage::new(
        config.storage.media_path.clone(),
        config.storage.public_base_url.clone(),
    );
    file_storage.initialize().await?;
    tracing::info!("Media storage at {:?}", config.storage.media_path);

    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiration_hours,
    ));

    let mut app_state = AppState::new(db, auth_service, Arc::new(file_storage));

    if config.metadata.enabled {
        let token = config.metadata.access_token.clone().unwrap_or_default();
        let lookup = SpotifyMetadata::new(config.metadata.api_base_url.clone(), token)?;
        app_state = app_state.with_metadata(Arc::new(lookup));
        tracing::info!("Spotify metadata lookup enabled");
    }

    let app = create_router(app_state, &config.storage.media_path);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.storage.database_url).await?;
    let users = users::get_all(db.pool()).await?;

    println!("Users:");
    for user in users {
        println!(
            "  {} - {} ({})",
            user.id,
            user.display_name(),
            user.email.as_deref().unwrap_or("no email")
        );
    }

    Ok(())
}

async fn repair(config: &ServerConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.storage.database_url).await?;
    let report = relationships::repair(db.pool()).await?;

    if report.is_clean() {
        println!("Catalog is consistent");
    } else {
        println!("Repaired catalog:");
        println!("  stale genre references removed: {}", report.stale_genre_refs);
        println!("  missing genre references added: {}", report.missing_genre_refs);
        println!("  genre counts fixed:             {}", report.genre_counts_fixed);
        println!("  artists fixed:                  {}", report.artists_fixed);
    }

    Ok(())
}
