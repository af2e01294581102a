use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use scholar_match::config::{LoggingSettings, Settings, StorageBackend};
use scholar_match::core::{build_embedder, MatchPipeline, Matcher};
use scholar_match::routes::{self, auth::Authenticator, matches::AppState};
use scholar_match::services::{catalog, InMemoryStore, PostgresStore, Storage};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            return Err(startup_error("Failed to load configuration", e));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Scholar Match service...");

    // Embedding model: built once, shared read-only by every worker
    let embedder = build_embedder(
        settings.embedding.backend,
        settings.embedding.dimension,
        settings.embedding.cache_dir.clone(),
    )
    .map_err(|e| startup_error("Failed to initialize embedder", e))?;

    info!(
        "Embedder initialized: {} ({} dimensions)",
        embedder.model_name(),
        embedder.dimension()
    );

    let storage: Arc<dyn Storage> = match settings.database.backend {
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let store = PostgresStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            Arc::new(InMemoryStore::new())
        }
    };

    if settings.catalog.seed_on_startup {
        catalog::seed_if_empty(storage.as_ref(), embedder.as_ref())
            .await
            .map_err(|e| startup_error("Failed to seed scholarship catalog", e))?;
    }

    let weights = settings.matching.weights();
    let matcher = Matcher::new(weights, settings.matching.top_k);

    info!(
        "Matcher initialized with weights: {:?}, top_k: {}",
        weights, settings.matching.top_k
    );

    let authenticator = web::Data::new(Authenticator::new(
        settings.auth.jwt_secret.as_deref(),
        settings.auth.admin_subjects.clone(),
    ));
    if !authenticator.is_enabled() {
        warn!("No auth.jwt_secret configured; user ids are trusted as given and catalog writes are refused");
    }

    // Build application state
    let app_state = AppState {
        pipeline: MatchPipeline::new(storage, embedder, matcher),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(authenticator.clone())
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
