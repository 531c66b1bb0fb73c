use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use home_match::config::Settings;
use home_match::core::{DescriptionGenerator, ListingStore, Matcher};
use home_match::routes::{self, AppState};
use home_match::services::{DescriptionCache, OpenAiClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&log_level, &log_format);

    info!("Starting HomeMatch service...");

    if settings.llm.api_key.is_empty() {
        warn!("No LLM API key configured; set OPENAI_API_KEY or HOMEMATCH__LLM__API_KEY");
    }

    // Initialize listing store
    let mut store = ListingStore::new(settings.scoring_weights());
    if let Some(path) = &settings.listings.seed_path {
        match store.load_seed(path) {
            Ok(count) => info!("Loaded {} listings from {}", count, path),
            Err(e) => {
                error!("Failed to load listings from {}: {}", path, e);
                return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
            }
        }
    }

    // Initialize language model client
    let llm = OpenAiClient::new(
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
        Duration::from_secs(settings.llm.timeout_secs),
    )
    .map_err(|e| {
        error!("Failed to create LLM client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("LLM client initialized (model: {})", settings.llm.model);

    let cache = DescriptionCache::new(settings.cache.capacity, settings.cache.ttl_secs);
    info!(
        "Description cache initialized ({} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let generator = DescriptionGenerator::new(Arc::new(llm), settings.generator_settings()).with_cache(cache);

    let matcher = Matcher::new(generator)
        .with_limits(settings.matching.default_limit, settings.matching.max_limit)
        .with_max_concurrency(settings.llm.max_concurrency);

    info!("Matcher initialized with weights: {:?}", settings.scoring_weights());

    // Build application state
    let app_state = AppState {
        store: Arc::new(RwLock::new(store)),
        matcher,
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
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
