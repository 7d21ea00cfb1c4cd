use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use photo_gallery::{
    background_task::start_denylist_sweep,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    routes::{configure_routes, multipart_config},
    settings::AppConfig,
    storage::local::LocalImageStore,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
        .supports_credentials()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::new();
    init_tracing(matches!(&config, Ok(cfg) if cfg.is_production()));

    let config = match config {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!("Database migration failed: {}", e);
        std::process::exit(1);
    }

    let image_store = LocalImageStore::new(&config.upload_dir, config.thumbnail_size);
    if let Err(e) = image_store.ensure_dir().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    let redis_pool = config.redis_url.as_ref().and_then(|url| {
        deadpool_redis::Config::from_url(url)
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| tracing::error!("Redis pool creation error: {}", e))
            .ok()
    });

    let app_state = web::Data::new(AppState::new(&config, pool, redis_pool));

    let server_addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        "Starting {} v{} on {} with {} workers",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.worker_count
    );

    let origins = config.cors_origins();
    let max_upload_bytes = config.max_upload_bytes;
    let denylist = app_state.auth_handler.denylist.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(multipart_config(max_upload_bytes))
            .wrap(AuthMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&origins))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::spawn(start_denylist_sweep(denylist));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
