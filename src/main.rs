use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use lingua_school_backend::auth::jwt::TokenValidator;
use lingua_school_backend::cache::CatalogCache;
use lingua_school_backend::config::AppConfig;
use lingua_school_backend::create_pool;
use lingua_school_backend::feedback::{KeywordSentiment, ScorerData};
use lingua_school_backend::handlers;
use lingua_school_backend::notifications;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;
    tracing::info!("Database ready");
    let db_data = web::Data::new(db);

    let cache = CatalogCache::connect(config.redis_url.as_deref(), config.course_cache_ttl).await;
    let cache_data = web::Data::new(Arc::new(cache));

    let validator = web::Data::new(Arc::new(TokenValidator::from_config(&config.auth)));
    let notifier = web::Data::new(notifications::from_config(&config.mail));
    let scorer: ScorerData = Arc::new(KeywordSentiment::default());
    let scorer = web::Data::new(scorer);

    let bind_addr = config.bind_addr();
    tracing::info!(
        reenrollment = ?config.reenrollment,
        "Server running at http://{bind_addr}"
    );
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(cache_data.clone())
            .app_data(validator.clone())
            .app_data(notifier.clone())
            .app_data(scorer.clone())
            .app_data(config_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
