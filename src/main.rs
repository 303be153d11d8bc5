use rusty_library_reservations::{
    adapters::postgres::{
        PostgresAuthBackend, PostgresBookRepository, PostgresEligibilityRules,
        PostgresReservationRepository,
    },
    api::{AppState, create_router},
    application::ServiceDependencies,
    config::{AppConfig, LogFormat},
    i18n::Translator,
};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());
    let (json, pretty) = match config.logging.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();

    tracing::info!(
        "Starting rusty-library-reservations v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations completed");
    }

    let translator = load_translator(&config);

    // Initialize adapters
    let service_deps = ServiceDependencies {
        auth: Arc::new(PostgresAuthBackend::new(
            pool.clone(),
            config.auth.session_ttl()?,
        )),
        eligibility_rules: Arc::new(PostgresEligibilityRules::new(pool.clone())),
        books: Arc::new(PostgresBookRepository::new(pool.clone())),
        reservations: Arc::new(PostgresReservationRepository::new(pool)),
        policy: config.reservations.policy()?,
    };

    let app_state = Arc::new(AppState {
        service_deps,
        translator,
    });
    let app = create_router(app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// ロケールファイルを読み込む（ディレクトリがなければ英語のみ）
fn load_translator(config: &AppConfig) -> Translator {
    let default_locale = config.i18n.default_locale.clone();
    let Some(dir) = config.i18n.locales_dir.as_deref() else {
        return Translator::new(default_locale);
    };

    match Translator::load_dir(default_locale.clone(), Path::new(dir)) {
        Ok(translator) => translator,
        Err(e) => {
            tracing::warn!(dir, "Locale catalogs not loaded, using English: {}", e);
            Translator::new(default_locale)
        }
    }
}
