use nonggle_server::config::AppConfig;
use nonggle_server::db;
use nonggle_server::kakao::KakaoClient;
use nonggle_server::web_server::{run_server, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = AppConfig::from_env()?;

    let db_pool = db::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;
    tracing::info!("Migrations complete.");

    let kakao_client = KakaoClient::new(&config.kakao);

    let state = AppState {
        db_pool,
        app_config: config,
        kakao_client,
    };

    run_server(state).await
}
