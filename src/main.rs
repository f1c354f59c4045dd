use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use tradecompanion::{
    config, market_data_from_settings, routes,
    services::{
        alert_monitor::spawn_price_alert_monitor,
        notifier::{LogNotifier, Notifier},
    },
    store::{MemoryStore, MongoStore, Store},
    telegram::{self, CommandDispatcher, TelegramClient, TelegramNotifier},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let store: Arc<dyn Store> = match settings.mongodb_uri.as_deref() {
        Some(uri) => {
            let mongo = MongoStore::connect(uri, &settings.mongodb_db).await?;
            tracing::info!(db = %settings.mongodb_db, "connected to MongoDB");
            Arc::new(mongo)
        }
        None => {
            tracing::warn!("MONGODB_URI not set, using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let market = Arc::new(market_data_from_settings(&settings));
    tracing::info!(providers = ?market.provider_names(), "market data ready");

    let telegram_client = settings
        .telegram_bot_token
        .as_deref()
        .map(|token| TelegramClient::new(token, settings.telegram_api_base.clone()));

    let notifier: Arc<dyn Notifier> = match &telegram_client {
        Some(client) => Arc::new(TelegramNotifier::new(client.clone(), store.clone())),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set, alert notifications go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState::build(settings.clone(), store, market, notifier);

    let loaded = state.alerts.load().await?;
    tracing::info!(alerts = loaded, "active alerts loaded");

    spawn_price_alert_monitor(state.alerts.clone(), settings.alert_check_interval());

    if let Some(client) = telegram_client {
        let dispatcher = CommandDispatcher::from_state(&state);
        tokio::spawn(telegram::run_polling(client, dispatcher));
    }

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
