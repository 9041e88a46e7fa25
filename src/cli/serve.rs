use anyhow::Result;
use console::style;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::info;

use crate::core::booking::{BookingService, HttpTransport};
use crate::core::jobs::RecordStore;
use crate::core::settings::Settings;
use crate::core::store::{KeyValueStore, SqliteStore};
use crate::core::terminal::GuideSection;
use crate::core::vault::KeyVault;
use crate::interfaces::web::{ApiServer, ApiServerConfig};
use crate::logging::{LOG_FEED_CAPACITY, init_server_logging};
use crate::platform::{NativePlatform, Platform};

use super::parse_api_server_flags;

pub async fn run_serve(args: &[String]) -> Result<()> {
    let (log_tx, _) = broadcast::channel(LOG_FEED_CAPACITY);
    init_server_logging(log_tx.clone());

    let data_dir = NativePlatform::data_dir();
    let mut settings = Settings::load(&data_dir)?;
    let (api_host, api_port) = parse_api_server_flags(args, 2, None, None)?;
    if let Some(host) = api_host {
        settings.api_host = host;
    }
    if let Some(port) = api_port {
        settings.api_port = port;
    }

    let sqlite = SqliteStore::open(&data_dir).await?;
    let vault = Arc::new(KeyVault::new(sqlite.get_db()));
    vault.initialize().await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(sqlite);

    settings.apply_runtime_override(store.as_ref()).await;
    if !settings.webhook_configured() {
        info!("No webhook URL configured, bookings will be simulated locally");
    }

    let records = RecordStore::load(store.clone()).await;
    let on_record = if records.is_empty() {
        "none yet".to_string()
    } else {
        records.len().to_string()
    };
    let records = Arc::new(Mutex::new(records));
    let api_host = settings.api_host.clone();
    let api_port = settings.api_port;
    let webhook = settings.webhook_url.clone();
    let settings = Arc::new(RwLock::new(settings));
    let bookings = Arc::new(BookingService::new(
        records.clone(),
        settings.clone(),
        Arc::new(HttpTransport::new()),
    ));

    GuideSection::new("Flash Fix API")
        .status(
            "Listening",
            &format!(
                "{}",
                style(format!("http://{}:{}", api_host, api_port))
                    .underlined()
                    .cyan()
            ),
        )
        .status("Data", &data_dir.display().to_string())
        .status("Jobs", &on_record)
        .status(
            "Webhook",
            if webhook.trim().is_empty() {
                "none (simulated)"
            } else {
                webhook.as_str()
            },
        )
        .blank()
        .status(
            "Press Ctrl+C to stop the server.",
            &format!("{}", style("Ctrl+C").bold().yellow()),
        )
        .print();
    println!();

    let server = ApiServer::new(ApiServerConfig {
        records,
        bookings,
        settings,
        store,
        vault,
        log_tx,
        api_host,
        api_port,
    });
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
