mod handlers;
mod router;

use anyhow::Result;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::core::booking::BookingService;
use crate::core::jobs::RecordStore;
use crate::core::settings::Settings;
use crate::core::store::KeyValueStore;
use crate::core::vault::KeyVault;

use router::build_api_router;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) records: Arc<Mutex<RecordStore>>,
    pub(crate) bookings: Arc<BookingService>,
    pub(crate) settings: Arc<RwLock<Settings>>,
    pub(crate) store: Arc<dyn KeyValueStore>,
    pub(crate) vault: Arc<KeyVault>,
    pub(crate) log_tx: broadcast::Sender<String>,
    pub(crate) api_host: String,
    pub(crate) api_port: u16,
}

pub struct ApiServerConfig {
    pub records: Arc<Mutex<RecordStore>>,
    pub bookings: Arc<BookingService>,
    pub settings: Arc<RwLock<Settings>>,
    pub store: Arc<dyn KeyValueStore>,
    pub vault: Arc<KeyVault>,
    pub log_tx: broadcast::Sender<String>,
    pub api_host: String,
    pub api_port: u16,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig) -> Self {
        Self {
            state: AppState {
                records: config.records,
                bookings: config.bookings,
                settings: config.settings,
                store: config.store,
                vault: config.vault,
                log_tx: config.log_tx,
                api_host: config.api_host,
                api_port: config.api_port,
            },
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.state.api_host, self.state.api_port);
        let app = build_api_router(self.state);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("API Server running at http://{}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("API Server stopped");
        Ok(())
    }
}

async fn sse_logs_endpoint(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.log_tx.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(line) => Ok(Event::default().data(line)),
        Err(_) => Ok(Event::default().data("Log stream lagged")),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
