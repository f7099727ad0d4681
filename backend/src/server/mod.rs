//! Server construction and middleware wiring.

mod config;
mod settings;

pub use config::ServerConfig;
pub use settings::CollecteSettings;

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tokio::runtime::Handle;
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::{CollectionRequestStore, NotificationEndpoint};
use backend::domain::{CollectionRequestService, NotificationDispatcher};
use backend::inbound::http::api_scope;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::outbound::notification::WebhookEndpoint;
use backend::outbound::persistence::JsonFileCollectionRequestStore;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

fn build_dispatcher(config: &ServerConfig) -> std::io::Result<NotificationDispatcher> {
    let endpoints = config
        .webhooks
        .iter()
        .map(|(channel, url)| {
            let endpoint = WebhookEndpoint::new(*channel, url.clone(), config.notification_timeout)
                .map_err(|e| {
                    std::io::Error::other(format!("{channel} webhook client setup failed: {e}"))
                })?;
            info!(%channel, url = %url, "notification webhook configured");
            Ok(Arc::new(endpoint) as Arc<dyn NotificationEndpoint>)
        })
        .collect::<std::io::Result<Vec<_>>>()?;

    Ok(NotificationDispatcher::new(endpoints)
        .with_timeout(config.notification_timeout)
        .with_max_pending(config.max_pending_notifications)
        .with_runtime(Handle::current()))
}

/// A bound server plus the background work it must drain on shutdown.
pub struct RunningServer {
    server: Server,
    dispatcher: NotificationDispatcher,
    shutdown_grace: Duration,
}

impl RunningServer {
    /// Drive the listener until it stops, then drain pending notifications.
    ///
    /// # Errors
    /// Propagates the listener's [`std::io::Error`].
    pub async fn run(self, health_state: web::Data<HealthState>) -> std::io::Result<()> {
        let outcome = self.server.await;
        health_state.mark_unhealthy();
        if !self.dispatcher.shutdown(self.shutdown_grace).await {
            warn!("shutting down with undelivered notifications");
        }
        outcome
    }
}

/// Open the record store, wire the use cases, and bind the HTTP listener.
///
/// Must be called from within the main runtime; notification deliveries are
/// pinned to it so they outlive the HTTP workers.
///
/// # Errors
/// Returns [`std::io::Error`] when the record document cannot be opened,
/// a webhook client cannot be built, or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let store = Arc::new(JsonFileCollectionRequestStore::new(config.data_path()));
    let existing = store.load_all().await.map_err(|e| {
        std::io::Error::other(format!("failed to open collection request store: {e}"))
    })?;
    info!(
        path = %config.data_path().display(),
        records = existing.len(),
        "collection request store opened"
    );

    let dispatcher = build_dispatcher(&config)?;
    let service = Arc::new(
        CollectionRequestService::new(
            store,
            Arc::new(dispatcher.clone()),
            Arc::new(DefaultClock),
        )
        .with_minimum_canettes(config.minimum_canettes),
    );
    let http_state = web::Data::new(HttpState::new(service.clone(), service));

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr.clone())?
    .run();

    info!(
        host = %config.bind_addr.0,
        port = config.bind_addr.1,
        minimum_canettes = config.minimum_canettes,
        "collection request service listening"
    );
    health_state.mark_ready();
    Ok(RunningServer {
        server,
        dispatcher,
        shutdown_grace: config.shutdown_grace,
    })
}
