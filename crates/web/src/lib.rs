pub use crate::common::RouteResult;

use axum::Router;
use config::WebConfig;
use database::LocationRepo;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod api;
pub mod common;
pub mod config;

#[derive(Clone)]
pub struct WebState<R: LocationRepo> {
    pub locations: R,
}

impl<R: LocationRepo> WebState<R> {
    pub fn new(locations: R) -> Self {
        Self { locations }
    }
}

/// The complete application, ready to be served or driven in tests.
pub fn router<R: LocationRepo>(state: WebState<R>) -> Router {
    api::routes(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // any origin, method and header, credentials included
        .layer(CorsLayer::very_permissive())
}

/// Serves until SIGINT or SIGTERM, then drains in-flight requests.
pub async fn start_web_server<R: LocationRepo>(
    state: WebState<R>,
    config: &WebConfig,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.socket_addr()).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(why) = signal::ctrl_c().await {
            log::error!("could not listen for ctrl-c: {}", why);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(why) => {
                log::error!("could not listen for SIGTERM: {}", why);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("shutdown signal received");
}
