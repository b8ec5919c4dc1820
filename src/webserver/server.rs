/// HTTP server lifecycle: bind, serve until shutdown is requested, drain
use axum::Router;
use once_cell::sync::Lazy;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use crate::{
    logger::{self, LogTag},
    webserver::{middleware, routes, state::AppState},
};

/// Set by `shutdown()`; a permit stored before the server waits is not lost
static SHUTDOWN: Lazy<Notify> = Lazy::new(Notify::new);

/// Serve the API on `server.host:server.port` until `shutdown()` is called
pub async fn start_server(state: Arc<AppState>) -> Result<(), String> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|e| bind_error_message(&addr, &e))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("Failed to read bound address: {}", e))?;
    logger::info(
        LogTag::Webserver,
        &format!(
            "Salesboard API on http://{} (docs: /api-docs/openapi.json, CORS {})",
            local,
            if state.config.server.cors_permissive { "permissive" } else { "off" }
        ),
    );

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async {
            SHUTDOWN.notified().await;
            logger::info(LogTag::Webserver, "Draining in-flight requests");
        })
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::info(LogTag::Webserver, "Webserver stopped");
    Ok(())
}

/// Ask the running (or about to run) server to stop accepting connections
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Shutdown requested");
    SHUTDOWN.notify_one();
}

/// Router with middleware applied; used by `start_server` and router tests
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = state.config.server.cors_permissive;
    let app = routes::create_router(state).layer(axum::middleware::from_fn(middleware::log_requests));
    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn bind_error_message(addr: &str, error: &io::Error) -> String {
    let hint = match error.kind() {
        io::ErrorKind::AddrInUse => {
            "address already in use; stop the other process or pick another port with --port / PORT"
        }
        io::ErrorKind::PermissionDenied => {
            "permission denied; ports below 1024 need elevated privileges, use a higher port"
        }
        io::ErrorKind::AddrNotAvailable => {
            "address not available on this machine; check --host / HOST"
        }
        _ => return format!("Failed to bind to {}: {}", addr, error),
    };
    format!("Failed to bind to {}: {}", addr, hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_hints() {
        let in_use = io::Error::from(io::ErrorKind::AddrInUse);
        assert!(bind_error_message("127.0.0.1:5000", &in_use).contains("--port"));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(bind_error_message("0.0.0.0:80", &denied).contains("1024"));

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(
            bind_error_message("localhost:1", &other),
            "Failed to bind to localhost:1: boom"
        );
    }

    #[tokio::test]
    async fn test_second_bind_on_same_port_is_reported() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().unwrap().to_string();
        let err = TcpListener::bind(addr.as_str()).await.unwrap_err();
        assert!(bind_error_message(&addr, &err).contains("already in use"));
    }
}
