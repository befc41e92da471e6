//! Server loop with idle keep-alive limits and bounded graceful shutdown.

use crate::config::HttpServerConfig;
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::Service;

/// Connection-level timeouts of [`serve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeTimeouts {
    /// How long a connection may wait for its next request head.
    pub idle: Duration,
    /// Grace period for in-flight requests once shutdown starts.
    pub stop: Duration,
}

impl ServeTimeouts {
    /// Takes `idle_timeout` and `stop_timeout` from the server settings.
    #[must_use]
    pub fn from_config(config: &HttpServerConfig) -> Self {
        Self {
            idle: config.idle_timeout,
            stop: config.stop_timeout,
        }
    }
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// A keep-alive connection that sends no request head within
/// `timeouts.idle` is closed. Once `shutdown` resolves no new connections
/// are accepted, and in-flight requests get at most `timeouts.stop` to
/// finish before they are abandoned. Handlers see the peer address through
/// `ConnectInfo<SocketAddr>`.
pub async fn serve<F>(listener: TcpListener, router: Router, timeouts: ServeTimeouts, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let mut make_service = router.into_make_service_with_connect_info::<SocketAddr>();
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.idle);

    let (stop_tx, stop_rx) = watch::channel(());
    let (closed_tx, closed_rx) = watch::channel(());
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            },
            () = &mut shutdown => break,
        };

        let service = match make_service.call(peer).await {
            Ok(service) => service,
            Err(never) => match never {},
        };
        let connection = builder
            .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
            .with_upgrades();
        let mut stop_rx = stop_rx.clone();
        let closed_rx = closed_rx.clone();

        tokio::spawn(async move {
            tokio::pin!(connection);
            let result = tokio::select! {
                result = connection.as_mut() => result,
                _ = stop_rx.changed() => {
                    connection.as_mut().graceful_shutdown();
                    connection.await
                }
            };
            if let Err(e) = result {
                tracing::debug!(%peer, error = %e, "connection ended with error");
            }
            drop(closed_rx);
        });
    }

    drop(listener);
    drop(closed_rx);
    tracing::info!(stop_timeout = ?timeouts.stop, "shutting down");
    // No receiver left means no open connection to notify.
    let _ = stop_tx.send(());

    if tokio::time::timeout(timeouts.stop, closed_tx.closed())
        .await
        .is_err()
    {
        tracing::warn!(stop_timeout = ?timeouts.stop, "in-flight requests abandoned");
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::rest::{AppState, create_router};
    use crate::application::services::admission::build_gate;
    use crate::config::RateLimitConfig;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn post(addr: SocketAddr, body: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn timeouts(idle: Duration) -> ServeTimeouts {
        ServeTimeouts {
            idle,
            stop: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let rate_limit = RateLimitConfig {
            limit: 1,
            ..RateLimitConfig::default()
        };
        let gate = build_gate(&rate_limit).unwrap();
        let state = Arc::new(AppState::new(gate, rate_limit, Duration::from_secs(5)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            create_router(state),
            timeouts(Duration::from_secs(60)),
            async move {
                let _ = rx.await;
            },
        ));

        let body = r#"{"X1":"1","X2":"2","X3":"3","Y1":"3","Y2":"2","Y3":"1","E":1}"#;
        let first = post(addr, body).await;
        assert!(first.starts_with("HTTP/1.1 200"));
        assert!(first.contains(r#"{"status":"OK","X":"1.5","Y":"1.5","IsEqual":"T"}"#));
        assert!(first.to_ascii_lowercase().contains("x-request-id"));

        // Same peer address, quota of one.
        let second = post(addr, body).await;
        assert!(second.starts_with("HTTP/1.1 429"));

        tx.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn idle_connection_is_closed() {
        let rate_limit = RateLimitConfig::default();
        let gate = build_gate(&rate_limit).unwrap();
        let state = Arc::new(AppState::new(gate, rate_limit, Duration::from_secs(5)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            create_router(state),
            timeouts(Duration::from_millis(200)),
            async move {
                let _ = rx.await;
            },
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let mut rest = Vec::new();
        let closed =
            tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut rest)).await;
        assert!(closed.is_ok(), "idle connection stayed open");

        tx.send(()).unwrap();
        server.await.unwrap();
    }
}
