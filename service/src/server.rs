//! Serving and graceful shutdown.

use std::future::Future;
use std::io;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinError;

/// Serves `app` on `listener` until `shutdown` resolves. Then the listener
/// stops accepting connections, and in-flight requests get `grace` to finish
/// before the server is abandoned.
///
/// Abandoning aborts only the accept loop. Connections still open at that
/// point live on their own tasks and keep running until the runtime is
/// dropped, so callers must return from `main` promptly after `serve`
/// returns. Dropping the runtime closes those connections.
///
/// # Errors
///
/// Returns the I/O error if the server fails while running.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        () = shutdown => {}
    }

    tracing::info!(grace_secs = grace.as_secs_f64(), "Shutting down server");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            tracing::info!("Server shut down gracefully");
            flatten(result)
        }
        Err(_) => {
            tracing::warn!(
                "Grace period elapsed, abandoning remaining connections until the runtime exits"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    result.map_err(io::Error::other)?
}

/// Resolves on Ctrl+C, or on SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "done"
    }

    async fn bound() -> (TcpListener, std::net::SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[tokio::test]
    async fn returns_promptly_when_idle() {
        let (listener, _) = bound().await;
        let app = Router::new().route("/", get(|| async { "ok" }));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve(listener, app, async {}, Duration::from_secs(5)),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn abandons_requests_that_outlive_the_grace_period() {
        let (listener, addr) = bound().await;
        let app = Router::new().route("/", get(slow));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(
            listener,
            app,
            async {
                let _ = shutdown_rx.await;
            },
            Duration::from_millis(200),
        ));

        // Hold a request open on the slow route.
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(
            &mut stream,
            b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        shutdown_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server outlived its grace period");
        assert!(matches!(result, Ok(Ok(()))));
    }
}
