//! Serving with a bounded graceful shutdown.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// How the server stopped after the shutdown signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Every in-flight request finished within the grace period.
    Drained,
    /// The grace period ran out; remaining connections were dropped.
    GraceExpired,
}

/// Serve `app` until `signal` resolves, then give in-flight requests up to
/// `grace` to finish.
pub async fn serve_with_grace(
    listener: TcpListener,
    app: Router,
    signal: impl Future<Output = ()> + Send + 'static,
    grace: Duration,
) -> std::io::Result<Shutdown> {
    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);

    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                notify.notify_one();
            })
            .into_future(),
    );

    tokio::select! {
        result = &mut server => {
            joined(result)?;
            return Ok(Shutdown::Drained);
        }
        () = signalled.notified() => {}
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            joined(result)?;
            Ok(Shutdown::Drained)
        }
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs_f64(),
                "Shutdown grace period expired, dropping open connections"
            );
            server.abort();
            Ok(Shutdown::GraceExpired)
        }
    }
}

fn joined(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> std::io::Result<()> {
    result.map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;

    async fn local_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn idle_server_drains_after_signal() {
        let listener = local_listener().await;
        let app = Router::new().route("/", get(|| async { "ok" }));

        let outcome = serve_with_grace(listener, app, async {}, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome, Shutdown::Drained);
    }

    #[tokio::test]
    async fn stuck_request_is_cut_off_after_grace() {
        let listener = local_listener().await;
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/stuck",
            get(|| async {
                std::future::pending::<()>().await;
                "never"
            }),
        );
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_with_grace(
            listener,
            app,
            async {
                let _ = stop_rx.await;
            },
            Duration::from_millis(100),
        ));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /stuck HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop_tx.send(()).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server must stop once the grace period ends")
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Shutdown::GraceExpired);
    }
}
