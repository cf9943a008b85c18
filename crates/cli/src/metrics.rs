use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Binds the metrics server, so that a busy address fails the startup.
pub async fn bind_metrics(listen_addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(listen_addr).await
}

fn router() -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health", get(get_health))
}

async fn get_metrics() -> Result<String, StatusCode> {
    let mut buf = String::new();
    attestor_metrics::export(&mut buf).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(buf)
}

async fn get_health() -> &'static str {
    "OK"
}

#[tracing::instrument(name = "metrics", skip_all)]
pub async fn serve_metrics(listener: TcpListener) {
    match listener.local_addr() {
        Ok(address) => info!(%address, "Serving metrics"),
        Err(e) => error!("Metrics listener has no local address: {e}"),
    }

    if let Err(e) = axum::serve(listener, router()).await {
        error!("Metrics server stopped: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use attestor_metrics::{Metrics, SharedRegistry};

    #[tokio::test]
    pub async fn serves_metrics_and_health() {
        let metrics = Metrics::register(SharedRegistry::global(), "SN_TEST");
        metrics.current_epoch_id.set(1516);

        let listener = bind_metrics("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(serve_metrics(listener));

        let health = reqwest::get(format!("http://{address}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(health, "OK");

        let body = reqwest::get(format!("http://{address}/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("validator_attestation_current_epoch_id{network=\"SN_TEST\"} 1516"));
    }
}
