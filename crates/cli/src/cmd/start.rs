use std::sync::Arc;

use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::{error, info, Instrument};

use attestor_config::{Config, SignerMode};
use attestor_core::{run_attestor, RetryPolicy};
use attestor_metrics::{Metrics, SharedRegistry};
use attestor_rpc::{Client, PollingSubscriber, RpcSigner, SigningKey};
use attestor_types::felt::from_hex;

use crate::metrics::{bind_metrics, serve_metrics};

pub async fn run(config: Config) -> Result<()> {
    let address = config
        .signer
        .operational_address
        .ok_or_else(|| eyre!("missing operational address"))?;

    let span = tracing::error_span!("attestor", %address);

    let client = Arc::new(Client::new(&config.provider.http)?);
    let chain_id = client
        .chain_id()
        .await
        .wrap_err_with(|| format!("Failed to fetch the chain id from {}", client.url()))?;
    let chain = chain_id.name();

    let contracts = config.contracts.resolve(&chain_id)?;

    let key = match config.signer.mode() {
        Some(SignerMode::External(url)) => SigningKey::external(&url)?,
        Some(SignerMode::Internal(private_key)) => {
            SigningKey::internal(from_hex(&private_key).wrap_err("Invalid private key")?)
        }
        None => return Err(eyre!("no private key or external signer configured")),
    };

    let signer = RpcSigner::new(Arc::clone(&client), address, chain_id, contracts, key)
        .with_fee_multiplier(config.signer.fee_multiplier)
        .with_braavos(config.signer.braavos);

    let metrics = Metrics::register(SharedRegistry::global(), &chain);

    if config.metrics.enabled {
        let listener = bind_metrics(config.metrics.listen_addr)
            .await
            .wrap_err_with(|| format!("Failed to bind metrics server to {}", config.metrics.listen_addr))?;

        tokio::spawn(serve_metrics(listener).instrument(span.clone()));
    }

    info!(
        %chain,
        staking = %contracts.staking,
        attest = %contracts.attest,
        retries = %config.retries.max,
        "Validator attestation is starting..."
    );

    let subscriber = PollingSubscriber::new(client, config.provider.poll_interval);
    let epoch_policy = RetryPolicy::new(config.retries.max, config.retries.epoch_fetch_interval);
    let reconnect_policy = RetryPolicy::new(config.retries.max, config.retries.reconnect_interval);

    let attestor = run_attestor(
        Arc::new(signer),
        subscriber,
        epoch_policy,
        reconnect_policy,
        metrics,
    )
    .instrument(span.clone());

    tokio::select! {
        result = attestor => {
            if let Err(e) = &result {
                error!("Validator attestation stopped: {e}");
            }
            result.wrap_err("Fatal error")
        }
        signal = shutdown_signal() => {
            signal?;
            info!("Shutting down...");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
