use std::sync::Arc;

use tracing::{debug, info, warn};

use attestor_metrics::Metrics;
use attestor_types::constants::STRK_CONTRACT_ADDRESS;
use attestor_types::{Address, Balance, BlockId, Felt, FunctionCall};

use crate::error::Error;
use crate::signer::{selector, Signer};

const BALANCE_ENTRYPOINT: &str = "balanceOf";

/// STRK balance of the operational account.
pub async fn fetch_validator_balance<S: Signer>(signer: &S) -> Result<Balance, Error> {
    let call = FunctionCall {
        contract_address: Address::from_hex(STRK_CONTRACT_ADDRESS)?,
        entry_point_selector: selector(BALANCE_ENTRYPOINT),
        calldata: vec![*signer.address().as_felt()],
    };

    let result = signer
        .call(call, BlockId::Latest)
        .await
        .map_err(|source| Error::EntrypointCall {
            entrypoint: BALANCE_ENTRYPOINT,
            source,
        })?;

    match result.as_slice() {
        [low] => Ok(Balance::from_u256(low, &Felt::ZERO)),
        [low, high] => Ok(Balance::from_u256(low, high)),
        _ => Err(Error::entrypoint_response(BALANCE_ENTRYPOINT, &result)),
    }
}

/// Logs the operational account balance and exports it. Failures are only logged.
pub async fn check_balance<S: Signer>(signer: Arc<S>, metrics: Metrics) {
    let address = *signer.address();
    debug!(%address, "Calling balance of operational account");

    match fetch_validator_balance(signer.as_ref()).await {
        Ok(balance) => {
            info!(%address, strk = balance.strk(), fri = %balance.fri(), "Account balance");
            metrics.update_signer_balance(balance.strk());
        }
        Err(err) => warn!(%address, %err, "Unable to get balance of account"),
    }
}
