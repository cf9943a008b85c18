use serde::{Deserialize, Serialize};

use crate::constants;
use crate::primitives::{Address, ChainId};

/// The staking and attestation contracts the validator interacts with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContracts {
    pub staking: Address,
    pub attest: Address,
}

impl ValidationContracts {
    /// Known deployments, looked up by chain id name.
    pub fn for_chain(chain_id: &ChainId) -> Option<Self> {
        let (staking, attest) = match chain_id.name().as_str() {
            constants::SN_MAIN => (
                constants::mainnet::STAKING_CONTRACT,
                constants::mainnet::ATTEST_CONTRACT,
            ),
            constants::SN_SEPOLIA => (
                constants::sepolia::STAKING_CONTRACT,
                constants::sepolia::ATTEST_CONTRACT,
            ),
            _ => return None,
        };

        Some(Self {
            staking: Address::from_hex(staking).ok()?,
            attest: Address::from_hex(attest).ok()?,
        })
    }
}
