use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::felt::Felt;
use crate::primitives::Address;

/// Data availability mode of the nonce and the fee.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataAvailabilityMode {
    #[default]
    L1,
    L2,
}

impl DataAvailabilityMode {
    pub fn as_u64(&self) -> u64 {
        match self {
            DataAvailabilityMode::L1 => 0,
            DataAvailabilityMode::L2 => 1,
        }
    }
}

impl fmt::Display for DataAvailabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAvailabilityMode::L1 => write!(f, "L1"),
            DataAvailabilityMode::L2 => write!(f, "L2"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBounds {
    pub max_amount: u64,
    pub max_price_per_unit: u128,
}

impl ResourceBounds {
    fn scaled(amount: u64, price: u128, multiplier: f64) -> Self {
        Self {
            max_amount: (amount as f64 * multiplier) as u64,
            max_price_per_unit: (price as f64 * multiplier) as u128,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBoundsMapping {
    pub l1_gas: ResourceBounds,
    pub l1_data_gas: ResourceBounds,
    pub l2_gas: ResourceBounds,
}

/// A version 3 invoke transaction sent from the operational account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvokeTransaction {
    pub sender_address: Address,
    pub calldata: Vec<Felt>,
    pub version: Felt,
    pub signature: Vec<Felt>,
    pub nonce: Felt,
    pub resource_bounds: ResourceBoundsMapping,
    pub tip: u64,
    pub paymaster_data: Vec<Felt>,
    pub account_deployment_data: Vec<Felt>,
    pub nonce_data_availability_mode: DataAvailabilityMode,
    pub fee_data_availability_mode: DataAvailabilityMode,
}

impl InvokeTransaction {
    /// Regular transaction version.
    pub const VERSION: Felt = Felt::THREE;

    /// An unsigned version 3 transaction with zero bounds.
    pub fn new(sender_address: Address, calldata: Vec<Felt>, nonce: Felt) -> Self {
        Self {
            sender_address,
            calldata,
            version: Self::VERSION,
            signature: Vec::new(),
            nonce,
            resource_bounds: ResourceBoundsMapping::default(),
            tip: 0,
            paymaster_data: Vec::new(),
            account_deployment_data: Vec::new(),
            nonce_data_availability_mode: DataAvailabilityMode::L1,
            fee_data_availability_mode: DataAvailabilityMode::L1,
        }
    }

    /// Version used for fee estimation on accounts that require the query bit.
    pub fn query_version() -> Felt {
        // 2^128 + 3
        Felt::from(u128::MAX) + Felt::ONE + Felt::THREE
    }
}

/// Fee estimate as returned by `starknet_estimateFee`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeEstimate {
    pub l1_gas_consumed: u64,
    pub l1_gas_price: u128,
    pub l2_gas_consumed: u64,
    pub l2_gas_price: u128,
    pub l1_data_gas_consumed: u64,
    pub l1_data_gas_price: u128,
    pub overall_fee: u128,
}

impl FeeEstimate {
    /// Turns the estimate into resource bounds, scaling amounts and prices by `multiplier`.
    pub fn to_resource_bounds(&self, multiplier: f64) -> ResourceBoundsMapping {
        ResourceBoundsMapping {
            l1_gas: ResourceBounds::scaled(self.l1_gas_consumed, self.l1_gas_price, multiplier),
            l1_data_gas: ResourceBounds::scaled(
                self.l1_data_gas_consumed,
                self.l1_data_gas_price,
                multiplier,
            ),
            l2_gas: ResourceBounds::scaled(self.l2_gas_consumed, self.l2_gas_price, multiplier),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FinalityStatus {
    Received,
    Candidate,
    PreConfirmed,
    AcceptedOnL2,
    AcceptedOnL1,
    Rejected,
}

impl FinalityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalityStatus::Received => "RECEIVED",
            FinalityStatus::Candidate => "CANDIDATE",
            FinalityStatus::PreConfirmed => "PRE_CONFIRMED",
            FinalityStatus::AcceptedOnL2 => "ACCEPTED_ON_L2",
            FinalityStatus::AcceptedOnL1 => "ACCEPTED_ON_L1",
            FinalityStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for FinalityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(FinalityStatus::Received),
            "CANDIDATE" => Ok(FinalityStatus::Candidate),
            "PRE_CONFIRMED" => Ok(FinalityStatus::PreConfirmed),
            "ACCEPTED_ON_L2" => Ok(FinalityStatus::AcceptedOnL2),
            "ACCEPTED_ON_L1" => Ok(FinalityStatus::AcceptedOnL1),
            "REJECTED" => Ok(FinalityStatus::Rejected),
            other => Err(format!("unknown finality status: {other}")),
        }
    }
}

impl fmt::Display for FinalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    Succeeded,
    Reverted,
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCEEDED" => Ok(ExecutionStatus::Succeeded),
            "REVERTED" => Ok(ExecutionStatus::Reverted),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Succeeded => write!(f, "SUCCEEDED"),
            ExecutionStatus::Reverted => write!(f, "REVERTED"),
        }
    }
}

/// Status of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxnStatus {
    pub finality_status: FinalityStatus,
    pub execution_status: Option<ExecutionStatus>,
    pub failure_reason: Option<String>,
}

impl TxnStatus {
    pub fn new(finality_status: FinalityStatus, execution_status: Option<ExecutionStatus>) -> Self {
        Self {
            finality_status,
            execution_status,
            failure_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_estimate_scales_bounds() {
        let estimate = FeeEstimate {
            l1_gas_consumed: 100,
            l1_gas_price: 10,
            l2_gas_consumed: 2_000,
            l2_gas_price: 4,
            l1_data_gas_consumed: 64,
            l1_data_gas_price: 2,
            overall_fee: 0,
        };

        let bounds = estimate.to_resource_bounds(1.5);
        assert_eq!(bounds.l1_gas.max_amount, 150);
        assert_eq!(bounds.l1_gas.max_price_per_unit, 15);
        assert_eq!(bounds.l2_gas.max_amount, 3_000);
        assert_eq!(bounds.l2_gas.max_price_per_unit, 6);
        assert_eq!(bounds.l1_data_gas.max_amount, 96);
        assert_eq!(bounds.l1_data_gas.max_price_per_unit, 3);
    }

    #[test]
    fn query_version_sets_bit_128() {
        let bytes = InvokeTransaction::query_version().to_bytes_be();
        assert_eq!(bytes[15], 1);
        assert_eq!(bytes[31], 3);
        assert!(bytes[16..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn finality_status_parsing() {
        for status in [
            FinalityStatus::Received,
            FinalityStatus::Candidate,
            FinalityStatus::PreConfirmed,
            FinalityStatus::AcceptedOnL2,
            FinalityStatus::AcceptedOnL1,
            FinalityStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<FinalityStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<FinalityStatus>().is_err());
    }
}
