//! Identifiers, epoch bookkeeping and chain wire types shared by the
//! attestor crates.

mod balance;
mod block;
mod contracts;
mod epoch;
mod primitives;
mod retries;
mod transaction;

pub mod constants;
pub mod felt;

pub use balance::Balance;
pub use block::{BlockHeader, BlockId, BlockLookup, FunctionCall};
pub use contracts::ValidationContracts;
pub use epoch::{AttestInfo, EpochInfo};
pub use felt::{Felt, FeltError};
pub use primitives::{Address, BlockHash, BlockNumber, ChainId, TxHash};
pub use retries::{ParseRetriesError, Retries};
pub use transaction::{
    DataAvailabilityMode, ExecutionStatus, FeeEstimate, FinalityStatus, InvokeTransaction,
    ResourceBounds, ResourceBoundsMapping, TxnStatus,
};
