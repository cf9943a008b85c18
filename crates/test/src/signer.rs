use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use attestor_core::{selector, Signer, SignerError};
use attestor_types::felt::to_hex;
use attestor_types::{
    Address, BlockHash, BlockHeader, BlockId, BlockLookup, BlockNumber, EpochInfo, ExecutionStatus,
    FeeEstimate, Felt, FinalityStatus, FunctionCall, InvokeTransaction, TxHash, TxnStatus,
    ValidationContracts,
};

use crate::ATTEST_WINDOW;

/// How many times each [`Signer`] operation was called.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Calls {
    pub epoch_fetches: usize,
    pub builds: usize,
    pub signs: usize,
    pub nonces: usize,
    pub estimates: usize,
    pub invokes: usize,
    pub status_polls: usize,
    pub balance_checks: usize,
}

#[derive(Default)]
struct State {
    epochs: VecDeque<(Result<EpochInfo, SignerError>, usize)>,
    fallback_epoch: Option<EpochInfo>,
    attest_window: Option<u64>,
    blocks: HashMap<BlockNumber, BlockHash>,
    nonce: Felt,
    estimates: VecDeque<Result<FeeEstimate, SignerError>>,
    invokes: VecDeque<Result<TxHash, SignerError>>,
    statuses: VecDeque<Result<TxnStatus, SignerError>>,
    balance: Option<Vec<Felt>>,
    invoked: Vec<BlockHash>,
    calls: Calls,
}

/// A [`Signer`] answering from scripted responses.
///
/// Unless scripted otherwise, fee estimation and submission succeed, and every
/// submitted transaction is reported as accepted on L2.
pub struct MockSigner {
    address: Address,
    contracts: ValidationContracts,
    state: Mutex<State>,
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            address: Address::new(Felt::from(0xabc_u64)),
            contracts: ValidationContracts {
                staking: Address::new(Felt::from(0x5a_u64)),
                attest: Address::new(Felt::from(0xa7_u64)),
            },
            state: Mutex::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next `times` epoch fetches return `epoch`.
    pub fn expect_epoch(&self, epoch: EpochInfo, times: usize) -> &Self {
        self.state().epochs.push_back((Ok(epoch), times));
        self
    }

    /// The next `times` epoch fetches fail with `error`.
    pub fn expect_epoch_error(&self, error: SignerError, times: usize) -> &Self {
        self.state().epochs.push_back((Err(error), times));
        self
    }

    /// Epoch returned once the scripted epochs are used up. Without it such
    /// fetches fail.
    pub fn set_epoch(&self, epoch: EpochInfo) -> &Self {
        self.state().fallback_epoch = Some(epoch);
        self
    }

    pub fn set_attest_window(&self, window: u64) -> &Self {
        self.state().attest_window = Some(window);
        self
    }

    /// Makes block `number` exist with `hash`. Other blocks are not found.
    pub fn add_block(&self, number: u64, hash: BlockHash) -> &Self {
        self.state().blocks.insert(BlockNumber::new(number), hash);
        self
    }

    pub fn set_nonce(&self, nonce: Felt) -> &Self {
        self.state().nonce = nonce;
        self
    }

    pub fn push_estimate(&self, result: Result<FeeEstimate, SignerError>) -> &Self {
        self.state().estimates.push_back(result);
        self
    }

    pub fn push_invoke(&self, result: Result<TxHash, SignerError>) -> &Self {
        self.state().invokes.push_back(result);
        self
    }

    pub fn push_status(&self, result: Result<TxnStatus, SignerError>) -> &Self {
        self.state().statuses.push_back(result);
        self
    }

    /// Raw `balanceOf` response.
    pub fn set_balance(&self, response: Vec<Felt>) -> &Self {
        self.state().balance = Some(response);
        self
    }

    pub fn calls(&self) -> Calls {
        self.state().calls
    }

    /// Block hashes carried by every submitted transaction, in order.
    pub fn invoked_block_hashes(&self) -> Vec<BlockHash> {
        self.state().invoked.clone()
    }

    fn next_epoch(&self) -> Result<EpochInfo, SignerError> {
        let mut state = self.state();
        state.calls.epoch_fetches += 1;

        if let Some((result, times)) = state.epochs.front_mut() {
            let result = result.clone();
            *times = times.saturating_sub(1);
            if *times == 0 {
                state.epochs.pop_front();
            }
            return result;
        }

        state
            .fallback_epoch
            .ok_or_else(|| SignerError::Transport("no epoch scripted".to_string()))
    }
}

fn encode_epoch(epoch: &EpochInfo) -> Vec<Felt> {
    vec![
        *epoch.staker_address.as_felt(),
        Felt::from(epoch.stake),
        Felt::from(epoch.epoch_len),
        Felt::from(epoch.epoch_id),
        Felt::from(epoch.starting_block.as_u64()),
    ]
}

#[async_trait]
impl Signer for MockSigner {
    fn address(&self) -> &Address {
        &self.address
    }

    fn validation_contracts(&self) -> &ValidationContracts {
        &self.contracts
    }

    async fn call(&self, call: FunctionCall, _block_id: BlockId) -> Result<Vec<Felt>, SignerError> {
        let entrypoint = call.entry_point_selector;

        if entrypoint == selector("get_attestation_info_by_operational_address") {
            self.next_epoch().map(|epoch| encode_epoch(&epoch))
        } else if entrypoint == selector("attestation_window") {
            let window = self.state().attest_window.unwrap_or(ATTEST_WINDOW);
            Ok(vec![Felt::from(window)])
        } else if entrypoint == selector("balanceOf") {
            let mut state = self.state();
            state.calls.balance_checks += 1;
            Ok(state
                .balance
                .clone()
                .unwrap_or_else(|| vec![Felt::ZERO, Felt::ZERO]))
        } else {
            Err(SignerError::InvalidResponse(format!(
                "unexpected entrypoint {}",
                to_hex(&entrypoint)
            )))
        }
    }

    async fn block_with_tx_hashes(&self, block_id: BlockId) -> Result<BlockLookup, SignerError> {
        let BlockId::Number(number) = block_id else {
            return Err(SignerError::BlockNotFound);
        };

        self.state()
            .blocks
            .get(&number)
            .map(|hash| BlockLookup::Block(BlockHeader::new(number, *hash)))
            .ok_or(SignerError::BlockNotFound)
    }

    async fn nonce(&self) -> Result<Felt, SignerError> {
        let mut state = self.state();
        state.calls.nonces += 1;
        Ok(state.nonce)
    }

    async fn build_attest_transaction(
        &self,
        block_hash: &BlockHash,
    ) -> Result<InvokeTransaction, SignerError> {
        let mut state = self.state();
        state.calls.builds += 1;

        let calldata = vec![
            Felt::ONE,
            *self.contracts.attest.as_felt(),
            selector("attest"),
            Felt::ONE,
            *block_hash.as_felt(),
        ];

        Ok(InvokeTransaction::new(self.address, calldata, state.nonce))
    }

    async fn sign_transaction(&self, txn: &mut InvokeTransaction) -> Result<(), SignerError> {
        self.state().calls.signs += 1;
        txn.signature = vec![txn.nonce, Felt::ONE];
        Ok(())
    }

    async fn estimate_fee(&self, _txn: &InvokeTransaction) -> Result<FeeEstimate, SignerError> {
        let mut state = self.state();
        state.calls.estimates += 1;
        state
            .estimates
            .pop_front()
            .unwrap_or(Ok(FeeEstimate::default()))
    }

    async fn invoke_transaction(&self, txn: &InvokeTransaction) -> Result<TxHash, SignerError> {
        let mut state = self.state();
        state.calls.invokes += 1;

        let default_hash = TxHash::new(Felt::from(0x1000 + state.calls.invokes as u64));
        let result = state.invokes.pop_front().unwrap_or(Ok(default_hash));

        if result.is_ok() {
            if let Some(hash) = txn.calldata.last() {
                state.invoked.push(BlockHash::new(*hash));
            }
        }

        result
    }

    async fn transaction_status(&self, _hash: &TxHash) -> Result<TxnStatus, SignerError> {
        let mut state = self.state();
        state.calls.status_polls += 1;
        state.statuses.pop_front().unwrap_or_else(|| {
            Ok(TxnStatus::new(
                FinalityStatus::AcceptedOnL2,
                Some(ExecutionStatus::Succeeded),
            ))
        })
    }
}
