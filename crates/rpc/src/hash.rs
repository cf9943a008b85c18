//! Hash of version 3 invoke transactions, as signed by the account.

use starknet_crypto::poseidon_hash_many;

use attestor_types::{ChainId, Felt, InvokeTransaction, ResourceBounds};

/// `"invoke"` as a short string.
const INVOKE_PREFIX: Felt = Felt::from_hex_unchecked("0x696e766f6b65");

const L1_GAS: &[u8] = b"L1_GAS";
const L2_GAS: &[u8] = b"L2_GAS";
const L1_DATA_GAS: &[u8] = b"L1_DATA";

/// Packs a resource name (7 bytes), its max amount (8 bytes) and max price
/// per unit (16 bytes) into one field element.
fn encode_bound(name: &[u8], bounds: &ResourceBounds) -> Felt {
    let mut bytes = [0u8; 32];
    bytes[8 - name.len()..8].copy_from_slice(name);
    bytes[8..16].copy_from_slice(&bounds.max_amount.to_be_bytes());
    bytes[16..].copy_from_slice(&bounds.max_price_per_unit.to_be_bytes());
    Felt::from_bytes_be(&bytes)
}

pub fn invoke_v3_hash(txn: &InvokeTransaction, chain_id: &ChainId) -> Felt {
    let bounds = &txn.resource_bounds;
    let fee_fields = poseidon_hash_many(&[
        Felt::from(txn.tip),
        encode_bound(L1_GAS, &bounds.l1_gas),
        encode_bound(L2_GAS, &bounds.l2_gas),
        encode_bound(L1_DATA_GAS, &bounds.l1_data_gas),
    ]);

    let data_availability_modes = Felt::from(
        (txn.nonce_data_availability_mode.as_u64() << 32) + txn.fee_data_availability_mode.as_u64(),
    );

    poseidon_hash_many(&[
        INVOKE_PREFIX,
        txn.version,
        *txn.sender_address.as_felt(),
        fee_fields,
        poseidon_hash_many(&txn.paymaster_data),
        *chain_id.as_felt(),
        txn.nonce,
        data_availability_modes,
        poseidon_hash_many(&txn.account_deployment_data),
        poseidon_hash_many(&txn.calldata),
    ])
}
