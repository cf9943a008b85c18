//! Client, signer and subscription against an in-process fake node.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use attestor_core::{HeaderSubscriber, Signer, SignerError, Subscription};
use starknet_attestor_rpc as attestor_rpc;
use attestor_rpc::{Client, PollingSubscriber, RpcSigner, SigningKey};
use attestor_types::felt::to_hex;
use attestor_types::{
    Address, BlockHash, BlockHeader, BlockId, BlockNumber, ChainId, Felt, InvokeTransaction, TxHash, ValidationContracts,
};

#[derive(Default)]
struct Node {
    latest: u64,
    sign_requests: Vec<Value>,
}

type Shared = Arc<Mutex<Node>>;

fn block_hash(number: u64) -> String {
    format!("{:#x}", 0x1000 + number)
}

fn rpc_result(id: &Value, result: Value) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn rpc_error(id: &Value, code: i64, message: &str, data: Option<&str>) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message, "data": data },
    }))
}

async fn rpc(State(node): State<Shared>, Json(request): Json<Value>) -> Json<Value> {
    let id = &request["id"];
    let params = &request["params"];
    let latest = node.lock().unwrap().latest;

    match request["method"].as_str().unwrap_or_default() {
        "starknet_chainId" => rpc_result(id, json!("0x534e5f5345504f4c4941")),
        "starknet_blockHashAndNumber" => rpc_result(
            id,
            json!({ "block_hash": block_hash(latest), "block_number": latest }),
        ),
        "starknet_getBlockWithTxHashes" => {
            let number = params["block_id"]["block_number"].as_u64().unwrap();
            if number > latest {
                return rpc_error(id, 24, "Block not found", None);
            }
            rpc_result(
                id,
                json!({
                    "block_hash": block_hash(number),
                    "block_number": number,
                    "parent_hash": block_hash(number.saturating_sub(1)),
                    "transactions": [],
                }),
            )
        }
        "starknet_call" => rpc_result(id, json!(["0x10", "0x0"])),
        "starknet_getNonce" => rpc_result(id, json!("0x7")),
        "starknet_getTransactionStatus" => rpc_error(id, 29, "Transaction hash not found", None),
        "starknet_addInvokeTransaction" => rpc_error(
            id,
            41,
            "Transaction execution error",
            Some("Execution failed: 'Attestation is done for this epoch'"),
        ),
        other => rpc_error(id, -32601, &format!("method {other} not found"), None),
    }
}

async fn sign(State(node): State<Shared>, Json(request): Json<Value>) -> Json<Value> {
    node.lock().unwrap().sign_requests.push(request);
    Json(json!({ "signature": ["0x11", "0x22"] }))
}

async fn spawn_node(latest: u64) -> (SocketAddr, Shared) {
    let node = Arc::new(Mutex::new(Node {
        latest,
        ..Node::default()
    }));

    let app = Router::new()
        .route("/", post(rpc))
        .route("/sign", post(sign))
        .with_state(Arc::clone(&node));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (addr, node)
}

fn signer(addr: SocketAddr, key: SigningKey) -> RpcSigner {
    let client = Arc::new(Client::new(&format!("http://{addr}")).unwrap());
    RpcSigner::new(
        client,
        Address::from_hex("0xabc").unwrap(),
        ChainId::from_name("SN_SEPOLIA").unwrap(),
        ValidationContracts {
            staking: Address::from_hex("0x5a").unwrap(),
            attest: Address::from_hex("0xa7").unwrap(),
        },
        key,
    )
}

#[tokio::test]
pub async fn reads_chain_id_and_latest_block() {
    let (addr, _node) = spawn_node(639_291).await;
    let client = Client::new(&format!("http://{addr}")).unwrap();

    assert_eq!(client.chain_id().await.unwrap().name(), "SN_SEPOLIA");

    let latest = client.block_hash_and_number().await.unwrap();
    assert_eq!(latest.number, BlockNumber::new(639_291));
    assert_eq!(latest.hash, BlockHash::from_hex(&block_hash(639_291)).unwrap());
}

#[tokio::test]
pub async fn node_errors_map_to_signer_errors() {
    let (addr, _node) = spawn_node(10).await;
    let signer = signer(addr, SigningKey::internal(Felt::from(0x1234_u64)));

    assert_eq!(
        signer.transaction_status(&TxHash::new(Felt::ONE)).await,
        Err(SignerError::TransactionNotFound)
    );

    let txn = signer
        .build_attest_transaction(&BlockHash::new(Felt::TWO))
        .await
        .unwrap();
    assert_eq!(txn.nonce, Felt::from(7_u64));
    assert_eq!(
        signer.invoke_transaction(&txn).await,
        Err(SignerError::AttestationAlreadyDone)
    );

    assert_eq!(
        signer
            .block_with_tx_hashes(BlockId::Number(BlockNumber::new(11)))
            .await,
        Err(SignerError::BlockNotFound)
    );
}

#[tokio::test]
pub async fn external_signer_signs_transactions() {
    let (addr, node) = spawn_node(10).await;
    let key = SigningKey::external(&format!("http://{addr}")).unwrap();
    let signer = signer(addr, key);

    let mut txn = InvokeTransaction::new(*signer.address(), vec![Felt::ONE], Felt::ZERO);
    signer.sign_transaction(&mut txn).await.unwrap();

    assert_eq!(txn.signature, vec![Felt::from(0x11_u64), Felt::from(0x22_u64)]);

    let requests = &node.lock().unwrap().sign_requests;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["chain_id"], to_hex(signer.chain_id().as_felt()));
    assert_eq!(requests[0]["transaction"]["sender_address"], "0xabc");
    assert_eq!(requests[0]["transaction"]["version"], "0x3");
}

async fn next_header(subscription: &mut Subscription) -> BlockHeader {
    tokio::time::timeout(Duration::from_secs(5), subscription.headers.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
pub async fn polling_emits_every_block_in_order() {
    let (addr, node) = spawn_node(100).await;
    let client = Arc::new(Client::new(&format!("http://{addr}")).unwrap());
    let subscriber = PollingSubscriber::new(client, Duration::from_millis(100));

    let mut subscription = subscriber.subscribe().await.unwrap();

    assert_eq!(next_header(&mut subscription).await.number, BlockNumber::new(100));

    node.lock().unwrap().latest = 103;

    for expected in 101..=103 {
        let header = next_header(&mut subscription).await;
        assert_eq!(header.number, BlockNumber::new(expected));
        assert_eq!(header.hash, BlockHash::from_hex(&block_hash(expected)).unwrap());
    }
}
