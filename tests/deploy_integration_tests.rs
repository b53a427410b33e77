//! Integration tests for the per-chain deployer and the peer wirer
//!
//! All chain traffic goes through scripted fakes, so these tests exercise
//! the real orchestration logic: ledger-driven idempotency, endpoint
//! validation, service registration, and bidirectional peer wiring.

use std::sync::Arc;

use alloy_primitives::{address, Address};
use tempfile::TempDir;

use tix_ops::chain::{ChainKey, Eid, LOCALHOST_CHAIN_ID, LOCALHOST_MOCK_ENDPOINT};
use tix_ops::contracts::read_adapter;
use tix_ops::deploy::{ArtifactStore, ChainDeployer, PeerDirection, PeerOutcome, PeerWirer};
use tix_ops::ledger::{AdapterRow, LedgerSet, TixRow};
use tix_ops::registry::{self, Registry, ResolvedChain};
use tix_ops::testing::{FakeChainClient, FakeConnector, FakeTransaction};
use tix_ops::traits::ChainClient;

const ENDPOINT: &str = "0x6EDCE65403992e310A62460808c4b910D972f10f";
const READ_LIB: &str = "0x908E086E0e7D7d4F6e8633D90C587AC2F74f73cD";

/// Registry snapshot with version 2 entries for the chains these tests use.
fn test_registry() -> Registry {
    let json = format!(
        r#"{{
          "arbsep": {{ "chainKey": "arbitrum-sepolia", "deployments": [
            {{ "eid": "40231", "version": 2, "stage": "testnet",
               "endpointV2": {{ "address": "{ENDPOINT}" }},
               "readLib1002": {{ "address": "{READ_LIB}" }} }}
          ] }},
          "basesep": {{ "chainKey": "base-sepolia", "deployments": [
            {{ "eid": "40245", "version": 2, "stage": "testnet",
               "endpointV2": {{ "address": "{ENDPOINT}" }},
               "readLib1002": {{ "address": "{READ_LIB}" }} }}
          ] }}
        }}"#
    );
    Registry::from_json(&json).unwrap()
}

fn resolved(chain: &str) -> ResolvedChain {
    registry::resolve(&test_registry(), &ChainKey::new(chain)).unwrap()
}

/// Writes minimal artifact files for every contract the deployer loads.
fn write_artifacts(dir: &TempDir) -> ArtifactStore {
    for name in [
        "TixToken",
        "ServiceDeployer",
        "UpgradeableServiceDeployer",
        "TixReadAdapter",
    ] {
        std::fs::write(
            dir.path().join(format!("{name}.json")),
            r#"{"bytecode": "0x60806040"}"#,
        )
        .unwrap();
    }
    ArtifactStore::new(dir.path())
}

fn signer() -> Address {
    address!("00000000000000000000000000000000000000aa")
}

/// A client with a signer and live endpoint code, ready for a fresh deploy.
fn ready_client(chain: &str) -> Arc<FakeChainClient> {
    let client = Arc::new(FakeChainClient::new(ChainKey::new(chain)));
    client.set_signer(signer());
    client.add_code(ENDPOINT.parse().unwrap());
    client
}

fn deployer(
    ledgers: &LedgerSet,
    artifacts: &ArtifactStore,
    connector: &FakeConnector,
) -> ChainDeployer {
    ChainDeployer::builder()
        .ledgers(ledgers.clone())
        .artifacts(artifacts.clone())
        .connector(Arc::new(connector.clone()))
        .build()
}

#[tokio::test]
async fn test_fresh_deploy_lands_token_deployers_and_adapter() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let client = ready_client("arbitrum-sepolia");
    let token = address!("0000000000000000000000000000000000000001");
    let service = address!("0000000000000000000000000000000000000002");
    let upgradeable = address!("0000000000000000000000000000000000000003");
    let adapter = address!("0000000000000000000000000000000000000004");
    for contract in [token, service, upgradeable, adapter] {
        client.queue_deployment(contract);
    }
    let connector = FakeConnector::new();
    connector.add_client(client.clone());

    let deployment = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(client.as_ref(), &resolved("arbitrum-sepolia"))
        .await
        .unwrap()
        .expect("endpoint should be usable");

    assert_eq!(deployment.token, token);
    assert_eq!(deployment.service_deployer, Some(service));
    assert_eq!(deployment.upgradeable_deployer, Some(upgradeable));
    assert_eq!(deployment.adapter, adapter);
    assert!(!deployment.reused_token);
    assert!(!deployment.reused_adapter);

    let chain = ChainKey::new("arbitrum-sepolia");
    let token_row = ledgers.tix.latest(&chain).unwrap().unwrap();
    assert_eq!(token_row.token, token);
    assert_eq!(token_row.service_deployer, Some(service));
    assert_eq!(token_row.upgradeable_deployer, Some(upgradeable));
    let adapter_row = ledgers.adapters.latest(&chain).unwrap().unwrap();
    assert_eq!(adapter_row.adapter, adapter);
    assert_eq!(adapter_row.eid, Eid::new(40231));

    let transactions = client.transactions();
    let grants = transactions
        .iter()
        .filter(|tx| matches!(tx, FakeTransaction::GrantRole { .. }))
        .count();
    assert_eq!(grants, 2, "Both service deployers should get the worker role");

    let registered: Vec<&str> = transactions
        .iter()
        .filter_map(|tx| match tx {
            FakeTransaction::RegisterService { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        registered,
        vec!["ServiceDeployer", "UpgradeableServiceDeployer", "OmniAdapter"],
        "Every landed contract should be registered in the token's directory"
    );
}

#[tokio::test]
async fn test_rerun_with_live_contracts_sends_nothing() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let chain = ChainKey::new("arbitrum-sepolia");
    let token = address!("0000000000000000000000000000000000000011");
    let service = address!("0000000000000000000000000000000000000012");
    let upgradeable = address!("0000000000000000000000000000000000000013");
    let adapter = address!("0000000000000000000000000000000000000014");
    ledgers
        .tix
        .append(&TixRow {
            chain: chain.clone(),
            eid: Some(Eid::new(40231)),
            token,
            service_deployer: Some(service),
            upgradeable_deployer: Some(upgradeable),
        })
        .unwrap();
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: chain.clone(),
            eid: Eid::new(40231),
            adapter,
        })
        .unwrap();

    let client = ready_client("arbitrum-sepolia");
    client.add_code(token);
    client.add_code(adapter);
    client.set_service(token, "OmniAdapter", adapter);
    let connector = FakeConnector::new();
    connector.add_client(client.clone());

    let deployment = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(client.as_ref(), &resolved("arbitrum-sepolia"))
        .await
        .unwrap()
        .unwrap();

    assert!(deployment.reused_token);
    assert!(deployment.reused_adapter);
    assert_eq!(deployment.token, token);
    assert_eq!(deployment.adapter, adapter);
    assert!(
        client.transactions().is_empty(),
        "A fully provisioned chain should see no transactions at all"
    );
    assert_eq!(
        ledgers.adapters.rows().unwrap().len(),
        1,
        "Reusing the recorded adapter should not append a duplicate row"
    );
}

#[tokio::test]
async fn test_recorded_token_without_code_is_redeployed() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let chain = ChainKey::new("arbitrum-sepolia");
    let stale_token = address!("0000000000000000000000000000000000000021");
    ledgers
        .tix
        .append(&TixRow {
            chain: chain.clone(),
            eid: Some(Eid::new(40231)),
            token: stale_token,
            service_deployer: None,
            upgradeable_deployer: None,
        })
        .unwrap();

    let client = ready_client("arbitrum-sepolia");
    let fresh_token = address!("0000000000000000000000000000000000000022");
    for contract in [
        fresh_token,
        address!("0000000000000000000000000000000000000023"),
        address!("0000000000000000000000000000000000000024"),
        address!("0000000000000000000000000000000000000025"),
    ] {
        client.queue_deployment(contract);
    }
    let connector = FakeConnector::new();
    connector.add_client(client.clone());

    let deployment = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(client.as_ref(), &resolved("arbitrum-sepolia"))
        .await
        .unwrap()
        .unwrap();

    assert!(!deployment.reused_token, "A dead address must not be reused");
    assert_eq!(deployment.token, fresh_token);

    let rows = ledgers.tix.rows().unwrap();
    assert_eq!(rows.len(), 2, "The stale row stays; a new row is appended");
    assert_eq!(
        ledgers.tix.latest(&chain).unwrap().unwrap().token,
        fresh_token,
        "The last matching row should win"
    );
}

#[tokio::test]
async fn test_endpoint_without_code_stops_before_any_transaction() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let client = Arc::new(FakeChainClient::new(ChainKey::new("arbitrum-sepolia")));
    client.set_signer(signer());
    let connector = FakeConnector::new();
    connector.add_client(client.clone());

    let outcome = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(client.as_ref(), &resolved("arbitrum-sepolia"))
        .await
        .unwrap();

    assert!(outcome.is_none(), "A dead endpoint should yield no deployment");
    assert!(
        client.transactions().is_empty(),
        "Nothing should be sent to a chain without a live endpoint"
    );
    assert!(
        ledgers.tix.rows().unwrap().is_empty(),
        "Nothing should be recorded for a chain that deployed nothing"
    );
}

#[tokio::test]
async fn test_localhost_node_substitutes_the_mock_endpoint() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let client = Arc::new(FakeChainClient::new(ChainKey::new("base-sepolia")));
    client.set_signer(signer());
    client.set_chain_id(LOCALHOST_CHAIN_ID);
    for contract in [
        address!("0000000000000000000000000000000000000031"),
        address!("0000000000000000000000000000000000000032"),
        address!("0000000000000000000000000000000000000033"),
        address!("0000000000000000000000000000000000000034"),
    ] {
        client.queue_deployment(contract);
    }
    let connector = FakeConnector::new();
    connector.add_client(client.clone());

    let deployment = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(client.as_ref(), &resolved("base-sepolia"))
        .await
        .unwrap()
        .expect("a local node should always have a usable endpoint");

    assert_eq!(
        deployment.endpoint, LOCALHOST_MOCK_ENDPOINT,
        "A local node gets the mock endpoint without a code check"
    );
}

#[tokio::test]
async fn test_second_chain_deploy_wires_back_to_the_first() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let remote_adapter = address!("0000000000000000000000000000000000000041");
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("base-sepolia"),
            eid: Eid::new(40245),
            adapter: remote_adapter,
        })
        .unwrap();

    let remote = ready_client("base-sepolia");
    remote.add_code(remote_adapter);

    let local = ready_client("arbitrum-sepolia");
    let local_adapter = address!("0000000000000000000000000000000000000045");
    for contract in [
        address!("0000000000000000000000000000000000000042"),
        address!("0000000000000000000000000000000000000043"),
        address!("0000000000000000000000000000000000000044"),
        local_adapter,
    ] {
        local.queue_deployment(contract);
    }
    let connector = FakeConnector::new();
    connector.add_client(local.clone());
    connector.add_client(remote.clone());

    let deployment = deployer(&ledgers, &artifacts, &connector)
        .deploy_to_chain(local.as_ref(), &resolved("arbitrum-sepolia"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deployment.adapter, local_adapter);

    assert_eq!(
        local.peer(local_adapter, 40245).await.unwrap(),
        read_adapter::encode_peer(remote_adapter),
        "The new adapter should learn the recorded remote adapter"
    );
    assert_eq!(
        remote.peer(remote_adapter, 40231).await.unwrap(),
        read_adapter::encode_peer(local_adapter),
        "The remote adapter should learn the new adapter"
    );
}

#[tokio::test]
async fn test_wiring_reconciles_both_sides_and_respects_the_boundary() {
    let ledger_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());

    let local_adapter = address!("0000000000000000000000000000000000000051");
    let remote_adapter = address!("0000000000000000000000000000000000000052");
    let mainnet_adapter = address!("0000000000000000000000000000000000000053");
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("base-sepolia"),
            eid: Eid::new(40245),
            adapter: remote_adapter,
        })
        .unwrap();
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("ethereum"),
            eid: Eid::new(30101),
            adapter: mainnet_adapter,
        })
        .unwrap();

    let local = ready_client("arbitrum-sepolia");
    let remote = ready_client("base-sepolia");
    let connector = FakeConnector::new();
    connector.add_client(local.clone());
    connector.add_client(remote.clone());

    let wirer = PeerWirer::builder()
        .connector(Arc::new(connector.clone()))
        .adapters(ledgers.adapters.clone())
        .build();
    let summary = wirer
        .wire_peers(local.as_ref(), local_adapter, Eid::new(40231))
        .await
        .unwrap();

    assert_eq!(summary.applied(), 2, "Both sides of the testnet pair are wired");
    assert_eq!(
        summary.skipped(),
        2,
        "The mainnet pair is skipped in both directions"
    );
    assert_eq!(
        local.peer(local_adapter, 40245).await.unwrap(),
        read_adapter::encode_peer(remote_adapter)
    );
    assert_eq!(
        remote.peer(remote_adapter, 40231).await.unwrap(),
        read_adapter::encode_peer(local_adapter)
    );
    assert!(
        local.peer(local_adapter, 30101).await.unwrap().is_zero(),
        "No peer should be set toward the mainnet adapter"
    );
}

#[tokio::test]
async fn test_wiring_skips_the_reverse_side_without_credentials() {
    let ledger_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());

    let local_adapter = address!("0000000000000000000000000000000000000061");
    let remote_adapter = address!("0000000000000000000000000000000000000062");
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("base-sepolia"),
            eid: Eid::new(40245),
            adapter: remote_adapter,
        })
        .unwrap();

    let local = ready_client("arbitrum-sepolia");
    // No signer on the remote side: readable, not transactable.
    let remote = Arc::new(FakeChainClient::new(ChainKey::new("base-sepolia")));
    let connector = FakeConnector::new();
    connector.add_client(local.clone());
    connector.add_client(remote.clone());

    let wirer = PeerWirer::builder()
        .connector(Arc::new(connector.clone()))
        .adapters(ledgers.adapters.clone())
        .build();
    let summary = wirer
        .wire_peers(local.as_ref(), local_adapter, Eid::new(40231))
        .await
        .unwrap();

    assert_eq!(summary.applied(), 1, "The forward side should still be wired");
    assert_eq!(summary.skipped(), 1);
    let skipped = summary
        .actions
        .iter()
        .find(|action| matches!(action.outcome, PeerOutcome::Skipped { .. }))
        .unwrap();
    assert_eq!(skipped.direction, PeerDirection::Reverse);
    assert!(
        remote.transactions().is_empty(),
        "No transaction should reach the uncredentialed chain"
    );
}

#[tokio::test]
async fn test_wiring_leaves_matching_peers_alone() {
    let ledger_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());

    let local_adapter = address!("0000000000000000000000000000000000000071");
    let remote_adapter = address!("0000000000000000000000000000000000000072");
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("base-sepolia"),
            eid: Eid::new(40245),
            adapter: remote_adapter,
        })
        .unwrap();

    let local = ready_client("arbitrum-sepolia");
    let remote = ready_client("base-sepolia");
    local.seed_peer(local_adapter, 40245, read_adapter::encode_peer(remote_adapter));
    remote.seed_peer(remote_adapter, 40231, read_adapter::encode_peer(local_adapter));
    let connector = FakeConnector::new();
    connector.add_client(local.clone());
    connector.add_client(remote.clone());

    let wirer = PeerWirer::builder()
        .connector(Arc::new(connector.clone()))
        .adapters(ledgers.adapters.clone())
        .build();
    let summary = wirer
        .wire_peers(local.as_ref(), local_adapter, Eid::new(40231))
        .await
        .unwrap();

    assert_eq!(summary.already_set(), 2);
    assert_eq!(summary.applied(), 0);
    assert!(
        local.transactions().is_empty() && remote.transactions().is_empty(),
        "Matching peers should produce no transactions"
    );
}

#[tokio::test]
async fn test_wiring_failure_on_one_pair_does_not_stop_the_pass() {
    let ledger_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());

    let local_adapter = address!("0000000000000000000000000000000000000081");
    let broken_adapter = address!("0000000000000000000000000000000000000082");
    let healthy_adapter = address!("0000000000000000000000000000000000000083");
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("base-sepolia"),
            eid: Eid::new(40245),
            adapter: broken_adapter,
        })
        .unwrap();
    ledgers
        .adapters
        .append(&AdapterRow {
            chain: ChainKey::new("optimism-sepolia"),
            eid: Eid::new(40232),
            adapter: healthy_adapter,
        })
        .unwrap();

    let local = ready_client("arbitrum-sepolia");
    let broken = ready_client("base-sepolia");
    broken.fail_contract(broken_adapter);
    let healthy = ready_client("optimism-sepolia");
    let connector = FakeConnector::new();
    connector.add_client(local.clone());
    connector.add_client(broken);
    connector.add_client(healthy.clone());

    let wirer = PeerWirer::builder()
        .connector(Arc::new(connector.clone()))
        .adapters(ledgers.adapters.clone())
        .build();
    let summary = wirer
        .wire_peers(local.as_ref(), local_adapter, Eid::new(40231))
        .await
        .unwrap();

    assert_eq!(summary.failed(), 1, "Only the broken reverse side fails");
    assert_eq!(
        summary.applied(),
        3,
        "Both forward sides and the healthy reverse side are wired"
    );
    assert_eq!(
        healthy.peer(healthy_adapter, 40231).await.unwrap(),
        read_adapter::encode_peer(local_adapter),
        "The pass should reach pairs listed after the failure"
    );
}
