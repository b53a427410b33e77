//! Integration tests for the sequential batch runners
//!
//! Deploy batches and workflow batches share the same discipline: one
//! chain at a time, a pacing delay between chains, and a hard halt on the
//! first failure so a partial rollout never silently keeps going. These
//! tests drive both runners through scripted fakes and a fake clock.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tempfile::TempDir;

use tix_ops::chain::{ChainKey, Environment};
use tix_ops::config::OpsConfig;
use tix_ops::deploy::{
    ArtifactStore, DeployRunner, DeployStatus, WorkflowDeployer, WorkflowStatus,
    DEFAULT_WORKFLOW_CHAINS,
};
use tix_ops::ledger::LedgerSet;
use tix_ops::registry::Registry;
use tix_ops::testing::{FakeChainClient, FakeClock, FakeConnector, FakeTransaction};

const ENDPOINT: &str = "0x6EDCE65403992e310A62460808c4b910D972f10f";
const READ_LIB: &str = "0x908E086E0e7D7d4F6e8633D90C587AC2F74f73cD";

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

fn write_artifacts(dir: &TempDir) -> ArtifactStore {
    for name in [
        "TixToken",
        "ServiceDeployer",
        "UpgradeableServiceDeployer",
        "TixReadAdapter",
        "TokenWorkflow",
    ] {
        std::fs::write(
            dir.path().join(format!("{name}.json")),
            r#"{"bytecode": "0x60806040"}"#,
        )
        .unwrap();
    }
    ArtifactStore::new(dir.path())
}

/// A client with a signer and live endpoint code on its chain.
fn ready_client(chain: &str) -> Arc<FakeChainClient> {
    let client = Arc::new(FakeChainClient::new(ChainKey::new(chain)));
    client.set_signer(Address::repeat_byte(0xaa));
    client.add_code(ENDPOINT.parse().unwrap());
    client
}

/// Queues the four contract creations one chain deploy consumes.
fn queue_contract_set(client: &FakeChainClient, base: u8) {
    for offset in 0..4 {
        client.queue_deployment(Address::repeat_byte(base + offset));
    }
}

fn config() -> OpsConfig {
    OpsConfig::builder()
        .chain_delay(Duration::from_millis(250))
        .build()
}

fn runner(
    ledgers: &LedgerSet,
    artifacts: &ArtifactStore,
    connector: &FakeConnector,
    clock: &FakeClock,
) -> DeployRunner {
    DeployRunner::builder()
        .config(config())
        .registry(test_registry())
        .ledgers(ledgers.clone())
        .artifacts(artifacts.clone())
        .connector(Arc::new(connector.clone()))
        .clock(Arc::new(clock.clone()))
        .build()
}

fn workflow_deployer(
    ledgers: &LedgerSet,
    artifacts: &ArtifactStore,
    connector: &FakeConnector,
    clock: &FakeClock,
) -> WorkflowDeployer {
    WorkflowDeployer::builder()
        .config(config())
        .registry(test_registry())
        .ledgers(ledgers.clone())
        .artifacts(artifacts.clone())
        .connector(Arc::new(connector.clone()))
        .clock(Arc::new(clock.clone()))
        .build()
}

fn chains(keys: &[&str]) -> Vec<ChainKey> {
    keys.iter().map(ChainKey::new).collect()
}

#[tokio::test]
async fn test_batch_deploys_each_chain_in_order_with_pacing() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let arbitrum = ready_client("arbitrum-sepolia");
    queue_contract_set(&arbitrum, 0x10);
    let base = ready_client("base-sepolia");
    queue_contract_set(&base, 0x20);
    let connector = FakeConnector::new();
    connector.add_client(arbitrum);
    connector.add_client(base);
    let clock = FakeClock::new();

    let report = runner(&ledgers, &artifacts, &connector, &clock)
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert!(report.all_succeeded(), "Both chains should deploy cleanly");
    assert_eq!(report.deployed(), 2);
    assert!(!report.halted);
    assert_eq!(report.outcomes[0].chain, ChainKey::new("arbitrum-sepolia"));
    assert_eq!(report.outcomes[1].chain, ChainKey::new("base-sepolia"));

    assert_eq!(
        clock.sleep_count(),
        1,
        "Pacing applies between chains, not after the last one"
    );
    assert_eq!(clock.total_sleep_time(), Duration::from_millis(250));

    for chain in ["arbitrum-sepolia", "base-sepolia"] {
        assert!(
            ledgers.tix.latest(&ChainKey::new(chain)).unwrap().is_some(),
            "Each deployed chain should be recorded in the token ledger"
        );
    }
}

#[tokio::test]
async fn test_batch_halts_when_a_chain_cannot_resolve() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let base = ready_client("base-sepolia");
    queue_contract_set(&base, 0x30);
    let connector = FakeConnector::new();
    connector.add_client(base.clone());
    let clock = FakeClock::new();

    let report = runner(&ledgers, &artifacts, &connector, &clock)
        .run(&chains(&["taraxa-testnet-2", "base-sepolia"]))
        .await;

    assert!(report.halted, "A missing registry entry halts the batch");
    assert!(!report.all_succeeded());
    assert_eq!(report.outcomes.len(), 1, "The second chain is never attempted");
    assert!(
        matches!(&report.outcomes[0].status, DeployStatus::Failed(reason) if reason.contains("taraxa-testnet-2")),
        "The failure should name the unresolvable chain"
    );
    assert!(
        base.transactions().is_empty(),
        "Nothing should reach the chain after the halt"
    );
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn test_batch_halts_on_a_deploy_failure() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let arbitrum = ready_client("arbitrum-sepolia");
    arbitrum.fail_deploys();
    let base = ready_client("base-sepolia");
    queue_contract_set(&base, 0x40);
    let connector = FakeConnector::new();
    connector.add_client(arbitrum);
    connector.add_client(base.clone());
    let clock = FakeClock::new();

    let report = runner(&ledgers, &artifacts, &connector, &clock)
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert!(report.halted);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.deployed(), 0);
    assert!(
        base.transactions().is_empty(),
        "The batch must not continue past a failed chain"
    );
}

#[tokio::test]
async fn test_chain_without_a_usable_endpoint_halts_the_batch() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    // Signer present, endpoint code absent.
    let arbitrum = Arc::new(FakeChainClient::new(ChainKey::new("arbitrum-sepolia")));
    arbitrum.set_signer(Address::repeat_byte(0xaa));
    let connector = FakeConnector::new();
    connector.add_client(arbitrum);
    let clock = FakeClock::new();

    let report = runner(&ledgers, &artifacts, &connector, &clock)
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert!(report.halted);
    assert!(
        matches!(&report.outcomes[0].status, DeployStatus::Failed(reason) if reason == "no usable endpoint"),
    );
}

#[tokio::test]
async fn test_workflow_batch_lands_then_reuses() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let arbitrum = ready_client("arbitrum-sepolia");
    arbitrum.queue_deployment(Address::repeat_byte(0x51));
    let base = ready_client("base-sepolia");
    base.queue_deployment(Address::repeat_byte(0x52));
    let connector = FakeConnector::new();
    connector.add_client(arbitrum.clone());
    connector.add_client(base);
    let clock = FakeClock::new();

    let deployer = workflow_deployer(&ledgers, &artifacts, &connector, &clock);
    let first = deployer
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert!(first.all_succeeded());
    assert_eq!(first.deployed(), 2);
    assert_eq!(
        ledgers
            .workflows
            .latest(&ChainKey::new("arbitrum-sepolia"))
            .unwrap()
            .unwrap()
            .workflow,
        Address::repeat_byte(0x51)
    );

    let second = deployer
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert_eq!(second.reused(), 2, "A rerun should reuse the recorded workflows");
    assert_eq!(second.deployed(), 0);
    let deploys = arbitrum
        .transactions()
        .iter()
        .filter(|tx| matches!(tx, FakeTransaction::Deploy { .. }))
        .count();
    assert_eq!(deploys, 1, "The rerun must not deploy a second workflow");
}

#[tokio::test]
async fn test_workflow_batch_halts_on_the_first_failure() {
    let ledger_dir = TempDir::new().unwrap();
    let artifact_dir = TempDir::new().unwrap();
    let ledgers = LedgerSet::new(ledger_dir.path());
    let artifacts = write_artifacts(&artifact_dir);

    let arbitrum = ready_client("arbitrum-sepolia");
    arbitrum.fail_deploys();
    let base = ready_client("base-sepolia");
    base.queue_deployment(Address::repeat_byte(0x61));
    let connector = FakeConnector::new();
    connector.add_client(arbitrum);
    connector.add_client(base.clone());
    let clock = FakeClock::new();

    let report = workflow_deployer(&ledgers, &artifacts, &connector, &clock)
        .run(&chains(&["arbitrum-sepolia", "base-sepolia"]))
        .await;

    assert!(report.halted);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[0].status,
        WorkflowStatus::Failed(_)
    ));
    assert!(
        base.transactions().is_empty(),
        "The batch must not continue past a failed chain"
    );
    assert!(
        ledgers.workflows.rows().unwrap().is_empty(),
        "A failed deploy must not be recorded"
    );
}

#[test]
fn test_default_workflow_chains_are_all_testnets() {
    for key in DEFAULT_WORKFLOW_CHAINS {
        assert_eq!(
            ChainKey::new(key).environment(),
            Environment::Testnet,
            "{key} should be a testnet"
        );
    }
}
