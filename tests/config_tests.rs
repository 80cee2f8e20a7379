//! Config Tests: environment and `.env` loading
//!
//! These tests mutate process env vars, so they serialize on ENV_LOCK.

use chainstamp::config::load_dotenv;
use chainstamp::{AppConfig, Network};
use once_cell::sync::Lazy;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

const VARS: [&str; 6] = [
    "CHAINSTAMP_PROJECT_ID",
    "CHAINSTAMP_NETWORK",
    "CHAINSTAMP_RELAY_URL",
    "CHAINSTAMP_API_URL",
    "CHAINSTAMP_CONTRACT_ADDRESS",
    "CHAINSTAMP_ADDRESS_TIMEOUT_MS",
];

fn clear_vars() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

/// Test: Defaults when nothing is set
#[test]
fn test_from_env_defaults() {
    let _lock = lock_env();
    clear_vars();

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.network, Network::Mainnet);
    assert_eq!(config.api_url(), "https://api.hiro.so");
    assert_eq!(config.address_timeout(), Duration::from_secs(15));
    assert!(!config.has_project_id());
}

/// Test: Every CHAINSTAMP_* variable overrides its default
#[test]
fn test_from_env_overrides() {
    let _lock = lock_env();
    clear_vars();
    std::env::set_var("CHAINSTAMP_PROJECT_ID", "abc123");
    std::env::set_var("CHAINSTAMP_NETWORK", "testnet");
    std::env::set_var("CHAINSTAMP_API_URL", "http://localhost:3999");
    std::env::set_var("CHAINSTAMP_CONTRACT_ADDRESS", "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
    std::env::set_var("CHAINSTAMP_ADDRESS_TIMEOUT_MS", "2500");

    let config = AppConfig::from_env().expect("config");
    clear_vars();

    assert_eq!(config.project_id, "abc123");
    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.network.chain_id(), "stacks:2147483648");
    assert_eq!(config.api_url(), "http://localhost:3999");
    assert_eq!(config.address_timeout(), Duration::from_millis(2500));
    config.validate().expect("valid testnet config");
}

/// Test: Unknown networks and bad timeouts are config errors
#[test]
fn test_from_env_rejects_garbage() {
    let _lock = lock_env();
    clear_vars();

    std::env::set_var("CHAINSTAMP_NETWORK", "devnet");
    assert!(AppConfig::from_env().is_err());
    std::env::remove_var("CHAINSTAMP_NETWORK");

    std::env::set_var("CHAINSTAMP_ADDRESS_TIMEOUT_MS", "soon");
    assert!(AppConfig::from_env().is_err());
    clear_vars();
}

/// Test: .env lines fill unset variables only
#[test]
fn test_load_dotenv() {
    let _lock = lock_env();
    clear_vars();
    std::env::set_var("CHAINSTAMP_NETWORK", "mainnet");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    let mut file = std::fs::File::create(&path).expect("create .env");
    writeln!(file, "# wallet settings").expect("write");
    writeln!(file, "CHAINSTAMP_PROJECT_ID=\"from-dotenv\"").expect("write");
    writeln!(file, "CHAINSTAMP_NETWORK=testnet").expect("write");
    writeln!(file, "CHAINSTAMP_RELAY_URL=").expect("write");
    drop(file);

    let loaded = load_dotenv(&path);
    let project = std::env::var("CHAINSTAMP_PROJECT_ID").ok();
    let network = std::env::var("CHAINSTAMP_NETWORK").ok();
    clear_vars();

    assert_eq!(loaded, 1);
    assert_eq!(project.as_deref(), Some("from-dotenv"));
    assert_eq!(network.as_deref(), Some("mainnet"));
    assert_eq!(load_dotenv(&dir.path().join("missing.env")), 0);
}

/// Test: Partial JSON config fills the rest from defaults
#[test]
fn test_partial_json_config() {
    let config: AppConfig = serde_json::from_str(r#"{"projectId": "p", "network": "testnet"}"#).expect("parse");
    assert_eq!(config.project_id, "p");
    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.contracts.stamp_registry.fee, 50_000);
    assert_eq!(config.relay_url, "wss://relay.walletconnect.com");
}
