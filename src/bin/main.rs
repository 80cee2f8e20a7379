//! ChainStamp CLI - inspect configuration, build call payloads, query registries
//!
//!   chainstamp config                          → effective configuration
//!   chainstamp address <SP...>                 → version, hash160, network
//!   chainstamp pairing <wc:...>                → parsed pairing URI + deep link
//!   chainstamp clarity <0x...>                 → decoded Clarity value
//!
//! Dry-run payloads (what a wallet receives for `stx_callContract`):
//!   chainstamp call hash <sha256-hex> [description]
//!   chainstamp call stamp <message>
//!   chainstamp call tag <key> <value>
//!   chainstamp call update-tag <key> <value>
//!
//! Read-only queries against the Stacks API:
//!   chainstamp query hash verify|owner <sha256-hex>
//!   chainstamp query hash get <id> | count | fee | user-count <addr>
//!   chainstamp query stamp get <id> | count | fee | user <addr> | user-count <addr>
//!   chainstamp query tag get <id> | owner <id> | key <owner> <key> | count | fee | user <addr>
//!   chainstamp query <registry> owner-of-contract | total-fees
//!   chainstamp tx <txid> [contract-id]
//!
//! Configuration comes from `CHAINSTAMP_*` variables (a `.env` file is read
//! first) and the `--network`, `--api`, `--deployer`, `--sender` flags.

use anyhow::{anyhow, bail, Context, Result};
use chainstamp::api::{HiroClient, TxStatus};
use chainstamp::clarity::{c32, from_hex, ClarityValue};
use chainstamp::config::{load_dotenv, AppConfig, Network, RegistryKind, DEFAULT_DEPLOYER};
use chainstamp::logging::init_logging;
use chainstamp::registry::{
    describe_error, explorer_url, parse_digest, HashRegistry, Registry, StampRegistry, TagRegistry,
};
use chainstamp::session::{short_address, PairingUri};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);
    init_logging(opts.verbose);

    let loaded = load_dotenv(Path::new(".env"));
    if loaded > 0 {
        debug!(loaded, "read .env");
    }

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("chainstamp {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("config") => load_config(&opts).and_then(|c| cmd_config(&c)),
        Some("address") => cmd_address(&opts),
        Some("pairing") => cmd_pairing(&opts),
        Some("clarity") => cmd_clarity(&opts),
        Some("call") => load_config(&opts).and_then(|c| cmd_call(&c, &opts)),
        Some("query") => load_config(&opts).and_then(|c| block_on(cmd_query(&c, &opts))),
        Some("tx") => load_config(&opts).and_then(|c| block_on(cmd_tx(&c, &opts))),
        Some(cmd) => Err(anyhow!("Unknown command: {cmd}")),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    let render = |value: &Value| {
        if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .unwrap_or_else(|_| value.to_string())
    };

    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{e:#}")})));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    args: Vec<String>,
    network: Option<String>,
    api_url: Option<String>,
    deployer: Option<String>,
    sender: Option<String>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
    verbose: u8,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let mut value = || {
                i += 1;
                args.get(i).cloned()
            };
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--verbose" | "-v" => opts.verbose = opts.verbose.saturating_add(1),
                "-vv" => opts.verbose = opts.verbose.saturating_add(2),
                "--network" | "-n" => opts.network = value(),
                "--api" => opts.api_url = value(),
                "--deployer" => opts.deployer = value(),
                "--sender" => opts.sender = value(),
                _ if !arg.starts_with('-') || arg == "-" => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.args = positional;
        opts
    }

    fn arg(&self, index: usize, name: &str) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing <{name}>"))
    }

    /// Everything from `index` on, space-joined.
    fn rest(&self, index: usize) -> String {
        self.args.get(index..).map(|a| a.join(" ")).unwrap_or_default()
    }
}

fn print_usage() {
    println!(
        r#"chainstamp - WalletConnect + Stacks registry toolkit

USAGE:
    chainstamp <command> [args] [options]

COMMANDS:
    config                           Show effective configuration
    address <addr>                   Decode a Stacks address
    pairing <uri>                    Parse a WalletConnect pairing URI
    clarity <hex>                    Decode a serialized Clarity value
    call <hash|stamp|tag|update-tag> Build a stx_callContract payload (no wallet)
    query <hash|stamp|tag> <what>    Read-only registry query
    tx <txid> [contract-id]          Transaction status and result

OPTIONS:
    -n, --network <net>   mainnet | testnet   (env: CHAINSTAMP_NETWORK)
        --api <url>       Stacks API base URL (env: CHAINSTAMP_API_URL)
        --deployer <addr> Registry deployer   (env: CHAINSTAMP_CONTRACT_ADDRESS)
        --sender <addr>   Principal for read-only calls (default: deployer)
        --json            Compact JSON output
        --pretty          Pretty JSON output (default on a terminal)
    -v, --verbose         More log output (repeat for all crates at debug)
    -h, --help            Show this help
    -V, --version         Show version

ENVIRONMENT:
    CHAINSTAMP_PROJECT_ID   WalletConnect project id
    CHAINSTAMP_LOG_FORMAT   compact | json logs on stderr
    RUST_LOG                Log filter (overrides -v; default: info)
"#
    );
}

fn block_on<F: std::future::Future<Output = Result<Value>>>(future: F) -> Result<Value> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?
        .block_on(future)
}

fn load_config(opts: &ParsedArgs) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(net) = &opts.network {
        config.network = Network::from_str(net).ok_or_else(|| anyhow!("unknown network '{net}'"))?;
    }
    if let Some(url) = &opts.api_url {
        config = config.with_api_url(url.clone());
    }
    if let Some(deployer) = &opts.deployer {
        config = config.with_deployer(deployer.clone());
    }
    if config.network == Network::Testnet && config.contracts.deployer == DEFAULT_DEPLOYER {
        bail!("testnet needs a deployer: pass --deployer or set CHAINSTAMP_CONTRACT_ADDRESS");
    }
    config.validate()?;
    Ok(config)
}

fn registry_kind(opts: &ParsedArgs) -> Result<RegistryKind> {
    let name = opts.arg(0, "registry")?;
    RegistryKind::from_str(name).ok_or_else(|| anyhow!("unknown registry '{name}' (hash, stamp, tag)"))
}

fn with_sender(registry: Registry, opts: &ParsedArgs) -> Registry {
    match &opts.sender {
        Some(sender) => registry.with_sender(sender.clone()),
        None => registry,
    }
}

fn parse_id(opts: &ParsedArgs, index: usize) -> Result<u64> {
    let raw = opts.arg(index, "id")?;
    raw.trim_start_matches('u').parse().with_context(|| format!("bad id '{raw}'"))
}

// =============================================================================
// OFFLINE COMMANDS
// =============================================================================

fn cmd_config(config: &AppConfig) -> Result<Value> {
    let contracts: Vec<Value> = RegistryKind::ALL
        .iter()
        .map(|&kind| {
            json!({
                "registry": kind.as_str(),
                "contract": config.contracts.contract_id(kind).to_string(),
                "fee": config.contracts.fee(kind),
            })
        })
        .collect();
    Ok(json!({
        "network": config.network.as_str(),
        "chainId": config.network.chain_id(),
        "apiUrl": config.api_url(),
        "relayUrl": config.relay_url,
        "projectIdSet": config.has_project_id(),
        "addressTimeoutMs": config.address_timeout_ms,
        "metadata": config.metadata,
        "contracts": contracts,
    }))
}

fn cmd_address(opts: &ParsedArgs) -> Result<Value> {
    let address = opts.arg(0, "address")?;
    let (version, hash160) = c32::c32_address_decode(address)?;
    let network = [Network::Mainnet, Network::Testnet]
        .into_iter()
        .find(|n| n.address_versions().contains(&version))
        .map(|n| n.as_str());
    Ok(json!({
        "address": c32::c32_address(version, &hash160)?,
        "short": short_address(address),
        "version": version,
        "hash160": hex::encode(hash160),
        "network": network,
    }))
}

fn cmd_pairing(opts: &ParsedArgs) -> Result<Value> {
    let uri = PairingUri::parse(opts.arg(0, "uri")?)?;
    let mut value = serde_json::to_value(&uri)?;
    value["deepLink"] = json!(uri.deep_link());
    Ok(value)
}

fn cmd_clarity(opts: &ParsedArgs) -> Result<Value> {
    let value = from_hex(opts.arg(0, "hex")?)?;
    Ok(json!({"repr": value.to_string(), "value": value.to_json()}))
}

fn cmd_call(config: &AppConfig, opts: &ParsedArgs) -> Result<Value> {
    let contracts = &config.contracts;
    let call = match opts.arg(0, "registry")? {
        "hash" => {
            let digest = parse_digest(opts.arg(1, "sha256-hex")?)?;
            HashRegistry::new(contracts).store_hash(&digest, &opts.rest(2))?
        }
        "stamp" => StampRegistry::new(contracts).stamp_message(&opts.rest(1))?,
        "tag" => TagRegistry::new(contracts).store_tag(opts.arg(1, "key")?, &opts.rest(2))?,
        "update-tag" => TagRegistry::new(contracts).update_tag(opts.arg(1, "key")?, &opts.rest(2))?,
        other => bail!("unknown call '{other}' (hash, stamp, tag, update-tag)"),
    };
    let args: Vec<String> = call.args.iter().map(ToString::to_string).collect();
    Ok(json!({
        "method": "stx_callContract",
        "chainId": config.network.chain_id(),
        "params": call.to_params(config.network)?,
        "repr": args,
    }))
}

// =============================================================================
// NETWORK COMMANDS
// =============================================================================

async fn cmd_query(config: &AppConfig, opts: &ParsedArgs) -> Result<Value> {
    let client = HiroClient::new(config.api_url())?;
    let kind = registry_kind(opts)?;
    let what = opts.arg(1, "query")?;
    let base = with_sender(Registry::new(&config.contracts, kind), opts);
    debug!(registry = kind.as_str(), what, api = client.base_url(), "query");

    match what {
        "owner-of-contract" => return Ok(json!({"owner": base.contract_owner(&client).await?})),
        "total-fees" => return Ok(json!({"totalFees": base.total_fees(&client).await?})),
        _ => {}
    }

    match kind {
        RegistryKind::Hash => {
            let hash = HashRegistry(base);
            match what {
                "verify" => {
                    let digest = parse_digest(opts.arg(2, "sha256-hex")?)?;
                    Ok(json!({"exists": hash.verify_hash(&client, &digest).await?}))
                }
                "owner" => {
                    let digest = parse_digest(opts.arg(2, "sha256-hex")?)?;
                    Ok(json!({"owner": hash.hash_owner(&client, &digest).await?}))
                }
                "get" => {
                    let digest = hash.hash_by_id(&client, parse_id(opts, 2)?).await?;
                    Ok(json!({"hash": digest.map(hex::encode)}))
                }
                "count" => Ok(json!({"count": hash.hash_count(&client).await?})),
                "user-count" => Ok(json!({"count": hash.user_hash_count(&client, opts.arg(2, "address")?).await?})),
                "fee" => Ok(json!({"fee": hash.fee(&client).await?})),
                other => bail!("unknown hash query '{other}'"),
            }
        }
        RegistryKind::Stamp => {
            let stamp = StampRegistry(base);
            match what {
                "get" => Ok(serde_json::to_value(stamp.stamp(&client, parse_id(opts, 2)?).await?)?),
                "count" => Ok(json!({"count": stamp.stamp_count(&client).await?})),
                "user" => Ok(json!({"ids": stamp.user_stamps(&client, opts.arg(2, "address")?).await?})),
                "user-count" => Ok(json!({"count": stamp.user_stamp_count(&client, opts.arg(2, "address")?).await?})),
                "fee" => Ok(json!({"fee": stamp.fee(&client).await?})),
                other => bail!("unknown stamp query '{other}'"),
            }
        }
        RegistryKind::Tag => {
            let tag = TagRegistry(base);
            match what {
                "get" => Ok(serde_json::to_value(tag.tag(&client, parse_id(opts, 2)?).await?)?),
                "owner" => Ok(json!({"owner": tag.tag_owner(&client, parse_id(opts, 2)?).await?})),
                "key" => {
                    let record = tag.tag_by_key(&client, opts.arg(2, "owner")?, opts.arg(3, "key")?).await?;
                    Ok(serde_json::to_value(record)?)
                }
                "count" => Ok(json!({"count": tag.tag_count(&client).await?})),
                "user" => Ok(json!({"ids": tag.user_tags(&client, opts.arg(2, "address")?).await?})),
                "fee" => Ok(json!({"fee": tag.fee(&client).await?})),
                other => bail!("unknown tag query '{other}'"),
            }
        }
    }
}

/// Registry error text for an `(err uN)` result, matched by contract name.
fn explain_result(config: &AppConfig, contract: Option<&str>, result: &ClarityValue) -> Option<String> {
    let code = result.expect_response().ok()?.err()?.expect_uint().ok()?;
    let kind = RegistryKind::ALL
        .into_iter()
        .find(|&k| contract.map(|c| c == config.contracts.contract_id(k).to_string()).unwrap_or(false))?;
    describe_error(kind, code).map(str::to_string)
}

async fn cmd_tx(config: &AppConfig, opts: &ParsedArgs) -> Result<Value> {
    let client = HiroClient::new(config.api_url())?;
    let info = client.transaction(opts.arg(0, "txid")?).await?;
    let contract = opts.args.get(1).map(String::as_str);
    let explanation = info.result.as_ref().and_then(|r| explain_result(config, contract, r));
    Ok(json!({
        "txid": info.txid,
        "status": info.status,
        "final": info.status.is_final(),
        "result": info.result.as_ref().map(ToString::to_string),
        "error": explanation,
        "explorer": (info.status != TxStatus::NotFound).then(|| explorer_url(&info.txid, config.network)),
    }))
}
