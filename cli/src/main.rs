mod config;

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use employees_kernel::replay::audit_index;
use employees_kernel::store::StoreSnapshot;
use employees_kernel::{
    CallerIdentity, Employee, EmployeesContract, InMemoryPrivateDataStore, Partition, StaticIdentity,
    TransactionContext, TransientInput,
};

use crate::config::CliConfig;

/// Private employee records CLI
#[derive(Parser, Debug)]
#[command(name = "employees")]
#[command(about = "Confidential employee records with public commitments", long_about = None)]
struct Cli {
    /// Path to CLI config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the store state JSON (overrides config)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Organization to act as (overrides config)
    #[arg(long, env = "CORE_PEER_LOCALMSPID")]
    msp_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a record exists in the caller's partition
    Exists { key: String },

    /// Create a record from transient fields
    Create {
        key: String,
        /// Transient field as KEY=VALUE (repeatable)
        #[arg(long = "transient", value_parser = parse_transient_pair)]
        transient: Vec<(String, String)>,
    },

    /// Read a record from the caller's partition
    Read { key: String },

    /// Replace a record from transient fields
    Update {
        key: String,
        /// Transient field as KEY=VALUE (repeatable)
        #[arg(long = "transient", value_parser = parse_transient_pair)]
        transient: Vec<(String, String)>,
    },

    /// Delete a record from the caller's partition
    Delete { key: String },

    /// Verify a candidate record against another organization's commitment
    Verify {
        /// Organization whose commitment is checked
        #[arg(long)]
        target_org: String,
        key: String,
        /// Candidate employee as JSON
        #[arg(long)]
        employee: String,
    },

    /// List published commitment events for a key
    History {
        key: String,
        /// Organization partition to inspect (defaults to the caller's)
        #[arg(long)]
        org: Option<String>,
    },

    /// Replay the commitment log and compare it with the live index
    Audit,
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Create { .. } | Command::Update { .. } | Command::Delete { .. }
        )
    }
}

fn parse_transient_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

fn transient_input(pairs: Vec<(String, String)>) -> TransientInput {
    pairs.into_iter().collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ----------------------------
    // Load config
    // ----------------------------
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default_config(),
    };
    if let Some(msp_id) = cli.msp_id {
        config.msp_id = Some(msp_id);
    }
    let state_path = cli
        .state
        .unwrap_or_else(|| PathBuf::from(&config.state_path));
    let Some(msp_id) = config.msp_id.clone() else {
        bail!("no organization given: pass --msp-id, set CORE_PEER_LOCALMSPID, or set msp_id in config");
    };
    let identity = StaticIdentity::new(msp_id);

    // ----------------------------
    // Logging (stderr; stdout carries JSON)
    // ----------------------------
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ----------------------------
    // Load store state
    // ----------------------------
    let snapshot = match tokio::fs::read_to_string(&state_path).await {
        Ok(data) => serde_json::from_str::<StoreSnapshot>(&data)
            .with_context(|| format!("parsing state {}", state_path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => StoreSnapshot::default(),
        Err(e) => {
            return Err(e).with_context(|| format!("reading state {}", state_path.display()))
        }
    };
    debug!(path = %state_path.display(), "state loaded");

    let contract = EmployeesContract::new(InMemoryPrivateDataStore::from_snapshot(snapshot));

    let mutates = cli.command.mutates();

    // ----------------------------
    // Run command
    // ----------------------------
    let output = match cli.command {
        Command::Exists { key } => {
            let ctx = TransactionContext::resolve(&identity, TransientInput::new());
            let exists = contract.employees_exists(&ctx, &key).await?;
            json!({ "key": key, "exists": exists })
        }
        Command::Create { key, transient } => {
            let ctx = TransactionContext::resolve(&identity, transient_input(transient));
            contract.create_employees(&ctx, &key).await?;
            json!({ "key": key, "status": "created" })
        }
        Command::Read { key } => {
            let ctx = TransactionContext::resolve(&identity, TransientInput::new());
            let employee = contract.read_employees(&ctx, &key).await?;
            serde_json::to_value(&employee)?
        }
        Command::Update { key, transient } => {
            let ctx = TransactionContext::resolve(&identity, transient_input(transient));
            contract.update_employees(&ctx, &key).await?;
            json!({ "key": key, "status": "updated" })
        }
        Command::Delete { key } => {
            let ctx = TransactionContext::resolve(&identity, TransientInput::new());
            contract.delete_employees(&ctx, &key).await?;
            json!({ "key": key, "status": "deleted" })
        }
        Command::Verify {
            target_org,
            key,
            employee,
        } => {
            let candidate: Employee =
                serde_json::from_str(&employee).context("parsing --employee JSON")?;
            let ctx = TransactionContext::resolve(&identity, TransientInput::new());
            let matches = contract
                .verify_employees(&ctx, &target_org, &key, &candidate)
                .await?;
            json!({ "target_org": target_org, "key": key, "matches": matches })
        }
        Command::History { key, org } => {
            let org = org.unwrap_or_else(|| identity.msp_id());
            let events = contract
                .store()
                .history(&Partition::for_org(&org), &key)
                .await;
            serde_json::to_value(&events)?
        }
        Command::Audit => {
            let store = contract.store();
            let report =
                audit_index(&store.commitment_log().await, &store.commitment_index().await)?;
            serde_json::to_value(&report)?
        }
    };

    // ----------------------------
    // Persist state
    // ----------------------------
    if mutates {
        let snapshot = contract.store().snapshot().await;
        tokio::fs::write(&state_path, serde_json::to_vec_pretty(&snapshot)?)
            .await
            .with_context(|| format!("writing state {}", state_path.display()))?;
        debug!(path = %state_path.display(), "state saved");
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
