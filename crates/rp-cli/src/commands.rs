use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use rp_ledger::{EncodedTransaction, TransactionBuilder};
use rp_server::{RpConfig, RpServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::DecodeTx(args) => cmd_decode_tx(args, cli.format),
        Command::Config(args) => cmd_config(args, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RpConfig> {
    RpConfig::load(path).context("failed to load configuration")
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(url) = args.ledger_url {
        config.ledger.endpoint = url;
    }
    let server = RpServer::new(config)?;
    tracing::debug!(
        config = ?args.config,
        retries = server.config().server.broadcast_retries,
        "configuration loaded"
    );

    println!(
        "{} rp-node on {} (ledger: {})",
        "▶".green().bold(),
        server.config().server.bind_addr.to_string().bold(),
        server.config().ledger.endpoint.cyan()
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(server.serve())?;
    tracing::info!("rp-node stopped");
    println!("{} Stopped.", "✓".green());
    Ok(())
}

fn cmd_decode_tx(args: DecodeTxArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tx = EncodedTransaction::from_encoded(args.tx.trim());
    let decoded = TransactionBuilder::decode(&tx)?;
    let payload: serde_json::Value =
        serde_json::from_str(&decoded.payload).context("payload is not JSON")?;

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "function": decoded.function,
                "payload": payload,
                "nonce": decoded.nonce.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("Function: {}", decoded.function.yellow().bold());
            println!("Nonce:    {}", decoded.nonce.as_str().dimmed());
            println!("Payload:");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
    }
    if let Err(e) = config.validate() {
        eprintln!("{} {e}", "warning:".yellow().bold());
    }
    Ok(())
}
