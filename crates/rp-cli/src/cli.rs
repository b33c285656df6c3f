use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rp-node",
    about = "Relying-party node: issues identity requests to the ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Decode a base64 ledger transaction
    DecodeTx(DecodeTxArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Ledger RPC endpoint, overriding the config file
    #[arg(long)]
    pub ledger_url: Option<String>,
}

#[derive(Args)]
pub struct DecodeTxArgs {
    /// Encoded transaction, as sent in the `tx` parameter
    pub tx: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "rp-node",
            "serve",
            "--config",
            "node.toml",
            "--bind",
            "0.0.0.0:9000",
            "--ledger-url",
            "http://ledger:26657",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.config, Some(PathBuf::from("node.toml")));
        assert_eq!(args.bind.unwrap().port(), 9000);
        assert_eq!(args.ledger_url.as_deref(), Some("http://ledger:26657"));
    }

    #[test]
    fn parse_decode_tx_with_json_output() {
        let cli = Cli::try_parse_from(["rp-node", "decode-tx", "Zm9v", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::DecodeTx(DecodeTxArgs { ref tx }) if tx == "Zm9v"));
    }

    #[test]
    fn rejects_bad_bind_address() {
        assert!(Cli::try_parse_from(["rp-node", "serve", "--bind", "nowhere"]).is_err());
    }
}
