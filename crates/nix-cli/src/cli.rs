use crate::commands::Command;
use clap::Parser;
use nix_primitives::Network;

/// Chain.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Chain {
    /// NIX mainnet.
    #[default]
    Main,
    /// NIX testnet.
    Test,
}

impl Chain {
    pub fn network(self) -> Network {
        match self {
            Self::Main => Network::Mainnet,
            Self::Test => Network::Testnet,
        }
    }
}

/// Inspect NIX scripts, transactions and blocks.
#[derive(Debug, Parser)]
#[clap(name = "nixparse", version)]
pub struct App {
    /// Specify the chain whose address encoding is used.
    #[arg(long, value_name = "CHAIN", default_value = "main", global = true)]
    pub chain: Chain,

    /// Sets a custom logging filter (syntax: `<target>=<level>`).
    ///
    /// Falls back to `RUST_LOG`, then to `info`.
    ///
    /// *Example*: `--log warn,nix_parser=trace`.
    #[arg(short = 'l', long, value_name = "LOG_PATTERN", global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}
