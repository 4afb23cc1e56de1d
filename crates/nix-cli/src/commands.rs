mod script;
mod tx;

use nix_parser::TxParser;
use nix_script::ScriptClassifier;
use serde_json::Value;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parser(#[from] nix_parser::Error),
    #[error(transparent)]
    Zerocoin(#[from] nix_script::Error),
    #[error("Invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Classify an output script.
    Classify {
        /// Output script as hex.
        #[arg(index = 1)]
        script: String,
    },

    /// Convert an address or a reserved label into its descriptor.
    Address {
        #[arg(index = 1)]
        address: String,
    },

    /// Resolve a descriptor into its addresses.
    Descriptor {
        /// Descriptor as hex.
        #[arg(index = 1)]
        descriptor: String,
    },

    /// Decode the value redeemed by a zerocoin spend signature script.
    #[command(name = "zerocoin-value")]
    ZerocoinValue {
        /// Signature script as hex.
        #[arg(index = 1)]
        script_sig: String,
    },

    /// Parse a raw transaction.
    Tx {
        /// Raw transaction as hex.
        #[arg(index = 1)]
        input: String,
    },

    /// Parse a transaction in the node's `getrawtransaction` verbose format.
    #[command(name = "tx-json")]
    TxJson {
        /// Path to the JSON document.
        #[arg(index = 1)]
        path: String,
    },

    /// Parse a raw block.
    Block {
        /// Raw block as hex.
        #[arg(index = 1)]
        input: String,
    },

    /// Pack a raw transaction into its storage record.
    Pack {
        /// Raw transaction as hex.
        #[arg(index = 1)]
        input: String,

        /// Height of the including block.
        #[arg(long)]
        height: u32,

        /// Time of the including block.
        #[arg(long, allow_hyphen_values = true)]
        block_time: i64,
    },

    /// Unpack a storage record.
    Unpack {
        /// Packed record as hex.
        #[arg(index = 1)]
        input: String,
    },
}

impl Command {
    pub fn run<C: ScriptClassifier>(self, parser: &TxParser<C>) -> Result<Value, Error> {
        match self {
            Self::Classify { script } => script::classify(parser, &read_hex(&script)?),
            Self::Address { address } => script::address(parser, &address),
            Self::Descriptor { descriptor } => script::descriptor(parser, &read_hex(&descriptor)?),
            Self::ZerocoinValue { script_sig } => script::zerocoin_value(&read_hex(&script_sig)?),
            Self::Tx { input } => tx::parse_tx(parser, &read_hex(&input)?),
            Self::TxJson { path } => tx::parse_tx_json(parser, &read_text(&path)?),
            Self::Block { input } => tx::parse_block(parser, &read_hex(&input)?),
            Self::Pack {
                input,
                height,
                block_time,
            } => tx::pack(parser, &read_hex(&input)?, height, block_time),
            Self::Unpack { input } => tx::unpack(parser, &read_hex(&input)?),
        }
    }
}

/// Reads the argument, or stdin when it is `-`.
fn read_arg(arg: &str) -> Result<String, Error> {
    if arg == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        Ok(arg.to_string())
    }
}

/// Reads a file, or stdin when the path is `-`.
fn read_text(path: &str) -> Result<String, Error> {
    if path == "-" {
        read_arg(path)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn read_hex(arg: &str) -> Result<Vec<u8>, Error> {
    let input = read_arg(arg)?;
    let input = input.trim();
    let input = input.strip_prefix("0x").unwrap_or(input);
    Ok(hex::decode(input)?)
}
