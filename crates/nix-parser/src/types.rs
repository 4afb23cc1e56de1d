//! Transaction and block records handed to the indexer.

use bitcoin::{BlockHash, Txid};
use nix_script::ScriptKind;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vin {
    /// Generation input, only the first input of a coinbase transaction is kept.
    Coinbase {
        /// Coinbase script as hex.
        coinbase: String,
        sequence: u32,
    },
    /// Redeems a zerocoin, there is no previous output to reference.
    ZerocoinSpend {
        /// Signature script as hex.
        script_sig: String,
        sequence: u32,
        /// Denomination of the redeemed coin, zero when the payload does not decode.
        #[serde(with = "big_int_string")]
        value_sat: BigInt,
    },
    /// Spends the output `vout` of transaction `txid`.
    Standard {
        txid: Txid,
        vout: u32,
        /// Signature script as hex.
        script_sig: String,
        sequence: u32,
    },
}

impl Vin {
    /// Signature script as hex, `None` for the coinbase input.
    pub fn script_sig(&self) -> Option<&str> {
        match self {
            Self::Coinbase { .. } => None,
            Self::ZerocoinSpend { script_sig, .. } | Self::Standard { script_sig, .. } => {
                Some(script_sig)
            }
        }
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vout {
    #[serde(with = "big_int_string")]
    pub value_sat: BigInt,
    /// Position of the output in the transaction.
    pub n: u32,
    /// Output script as hex.
    pub script_hex: String,
    pub addresses: Vec<String>,
    /// Whether the output is indexed by address.
    pub searchable: bool,
    pub kind: ScriptKind,
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub txid: Txid,
    pub version: i32,
    pub lock_time: u32,
    /// Raw transaction as hex.
    pub hex: String,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
    /// Time of the including block, 0 when unknown.
    pub block_time: i64,
    pub time: i64,
    pub confirmations: u32,
}

/// A block with its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub time: u32,
    /// Size of the serialized block in bytes, including the block signature.
    pub size: usize,
    /// Height declared by the coinbase (BIP34), if any.
    pub height: Option<u32>,
    pub txs: Vec<Tx>,
}

/// Serializes amounts as decimal strings, they do not fit into JSON numbers.
mod big_int_string {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
