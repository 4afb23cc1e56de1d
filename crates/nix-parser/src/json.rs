//! Transactions in the verbose `getrawtransaction` format of the node.

use crate::error::{Error, Result};
use crate::parser::TxParser;
use crate::types::{Tx, Vin, Vout};
use bitcoin::Txid;
use nix_primitives::sentinel;
use nix_script::{ScriptClassifier, decode_spend_value, is_zerocoin_spend_input};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::Deserialize;
use std::str::FromStr;

/// Number of decimal places of a coin amount.
pub const AMOUNT_DECIMAL_POINT: usize = 8;

#[derive(Debug, Deserialize)]
struct RpcTx {
    #[serde(default)]
    hex: String,
    txid: String,
    #[serde(default)]
    version: i32,
    #[serde(default)]
    locktime: u32,
    #[serde(default)]
    vin: Vec<RpcVin>,
    #[serde(default)]
    vout: Vec<RpcVout>,
    #[serde(default)]
    confirmations: u32,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    blocktime: i64,
}

#[derive(Debug, Deserialize)]
struct RpcVin {
    coinbase: Option<String>,
    txid: Option<String>,
    #[serde(default)]
    vout: u32,
    #[serde(rename = "scriptSig")]
    script_sig: Option<RpcScript>,
    #[serde(default)]
    sequence: u32,
}

#[derive(Debug, Deserialize)]
struct RpcVout {
    value: serde_json::Number,
    /// Output type reported for outputs without a script.
    #[serde(rename = "type", default)]
    output_type: String,
    #[serde(rename = "scriptPubKey", default)]
    script_pub_key: RpcScript,
}

#[derive(Debug, Default, Deserialize)]
struct RpcScript {
    #[serde(default)]
    hex: String,
    addresses: Option<Vec<String>>,
}

/// Sentinel script standing in for an output without script, by reported output type.
fn sentinel_script_hex(output_type: &str) -> Option<String> {
    let sentinel = match output_type {
        "ringct" => sentinel::RINGCT,
        "data" => sentinel::CTDATA,
        "coinbase" => sentinel::COINBASE,
        "standard" => sentinel::STAKE,
        _ => return None,
    };
    Some(hex::encode([sentinel]))
}

/// Converts a decimal coin amount into satoshis without going through floats.
///
/// Digits past the eighth decimal place must be zero.
pub fn amount_to_big_int(amount: &str) -> Result<BigInt> {
    let invalid = || Error::InvalidAmount(amount.to_string());

    let (negative, digits) = match amount.trim().strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, amount.trim()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let (fraction, excess) = fraction.split_at(fraction.len().min(AMOUNT_DECIMAL_POINT));
    if excess.bytes().any(|b| b != b'0') {
        return Err(invalid());
    }

    let mut satoshis = String::with_capacity(integer.len() + AMOUNT_DECIMAL_POINT);
    satoshis.push_str(integer);
    satoshis.push_str(fraction);
    satoshis.extend(std::iter::repeat_n('0', AMOUNT_DECIMAL_POINT - fraction.len()));

    let value = BigInt::from_str(&satoshis).map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

fn parse_txid(txid: &str) -> Result<Txid> {
    Txid::from_str(txid).map_err(|_| Error::InvalidTxid(txid.to_string()))
}

impl<C: ScriptClassifier> TxParser<C> {
    /// Parses a transaction returned by `getrawtransaction <txid> 1`.
    pub fn parse_tx_from_json(&self, json: &str) -> Result<Tx> {
        let rpc_tx: RpcTx = serde_json::from_str(json)?;
        let txid = parse_txid(&rpc_tx.txid)?;

        let vin = rpc_tx
            .vin
            .into_iter()
            .enumerate()
            .map(|(index, input)| json_input(txid, index, input))
            .collect::<Result<Vec<_>>>()?;

        let vout = rpc_tx
            .vout
            .into_iter()
            .enumerate()
            .map(|(n, output)| self.json_output(n as u32, output))
            .collect::<Result<Vec<_>>>()?;

        Ok(Tx {
            txid,
            version: rpc_tx.version,
            lock_time: rpc_tx.locktime,
            hex: rpc_tx.hex,
            vin,
            vout,
            block_time: rpc_tx.blocktime,
            time: rpc_tx.time,
            confirmations: rpc_tx.confirmations,
        })
    }

    /// `n` is the position in `vout`, any `n` reported by the node is ignored.
    fn json_output(&self, n: u32, output: RpcVout) -> Result<Vout> {
        let value_sat = amount_to_big_int(&output.value.to_string())?;

        let RpcScript {
            hex: mut script_hex,
            addresses,
        } = output.script_pub_key;
        if script_hex.is_empty() {
            if let Some(sentinel_hex) = sentinel_script_hex(&output.output_type) {
                script_hex = sentinel_hex;
            }
        }

        let script = hex::decode(&script_hex)?;
        let classification = self.classifier().classify(&script);

        let addresses = if classification.addresses.is_empty() {
            addresses.unwrap_or_default()
        } else {
            classification.addresses
        };

        Ok(Vout {
            value_sat,
            n,
            script_hex,
            addresses,
            searchable: classification.searchable,
            kind: classification.kind,
        })
    }
}

fn json_input(txid: Txid, index: usize, input: RpcVin) -> Result<Vin> {
    if let Some(coinbase) = input.coinbase {
        return Ok(Vin::Coinbase {
            coinbase,
            sequence: input.sequence,
        });
    }

    let script_sig = input.script_sig.map(|script| script.hex).unwrap_or_default();
    let script = hex::decode(&script_sig)?;

    if is_zerocoin_spend_input(&script) {
        let value_sat = match decode_spend_value(&script) {
            Ok(value) => BigInt::from(value.to_sat()),
            Err(err) => {
                tracing::warn!(%txid, input = index, ?err, "Failed to decode zerocoin spend value");
                BigInt::zero()
            }
        };
        return Ok(Vin::ZerocoinSpend {
            script_sig,
            sequence: input.sequence,
            value_sat,
        });
    }

    let prev_txid = input
        .txid
        .ok_or_else(|| Error::InvalidTxid(format!("missing txid of input {index}")))?;

    Ok(Vin::Standard {
        txid: parse_txid(&prev_txid)?,
        vout: input.vout,
        script_sig,
        sequence: input.sequence,
    })
}
