use crate::descriptor::{self, AddressDescriptor};
use crate::error::{Error, Result};
use crate::packed;
use crate::types::{Block, Tx, Vin, Vout};
use bitcoin::consensus::{deserialize, deserialize_partial, serialize};
use bitcoin::{Transaction, TxIn, TxOut, Txid};
use nix_primitives::{Network, NetworkParams, label};
use nix_script::{
    NixScriptClassifier, ScriptClassifier, decode_spend_value, is_zerocoin_spend_input,
    is_zerocoin_spend_script,
};
use num_bigint::BigInt;
use num_traits::Zero;
use rayon::prelude::*;

/// Descriptor of an input whose previous output is unknown and has no script.
const UNKNOWN_INPUT_DESCRIPTOR: [u8; 10] = [0u8; 10];

/// Builds transaction records from wire encoded NIX transactions.
#[derive(Debug, Clone)]
pub struct TxParser<C = NixScriptClassifier> {
    classifier: C,
}

impl TxParser<NixScriptClassifier> {
    /// Creates a parser for the chain name reported by the node.
    ///
    /// The builtin networks are registered on first use.
    pub fn new(chain: &str) -> Result<Self> {
        let params = nix_primitives::chain_params(chain)?;
        Ok(Self::with_classifier(NixScriptClassifier::new(params)))
    }

    /// Creates a parser for a registered network.
    pub fn for_network(network: Network) -> Result<Self> {
        nix_primitives::init_networks()?;
        let params = nix_primitives::registered(network)?;
        Ok(Self::with_classifier(NixScriptClassifier::new(params)))
    }
}

impl<C: ScriptClassifier> TxParser<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn params(&self) -> &NetworkParams {
        self.classifier.params()
    }

    /// Decodes a raw transaction.
    pub fn parse_tx(&self, raw: &[u8]) -> Result<Tx> {
        let tx: Transaction = deserialize(raw)?;
        Ok(self.tx_from_msg_tx(&tx, raw, 0))
    }

    /// Decodes a hex encoded raw transaction.
    pub fn parse_tx_hex(&self, tx_hex: &str) -> Result<Tx> {
        self.parse_tx(&hex::decode(tx_hex.trim())?)
    }

    /// Decodes a raw block.
    ///
    /// Proof-of-stake blocks carry a block signature after the transactions, it is ignored.
    pub fn parse_block(&self, raw: &[u8]) -> Result<Block> {
        let (block, consumed): (bitcoin::Block, usize) = deserialize_partial(raw)?;

        if consumed < raw.len() {
            tracing::trace!(
                block_hash = %block.block_hash(),
                trailing = raw.len() - consumed,
                "Ignoring trailing block bytes"
            );
        }

        let block_time = i64::from(block.header.time);
        let txs = block
            .txdata
            .par_iter()
            .map(|tx| {
                let mut tx = self.tx_from_msg_tx(tx, &serialize(tx), block_time);
                tx.time = block_time;
                tx
            })
            .collect();

        Ok(Block {
            hash: block.block_hash(),
            prev_hash: block.header.prev_blockhash,
            time: block.header.time,
            size: raw.len(),
            height: block
                .bip34_block_height()
                .ok()
                .and_then(|height| u32::try_from(height).ok()),
            txs,
        })
    }

    /// Assembles the record of a decoded transaction.
    pub fn tx_from_msg_tx(&self, tx: &Transaction, raw: &[u8], block_time: i64) -> Tx {
        let txid = tx.compute_txid();

        let vin = if is_coinbase(tx) {
            tx.input
                .first()
                .map(|input| Vin::Coinbase {
                    coinbase: hex::encode(input.script_sig.as_bytes()),
                    sequence: input.sequence.0,
                })
                .into_iter()
                .collect()
        } else {
            tx.input
                .iter()
                .enumerate()
                .map(|(index, input)| input_record(txid, index, input))
                .collect()
        };

        let vout = tx
            .output
            .iter()
            .enumerate()
            .map(|(n, output)| self.output_record(n as u32, output))
            .collect();

        Tx {
            txid,
            version: tx.version.0,
            lock_time: tx.lock_time.to_consensus_u32(),
            hex: hex::encode(raw),
            vin,
            vout,
            block_time,
            time: 0,
            confirmations: 0,
        }
    }

    fn output_record(&self, n: u32, output: &TxOut) -> Vout {
        let script = output.script_pubkey.as_bytes();
        let mut classification = self.classifier.classify(script);

        if script.is_empty() {
            classification.addresses = vec![label::STAKE.to_string()];
        }

        Vout {
            value_sat: BigInt::from(output.value.to_sat()),
            n,
            script_hex: hex::encode(script),
            addresses: classification.addresses,
            searchable: classification.searchable,
            kind: classification.kind,
        }
    }

    /// Converts an address or a reserved label into its descriptor.
    pub fn address_to_descriptor(&self, address: &str) -> Result<AddressDescriptor> {
        descriptor::address_to_descriptor(address, self.params())
    }

    /// Returns the addresses a descriptor stands for and whether they are searchable.
    pub fn descriptor_to_addresses(&self, descriptor: &AddressDescriptor) -> (Vec<String>, bool) {
        descriptor::descriptor_to_addresses(descriptor, &self.classifier)
    }

    /// Descriptor of an input whose previous output is not known, its signature script.
    ///
    /// Falls back to ten zero bytes for coinbase inputs, missing inputs and empty scripts.
    pub fn unknown_input_descriptor(&self, tx: &Tx, input: usize) -> AddressDescriptor {
        tx.vin
            .get(input)
            .and_then(Vin::script_sig)
            .filter(|script_sig| !script_sig.is_empty())
            .and_then(|script_sig| hex::decode(script_sig).ok())
            .map(AddressDescriptor::new)
            .unwrap_or_else(|| AddressDescriptor::new(UNKNOWN_INPUT_DESCRIPTOR.to_vec()))
    }

    /// Value of an input whose previous output is not known.
    ///
    /// Only zerocoin spends carry their value, anything else is worth zero.
    pub fn unknown_input_value(&self, tx: &Tx, input: usize) -> BigInt {
        let Some(script) = tx
            .vin
            .get(input)
            .and_then(Vin::script_sig)
            .and_then(|script_sig| hex::decode(script_sig).ok())
            .filter(|script| is_zerocoin_spend_script(script))
        else {
            return BigInt::zero();
        };

        match decode_spend_value(&script) {
            Ok(value) => BigInt::from(value.to_sat()),
            Err(err) => {
                tracing::warn!(txid = %tx.txid, input, ?err, "Failed to decode zerocoin spend value");
                BigInt::zero()
            }
        }
    }

    /// Packs the transaction with its height and block time for storage.
    pub fn pack_tx(&self, tx: &Tx, height: u32, block_time: i64) -> Result<Vec<u8>> {
        let raw = hex::decode(&tx.hex)?;
        Ok(packed::pack(&raw, height, block_time))
    }

    /// Unpacks a stored transaction, returning it with its height.
    pub fn unpack_tx(&self, buf: &[u8]) -> Result<(Tx, u32)> {
        let (height, block_time, raw) =
            packed::unpack(buf).ok_or(Error::TruncatedRecord { len: buf.len() })?;
        let mut tx = self.parse_tx(raw)?;
        tx.block_time = block_time;
        Ok((tx, height))
    }
}

/// A lone input without previous output is a coinbase, unless it redeems a zerocoin.
fn is_coinbase(tx: &Transaction) -> bool {
    tx.is_coinbase()
        && !tx
            .input
            .first()
            .is_some_and(|input| is_zerocoin_spend_input(input.script_sig.as_bytes()))
}

fn input_record(txid: Txid, index: usize, input: &TxIn) -> Vin {
    let script_sig = input.script_sig.as_bytes();
    let sequence = input.sequence.0;

    if is_zerocoin_spend_input(script_sig) {
        let value_sat = match decode_spend_value(script_sig) {
            Ok(value) => BigInt::from(value.to_sat()),
            Err(err) => {
                tracing::warn!(%txid, input = index, ?err, "Failed to decode zerocoin spend value");
                BigInt::zero()
            }
        };
        return Vin::ZerocoinSpend {
            script_sig: hex::encode(script_sig),
            sequence,
            value_sat,
        };
    }

    Vin::Standard {
        txid: input.previous_output.txid,
        vout: input.previous_output.vout,
        script_sig: hex::encode(script_sig),
        sequence,
    }
}
