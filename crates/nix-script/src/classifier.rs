//! Output script classification.
//!
//! NIX outputs may carry scripts that no Bitcoin decoder understands: zerocoin
//! mints and spends, lease proof-of-stake contracts and the one-byte sentinels
//! the node reports for stake, coinbase and confidential outputs. [`RULES`]
//! recognizes these in a fixed order, the first match wins. Anything left over
//! goes through the standard decoder.

use crate::standard::{standard_script_to_addresses, try_parse_op_return};
use crate::solver::TxoutType;
use bitcoin::Script;
use bitcoin::opcodes::all::{OP_HASH160, OP_PUSHBYTES_0};
use nix_primitives::opcodes::{OP_ISCOINSTAKE, OP_ZEROCOINMINT};
use nix_primitives::{NetworkParams, label, sentinel};
use std::sync::Arc;

/// Minimum length of a zerocoin spend script.
pub const ZEROCOIN_SPEND_MIN_LEN: usize = 100;

/// Name reported for scripts handled by the standard decoder.
pub const STANDARD_RULE: &str = "standard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Standard,
    Coinbase,
    ProofOfStake,
    ZerocoinMint,
    ZerocoinSpend,
    #[serde(rename = "ringct")]
    RingCT,
    ConfidentialData,
    LeaseProofOfStake,
    OpReturn,
    Empty,
}

/// Result of classifying a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ScriptKind,
    /// Decoded addresses, or a single pseudo-address label.
    pub addresses: Vec<String>,
    /// Whether the output is indexed by address.
    pub searchable: bool,
}

impl Classification {
    fn label(kind: ScriptKind, label: &str) -> Self {
        Self {
            kind,
            addresses: vec![label.to_string()],
            searchable: false,
        }
    }
}

/// A named classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&[u8], &NetworkParams) -> Option<Classification>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Chain specific rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "empty",
        apply: empty,
    },
    Rule {
        name: "zerocoin_spend",
        apply: zerocoin_spend,
    },
    Rule {
        name: "zerocoin_mint",
        apply: zerocoin_mint,
    },
    Rule {
        name: "coinbase",
        apply: coinbase,
    },
    Rule {
        name: "proof_of_stake",
        apply: proof_of_stake,
    },
    Rule {
        name: "confidential_data",
        apply: confidential_data,
    },
    Rule {
        name: "ringct",
        apply: ringct,
    },
    Rule {
        name: "lease_proof_of_stake",
        apply: lease_proof_of_stake,
    },
    Rule {
        name: "lease_proof_of_stake_witness",
        apply: lease_proof_of_stake_witness,
    },
];

fn empty(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    script.is_empty().then(|| Classification {
        kind: ScriptKind::Empty,
        addresses: Vec::new(),
        searchable: false,
    })
}

fn zerocoin_spend(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    crate::is_zerocoin_spend_script(script)
        .then(|| Classification::label(ScriptKind::ZerocoinSpend, label::ZEROCOIN_SPEND))
}

fn zerocoin_mint(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    (script.len() > 1 && script[0] == OP_ZEROCOINMINT)
        .then(|| Classification::label(ScriptKind::ZerocoinMint, label::ZEROCOIN_MINT))
}

fn sentinel_rule(script: &[u8], sentinel: u8, kind: ScriptKind, label: &str) -> Option<Classification> {
    matches!(script, [byte] if *byte == sentinel).then(|| Classification::label(kind, label))
}

fn coinbase(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    sentinel_rule(script, sentinel::COINBASE, ScriptKind::Coinbase, label::COINBASE)
}

fn proof_of_stake(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    sentinel_rule(script, sentinel::STAKE, ScriptKind::ProofOfStake, label::STAKE)
}

fn confidential_data(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    sentinel_rule(
        script,
        sentinel::CTDATA,
        ScriptKind::ConfidentialData,
        label::CTDATA,
    )
}

fn ringct(script: &[u8], _: &NetworkParams) -> Option<Classification> {
    sentinel_rule(script, sentinel::RINGCT, ScriptKind::RingCT, label::RINGCT)
}

/// Coinstake contract whose third byte is `OP_HASH160`, the wrapped script is at `[26, 50)`.
fn lease_proof_of_stake(script: &[u8], params: &NetworkParams) -> Option<Classification> {
    lease_contract(script, params, OP_HASH160.to_u8(), 26, 24)
}

/// Coinstake contract whose third byte is `OP_0`, the wrapped script is at `[25, 48)`.
fn lease_proof_of_stake_witness(script: &[u8], params: &NetworkParams) -> Option<Classification> {
    lease_contract(script, params, OP_PUSHBYTES_0.to_u8(), 25, 23)
}

fn lease_contract(
    script: &[u8],
    params: &NetworkParams,
    third_byte: u8,
    offset: usize,
    len: usize,
) -> Option<Classification> {
    if script.first() != Some(&OP_ISCOINSTAKE) || script.get(2) != Some(&third_byte) {
        return None;
    }

    let wrapped = script.get(offset..offset + len)?;
    let (addresses, txout_type) = standard_script_to_addresses(Script::from_bytes(wrapped), params);

    Some(Classification {
        kind: ScriptKind::LeaseProofOfStake,
        addresses,
        searchable: txout_type.is_searchable(),
    })
}

/// Classifies the script with the standard decoder only.
///
/// Outputs without any address fall back to the `OP_RETURN` text, reported as a
/// single non-searchable address.
pub fn standard_classification(script: &[u8], params: &NetworkParams) -> Classification {
    let (mut addresses, txout_type) = standard_script_to_addresses(Script::from_bytes(script), params);

    let searchable = txout_type.is_searchable();
    if !searchable && addresses.is_empty() {
        let op_return = try_parse_op_return(script);
        if !op_return.is_empty() {
            addresses.push(op_return);
        }
    }

    let kind = match txout_type {
        TxoutType::NullData => ScriptKind::OpReturn,
        _ => ScriptKind::Standard,
    };

    Classification {
        kind,
        addresses,
        searchable,
    }
}

/// Runs [`RULES`] then the standard decoder, returning the name of the matching rule.
pub fn classify_with_rule(script: &[u8], params: &NetworkParams) -> (&'static str, Classification) {
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(script, params).map(|classification| (rule.name, classification)))
        .unwrap_or_else(|| (STANDARD_RULE, standard_classification(script, params)))
}

/// Classifies an output script with the NIX rules.
pub fn classify(script: &[u8], params: &NetworkParams) -> Classification {
    classify_with_rule(script, params).1
}

/// Diagnostic event describing a single classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyEvent {
    pub rule: &'static str,
    pub kind: ScriptKind,
    pub script_len: usize,
}

/// Receives a [`ClassifyEvent`] for every classified script.
pub trait ClassifyObserver: Send + Sync {
    fn on_classify(&self, event: &ClassifyEvent);
}

/// Forwards classification events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ClassifyObserver for TracingObserver {
    fn on_classify(&self, event: &ClassifyEvent) {
        tracing::trace!(
            rule = event.rule,
            kind = ?event.kind,
            script_len = event.script_len,
            "Classified script"
        );
    }
}

/// Maps an output script to its kind and addresses.
pub trait ScriptClassifier: Send + Sync {
    fn params(&self) -> &NetworkParams;

    fn classify(&self, script: &[u8]) -> Classification;
}

/// Classifier applying the NIX rules before the standard decoder.
#[derive(Clone)]
pub struct NixScriptClassifier {
    params: NetworkParams,
    observer: Option<Arc<dyn ClassifyObserver>>,
}

impl NixScriptClassifier {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ClassifyObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl std::fmt::Debug for NixScriptClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NixScriptClassifier")
            .field("params", &self.params)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ScriptClassifier for NixScriptClassifier {
    fn params(&self) -> &NetworkParams {
        &self.params
    }

    fn classify(&self, script: &[u8]) -> Classification {
        let (rule, classification) = classify_with_rule(script, &self.params);

        if let Some(observer) = &self.observer {
            observer.on_classify(&ClassifyEvent {
                rule,
                kind: classification.kind,
                script_len: script.len(),
            });
        }

        classification
    }
}

/// Classifier that only knows the script types shared with Bitcoin.
#[derive(Debug, Clone, Copy)]
pub struct StandardScriptClassifier {
    params: NetworkParams,
}

impl StandardScriptClassifier {
    pub fn new(params: NetworkParams) -> Self {
        Self { params }
    }
}

impl ScriptClassifier for StandardScriptClassifier {
    fn params(&self) -> &NetworkParams {
        &self.params
    }

    fn classify(&self, script: &[u8]) -> Classification {
        standard_classification(script, &self.params)
    }
}
