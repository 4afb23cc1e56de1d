//! Script handling for the NIX chain.
//!
//! The standard solver and address extraction cover the script types inherited from
//! Bitcoin. On top of these, [`classifier`] recognizes the chain specific outputs and
//! [`zerocoin`] decodes the value carried by zerocoin spend inputs.

pub mod classifier;
mod error;
mod solver;
mod standard;
pub mod zerocoin;


pub use self::classifier::{
    Classification, ClassifyEvent, ClassifyObserver, NixScriptClassifier, RULES, Rule,
    ScriptClassifier, ScriptKind, StandardScriptClassifier, TracingObserver, classify,
};
pub use self::error::Error;
pub use self::solver::{TxoutType, solve};
pub use self::standard::{standard_script_to_addresses, try_parse_op_return};
pub use self::zerocoin::{ZerocoinSpendPayload, decode_spend_payload, decode_spend_value};

/// Whether the signature script redeems a zerocoin.
///
/// Only the leading opcode is checked.
pub fn is_zerocoin_spend_input(script_sig: &[u8]) -> bool {
    script_sig.first() == Some(&nix_primitives::opcodes::OP_ZEROCOINSPEND)
}

/// Whether the script is long enough to be a complete zerocoin spend.
pub fn is_zerocoin_spend_script(script: &[u8]) -> bool {
    script.len() >= classifier::ZEROCOIN_SPEND_MIN_LEN && is_zerocoin_spend_input(script)
}
