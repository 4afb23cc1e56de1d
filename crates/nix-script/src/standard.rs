//! Address extraction for the script types shared with Bitcoin.

use crate::solver::{TxoutType, solve};
use bitcoin::hashes::Hash;
use bitcoin::opcodes::all::{OP_PUSHDATA1, OP_PUSHDATA2, OP_RETURN};
use bitcoin::{PubkeyHash, Script};
use nix_primitives::NetworkParams;

/// Decodes the addresses paid by a standard output script.
///
/// Public keys of P2PK and bare multisig outputs are reported as the P2PKH
/// address of the key hash. Scripts without an address form produce an empty
/// list, this is not an error.
pub fn standard_script_to_addresses(
    script: &Script,
    params: &NetworkParams,
) -> (Vec<String>, TxoutType) {
    let txout_type = solve(script);

    let addresses = match &txout_type {
        TxoutType::PubKey(pubkey) => vec![key_hash_address(&pubkey.pubkey_hash(), params)],
        TxoutType::Multisig { keys, .. } => keys
            .iter()
            .map(|key| key_hash_address(&PubkeyHash::hash(key), params))
            .collect(),
        TxoutType::NonStandard | TxoutType::NullData => Vec::new(),
        _ => params.script_to_address(script).into_iter().collect(),
    };

    (addresses, txout_type)
}

fn key_hash_address(hash: &PubkeyHash, params: &NetworkParams) -> String {
    params.base58().encode_pubkey_hash(&hash.to_byte_array())
}

/// Renders the payload of an `OP_RETURN` output as text.
///
/// Recognized layouts are `OP_RETURN <len> <data>`, `OP_RETURN OP_PUSHDATA1 <len> <data>`
/// and `OP_RETURN OP_PUSHDATA2 <len_lo> <len_hi> <data>`. The declared length must
/// cover the rest of the script exactly. Returns an empty string otherwise.
pub fn try_parse_op_return(script: &[u8]) -> String {
    if script.len() < 2 || script[0] != OP_RETURN.to_u8() {
        return String::new();
    }

    let (len, data) = if script[1] == OP_PUSHDATA1.to_u8() && script.len() > 2 {
        let (len, data) = (usize::from(script[2]), &script[3..]);
        if len == data.len() {
            (len, data)
        } else {
            // The 0x4c byte may be a direct push length in scripts that predate PUSHDATA1.
            (usize::from(script[1]), &script[2..])
        }
    } else if script[1] == OP_PUSHDATA2.to_u8() && script.len() > 3 {
        (
            usize::from(u16::from_le_bytes([script[2], script[3]])),
            &script[4..],
        )
    } else {
        (usize::from(script[1]), &script[2..])
    };

    if len != data.len() {
        return String::new();
    }

    match std::str::from_utf8(data) {
        Ok(text) => format!("OP_RETURN ({text})"),
        Err(_) => format!("OP_RETURN {}", hex::encode(data)),
    }
}
