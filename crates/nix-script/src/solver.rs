use bitcoin::opcodes::all::{OP_CHECKMULTISIG, OP_PUSHNUM_1, OP_PUSHNUM_16};
use bitcoin::script::Instruction;
use bitcoin::{Opcode, PublicKey, Script, WitnessVersion};

/// Transaction output types
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TxoutType {
    NonStandard,
    PubKey(PublicKey),
    PubKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
    Multisig {
        required_sigs: u8,
        keys: Vec<Vec<u8>>,
    },
    // unspendable OP_RETURN script that carries data.
    NullData,
    WitnessV0ScriptHash([u8; 32]),
    WitnessV0KeyHash([u8; 20]),
    WitnessV1Taproot([u8; 32]),
    // Only for Witness versions not already defined above.
    WitnessUnknown {
        version: WitnessVersion,
        program: Vec<u8>,
    },
}

impl TxoutType {
    /// Whether outputs of this type are indexed by address.
    ///
    /// Only the four pay-to-hash forms qualify.
    pub fn is_searchable(&self) -> bool {
        matches!(
            self,
            Self::PubKeyHash(_)
                | Self::ScriptHash(_)
                | Self::WitnessV0KeyHash(_)
                | Self::WitnessV0ScriptHash(_)
        )
    }
}

pub fn solve(script_pubkey: &Script) -> TxoutType {
    if script_pubkey.is_p2sh() {
        let hash: [u8; 20] = script_pubkey.as_bytes()[2..22]
            .try_into()
            .expect("P2SH script carries a 20 bytes hash; qed");
        return TxoutType::ScriptHash(hash);
    }

    if let Some(version) = script_pubkey.witness_version() {
        let program = &script_pubkey.as_bytes()[2..];

        match (version, <[u8; 20]>::try_from(program), <[u8; 32]>::try_from(program)) {
            (WitnessVersion::V0, Ok(key_hash), _) => {
                return TxoutType::WitnessV0KeyHash(key_hash);
            }
            (WitnessVersion::V0, _, Ok(script_hash)) => {
                return TxoutType::WitnessV0ScriptHash(script_hash);
            }
            (WitnessVersion::V1, _, Ok(output_key)) => {
                return TxoutType::WitnessV1Taproot(output_key);
            }
            _ => {}
        }

        if version != WitnessVersion::V0 {
            return TxoutType::WitnessUnknown {
                version,
                program: program.to_vec(),
            };
        }

        return TxoutType::NonStandard;
    }

    if script_pubkey.is_op_return() {
        return TxoutType::NullData;
    }

    if let Some(pubkey) = script_pubkey.p2pk_public_key() {
        return TxoutType::PubKey(pubkey);
    }

    if script_pubkey.is_p2pkh() {
        let hash: [u8; 20] = script_pubkey.as_bytes()[3..23]
            .try_into()
            .expect("P2PKH script carries a 20 bytes hash; qed");
        return TxoutType::PubKeyHash(hash);
    }

    if let Some((required_sigs, keys)) = match_multisig(script_pubkey) {
        return TxoutType::Multisig {
            required_sigs,
            keys,
        };
    }

    TxoutType::NonStandard
}

/// Checks whether a script pubkey is a bare multisig output.
///
/// In a bare multisig pubkey script the keys are not hashed, the script
/// is of the form:
///
///    `2 <pubkey1> <pubkey2> <pubkey3> 3 OP_CHECKMULTISIG`
fn match_multisig(script_pubkey: &Script) -> Option<(u8, Vec<Vec<u8>>)> {
    let mut instructions = script_pubkey.instructions();

    let required_sigs = match instructions.next()? {
        Ok(Instruction::Op(op)) => decode_pushnum(op)?,
        _ => return None,
    };

    let mut keys = Vec::new();
    let keys_count = loop {
        match instructions.next()? {
            Ok(Instruction::PushBytes(key)) if matches!(key.len(), 33 | 65) => {
                keys.push(key.as_bytes().to_vec());
            }
            Ok(Instruction::Op(op)) => break decode_pushnum(op)?,
            _ => return None,
        }
    };

    if usize::from(keys_count) != keys.len() || required_sigs > keys_count {
        return None;
    }

    match instructions.next()? {
        Ok(Instruction::Op(op)) if op == OP_CHECKMULTISIG => {}
        _ => return None,
    }

    instructions.next().is_none().then_some((required_sigs, keys))
}

fn decode_pushnum(opcode: Opcode) -> Option<u8> {
    if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&opcode.to_u8()) {
        Some(opcode.to_u8() - 0x50)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::ScriptBuf;
    use hex_literal::hex;

    fn solve_hex(script: &[u8]) -> TxoutType {
        solve(Script::from_bytes(script))
    }

    #[test]
    fn test_solve_standard_types() {
        assert_eq!(
            solve_hex(&hex!("76a91470dcef2a22575d7a8f0779fb1d6cdd48135bd22788ac")),
            TxoutType::PubKeyHash(hex!("70dcef2a22575d7a8f0779fb1d6cdd48135bd227"))
        );
        assert_eq!(
            solve_hex(&hex!("a914c247a37256e27a70d3440735d1852f1efe569d5d87")),
            TxoutType::ScriptHash(hex!("c247a37256e27a70d3440735d1852f1efe569d5d"))
        );
        assert_eq!(
            solve_hex(&hex!("001470dcef2a22575d7a8f0779fb1d6cdd48135bd227")),
            TxoutType::WitnessV0KeyHash(hex!("70dcef2a22575d7a8f0779fb1d6cdd48135bd227"))
        );
        assert_eq!(solve_hex(&hex!("6a0401020304")), TxoutType::NullData);
        assert_eq!(
            solve_hex(&hex!("51024e73")),
            TxoutType::WitnessUnknown {
                version: WitnessVersion::V1,
                program: vec![0x4e, 0x73],
            }
        );
        assert_eq!(solve_hex(&hex!("c10102")), TxoutType::NonStandard);
        assert_eq!(solve_hex(&[]), TxoutType::NonStandard);
    }

    #[test]
    fn test_solve_witness_unknown() {
        let script = hex!("5202aabb");
        assert_eq!(
            solve_hex(&script),
            TxoutType::WitnessUnknown {
                version: WitnessVersion::V2,
                program: vec![0xaa, 0xbb],
            }
        );
    }

    #[test]
    fn test_solve_multisig() {
        let key_a = hex!("0411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3");
        let key_b = hex!("03093865e1e132b33a2a5ed01c79d2edba3473826a66cb26b8311bfa42749c2190");

        let mut script = vec![0x51, 65];
        script.extend_from_slice(&key_a);
        script.push(33);
        script.extend_from_slice(&key_b);
        script.extend_from_slice(&[0x52, OP_CHECKMULTISIG.to_u8()]);

        assert_eq!(
            solve_hex(&script),
            TxoutType::Multisig {
                required_sigs: 1,
                keys: vec![key_a.to_vec(), key_b.to_vec()],
            }
        );

        // Declared key count does not match the pushed keys.
        let last = script.len() - 2;
        script[last] = 0x53;
        assert_eq!(solve_hex(&script), TxoutType::NonStandard);
    }

    #[test]
    fn test_solve_p2pk() {
        let pubkey = PublicKey::from_slice(&hex!(
            "03093865e1e132b33a2a5ed01c79d2edba3473826a66cb26b8311bfa42749c2190"
        ))
        .unwrap();
        let script = ScriptBuf::new_p2pk(&pubkey);
        assert_eq!(solve(&script), TxoutType::PubKey(pubkey));
        assert!(!solve(&script).is_searchable());
    }
}
