//! Address encoding with the NIX network parameters.
//!
//! `bitcoin::Address` only knows about the Bitcoin networks, the codecs here take
//! the version bytes and the human-readable part from [`NetworkParams`] instead.

use crate::network::NetworkParams;
use bitcoin::bech32::{Hrp, segwit};
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::{PubkeyHash, Script, ScriptBuf, ScriptHash, WitnessProgram, WitnessVersion, base58};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Script has no address form")]
    UnsupportedScript,
}

type Result<T> = std::result::Result<T, AddressError>;

/// Trait for address encoding and decoding.
pub trait AddressCodec {
    /// Encodes the output script as an address.
    fn encode(&self, script: &Script) -> Result<String>;

    /// Decodes the address into its output script.
    fn decode(&self, address: &str) -> Result<ScriptBuf>;
}

/// Base58check codec for P2PKH and P2SH addresses.
#[derive(Debug, Clone, Copy)]
pub struct Base58CheckCodec {
    pubkey_hash_version: u8,
    script_hash_version: u8,
}

impl Base58CheckCodec {
    pub const fn new(pubkey_hash_version: u8, script_hash_version: u8) -> Self {
        Self {
            pubkey_hash_version,
            script_hash_version,
        }
    }

    pub fn encode_pubkey_hash(&self, hash: &[u8; 20]) -> String {
        encode_versioned(self.pubkey_hash_version, hash)
    }

    pub fn encode_script_hash(&self, hash: &[u8; 20]) -> String {
        encode_versioned(self.script_hash_version, hash)
    }
}

fn encode_versioned(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    base58::encode_check(&payload)
}

fn hash160_at(bytes: &[u8], start: usize) -> Result<[u8; 20]> {
    bytes
        .get(start..start + 20)
        .and_then(|hash| hash.try_into().ok())
        .ok_or(AddressError::UnsupportedScript)
}

impl AddressCodec for Base58CheckCodec {
    fn encode(&self, script: &Script) -> Result<String> {
        let bytes = script.as_bytes();
        if script.is_p2pkh() {
            Ok(self.encode_pubkey_hash(&hash160_at(bytes, 3)?))
        } else if script.is_p2sh() {
            Ok(self.encode_script_hash(&hash160_at(bytes, 2)?))
        } else {
            Err(AddressError::UnsupportedScript)
        }
    }

    fn decode(&self, address: &str) -> Result<ScriptBuf> {
        let payload = base58::decode_check(address)
            .map_err(|err| AddressError::InvalidAddress(format!("{address}: {err}")))?;

        let Some((&version, hash)) = payload.split_first() else {
            return Err(AddressError::InvalidAddress(address.to_string()));
        };

        let hash: [u8; 20] = hash.try_into().map_err(|_| {
            AddressError::InvalidAddress(format!("{address}: unexpected payload length"))
        })?;

        if version == self.pubkey_hash_version {
            Ok(ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)))
        } else if version == self.script_hash_version {
            Ok(ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)))
        } else {
            Err(AddressError::InvalidAddress(format!(
                "{address}: unknown version byte {version}"
            )))
        }
    }
}

/// Bech32/bech32m codec for witness programs.
#[derive(Debug, Clone, Copy)]
pub struct Bech32Codec {
    hrp: &'static str,
}

impl Bech32Codec {
    pub const fn new(hrp: &'static str) -> Self {
        Self { hrp }
    }

    fn hrp(&self) -> Result<Hrp> {
        Hrp::parse(self.hrp).map_err(|err| AddressError::InvalidAddress(err.to_string()))
    }

    /// Encodes a witness program, bech32 for version 0 and bech32m above.
    pub fn encode_program(&self, version: WitnessVersion, program: &[u8]) -> Result<String> {
        segwit::encode(self.hrp()?, version.to_fe(), program)
            .map_err(|err| AddressError::InvalidAddress(err.to_string()))
    }
}

impl AddressCodec for Bech32Codec {
    fn encode(&self, script: &Script) -> Result<String> {
        let version = script
            .witness_version()
            .ok_or(AddressError::UnsupportedScript)?;
        self.encode_program(version, &script.as_bytes()[2..])
    }

    fn decode(&self, address: &str) -> Result<ScriptBuf> {
        let (hrp, version, program) = segwit::decode(address)
            .map_err(|err| AddressError::InvalidAddress(format!("{address}: {err}")))?;

        if hrp != self.hrp()? {
            return Err(AddressError::InvalidAddress(format!(
                "{address}: unexpected prefix {hrp}"
            )));
        }

        let version = WitnessVersion::try_from(version)
            .map_err(|err| AddressError::InvalidAddress(format!("{address}: {err}")))?;
        let program = PushBytesBuf::try_from(program)
            .map_err(|err| AddressError::InvalidAddress(format!("{address}: {err}")))?;
        let program = WitnessProgram::new(version, program.as_bytes())
            .map_err(|err| AddressError::InvalidAddress(format!("{address}: {err}")))?;

        Ok(ScriptBuf::new_witness_program(&program))
    }
}

impl NetworkParams {
    /// Encodes a standard pay-to script as an address of this network.
    pub fn script_to_address(&self, script: &Script) -> Result<String> {
        if script.witness_version().is_some() {
            self.bech32().encode(script)
        } else {
            self.base58().encode(script)
        }
    }

    /// Decodes an address of this network into its pay-to script.
    pub fn address_to_script(&self, address: &str) -> Result<ScriptBuf> {
        self.base58()
            .decode(address)
            .or_else(|_| self.bech32().decode(address))
            .map_err(|_| AddressError::InvalidAddress(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::WScriptHash;
    use hex_literal::hex;

    const HASH: [u8; 20] = hex!("70dcef2a22575d7a8f0779fb1d6cdd48135bd227");

    #[test]
    fn base58_roundtrip() {
        let params = NetworkParams::MAINNET;
        let script = ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(HASH));

        let address = params.script_to_address(&script).unwrap();
        assert_eq!(params.address_to_script(&address).unwrap(), script);

        let script = ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(HASH));
        let address = params.script_to_address(&script).unwrap();
        assert_eq!(params.address_to_script(&address).unwrap(), script);
    }

    #[test]
    fn known_addresses() {
        let p2pkh = ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(HASH));
        let p2sh = ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(HASH));
        let p2wpkh = ScriptBuf::new_p2wpkh(&bitcoin::WPubkeyHash::from_byte_array(HASH));

        let cases = [
            (NetworkParams::MAINNET, &p2pkh, "GU8gmPh2mdvEnfjXEmSSzBDVKgrJgMxpcL"),
            (NetworkParams::MAINNET, &p2sh, "NWCjY2AMRLsP4Appc4SEG4JHmFiTJUikaF"),
            (NetworkParams::MAINNET, &p2wpkh, "nix1qwrww723z2awh4rc808a36mxafqf4h5387fh0dn"),
            (NetworkParams::TESTNET, &p2pkh, "adNLNfNVxmpXdaKLF7f3Y9P32KQNtpXZc"),
            (NetworkParams::TESTNET, &p2sh, "2PJaJbFwvKhaAVrVP5nJ1ngxJ2qHoVxJD9"),
            (NetworkParams::TESTNET, &p2wpkh, "tnix1qwrww723z2awh4rc808a36mxafqf4h538fm5x7e"),
        ];

        for (params, script, address) in cases {
            assert_eq!(params.script_to_address(script).unwrap(), address);
            assert_eq!(&params.address_to_script(address).unwrap(), script);
        }
    }

    #[test]
    fn version_bytes_are_network_specific() {
        let script = ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(HASH));
        let testnet_address = NetworkParams::TESTNET.script_to_address(&script).unwrap();

        assert_ne!(
            testnet_address,
            NetworkParams::MAINNET.script_to_address(&script).unwrap()
        );
        assert!(matches!(
            NetworkParams::MAINNET.address_to_script(&testnet_address),
            Err(AddressError::InvalidAddress(_))
        ));
    }

    #[test]
    fn bech32_uses_network_prefix() {
        let script = ScriptBuf::new_p2wpkh(&bitcoin::WPubkeyHash::from_byte_array(HASH));

        let address = NetworkParams::MAINNET.script_to_address(&script).unwrap();
        assert!(address.starts_with("nix1q"));
        assert_eq!(
            NetworkParams::MAINNET.address_to_script(&address).unwrap(),
            script
        );

        let address = NetworkParams::TESTNET.script_to_address(&script).unwrap();
        assert!(address.starts_with("tnix1q"));
        assert!(NetworkParams::MAINNET.address_to_script(&address).is_err());

        let script = ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array([7u8; 32]));
        let address = NetworkParams::MAINNET.script_to_address(&script).unwrap();
        assert_eq!(
            NetworkParams::MAINNET.address_to_script(&address).unwrap(),
            script
        );
    }

    #[test]
    fn non_address_scripts_are_rejected() {
        let op_return = ScriptBuf::from_bytes(hex!("6a0401020304").to_vec());
        assert_eq!(
            NetworkParams::MAINNET.script_to_address(&op_return),
            Err(AddressError::UnsupportedScript)
        );
        assert!(NetworkParams::MAINNET.address_to_script("not an address").is_err());
        assert!(NetworkParams::MAINNET.address_to_script("").is_err());
    }
}
