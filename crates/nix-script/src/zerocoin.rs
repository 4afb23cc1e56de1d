//! Zerocoin spend payload decoding.
//!
//! The signature script of a zerocoin spend input is laid out as:
//!
//! ```text
//! OP_ZEROCOINSPEND
//! coin_spend_size: u8, coin_spend: [u8; coin_spend_size]
//! version: u8, spend_type: u8
//! pubkey_len: u8, pubkey: [u8; pubkey_len]
//! sig_len: u8, sig: [u8; sig_len]
//! denomination: u32 (little endian, whole coins)
//! ```
//!
//! None of the skipped content is validated.

use crate::error::Error;
use bitcoin::Amount;
use nix_primitives::COIN;

/// Fields of a zerocoin spend payload that are not skipped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZerocoinSpendPayload {
    pub coin_spend_size: u8,
    pub pubkey_len: u8,
    pub sig_len: u8,
    /// Spent coin denomination in whole coins.
    pub denomination: u32,
}

impl ZerocoinSpendPayload {
    /// Value of the spent coin.
    pub fn value(&self) -> Amount {
        Amount::from_sat(u64::from(self.denomination) * COIN)
    }
}

struct PayloadReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PayloadReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
        let data = self.data;
        let start = self.position;
        let bytes = start
            .checked_add(n)
            .and_then(|end| data.get(start..end))
            .ok_or(Error::TruncatedPayload { field })?;
        self.position = start + n;
        Ok(bytes)
    }

    fn skip_bytes(&mut self, n: usize, field: &'static str) -> Result<(), Error> {
        self.read_bytes(n, field).map(|_| ())
    }

    fn read_u8(&mut self, field: &'static str) -> Result<u8, Error> {
        Ok(self.read_bytes(1, field)?[0])
    }

    fn read_u32_le(&mut self, field: &'static str) -> Result<u32, Error> {
        let bytes = self.read_bytes(4, field)?;
        Ok(u32::from_le_bytes(
            bytes.try_into().expect("Exactly 4 bytes were read; qed"),
        ))
    }
}

/// Walks the zerocoin spend signature script and returns the decoded fields.
pub fn decode_spend_payload(signature_script: &[u8]) -> Result<ZerocoinSpendPayload, Error> {
    let mut reader = PayloadReader::new(signature_script);

    reader.skip_bytes(1, "opcode")?;
    let coin_spend_size = reader.read_u8("coin_spend_size")?;
    reader.skip_bytes(usize::from(coin_spend_size), "coin_spend")?;
    reader.skip_bytes(2, "version and spend_type")?;
    let pubkey_len = reader.read_u8("pubkey_len")?;
    reader.skip_bytes(usize::from(pubkey_len), "pubkey")?;
    let sig_len = reader.read_u8("sig_len")?;
    reader.skip_bytes(usize::from(sig_len), "sig")?;
    let denomination = reader.read_u32_le("denomination")?;

    Ok(ZerocoinSpendPayload {
        coin_spend_size,
        pubkey_len,
        sig_len,
        denomination,
    })
}

/// Decodes the value of the coin redeemed by a zerocoin spend signature script.
pub fn decode_spend_value(signature_script: &[u8]) -> Result<Amount, Error> {
    decode_spend_payload(signature_script).map(|payload| payload.value())
}
