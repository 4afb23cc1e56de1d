//! Storage record of a transaction.
//!
//! Layout: `[height: u32 BE][block_time: zig-zag varint][raw transaction]`.

use std::io::{self, Write};

/// Maximum length of an encoded 64 bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Signed LEB128 varint with zig-zag encoding.
pub struct VarInt(pub i64);

impl From<i64> for VarInt {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl VarInt {
    pub fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut value = ((self.0 << 1) ^ (self.0 >> 63)) as u64;
        while value >= 0x80 {
            writer.write_all(&[((value & 0x7F) | 0x80) as u8])?;
            value >>= 7;
        }
        writer.write_all(&[value as u8])?;
        Ok(())
    }

    /// Decodes a varint from the front of `bytes`, returning it with the number of bytes read.
    ///
    /// Returns `None` if the input ends before the last byte or the value overflows 64 bits.
    pub fn deserialize(bytes: &[u8]) -> Option<(Self, usize)> {
        let mut value = 0u64;
        for (i, byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
            if i == MAX_VARINT_LEN - 1 && *byte > 1 {
                return None;
            }
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                let decoded = ((value >> 1) as i64) ^ -((value & 1) as i64);
                return Some((Self(decoded), i + 1));
            }
        }
        None
    }
}

/// Minimum record size, the height and a one byte varint.
pub const MIN_PACKED_LEN: usize = 5;

/// Prepends the record header to the raw transaction.
pub fn pack(raw_tx: &[u8], height: u32, block_time: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + MAX_VARINT_LEN + raw_tx.len());
    buf.extend_from_slice(&height.to_be_bytes());
    VarInt(block_time)
        .serialize(&mut buf)
        .expect("Writing to Vec never fails; qed");
    buf.extend_from_slice(raw_tx);
    buf
}

/// Splits a record into `(height, block_time, raw transaction)`.
pub fn unpack(buf: &[u8]) -> Option<(u32, i64, &[u8])> {
    if buf.len() < MIN_PACKED_LEN {
        return None;
    }
    let (height, rest) = buf.split_at(4);
    let height = u32::from_be_bytes(height.try_into().ok()?);
    let (VarInt(block_time), len) = VarInt::deserialize(rest)?;
    Some((height, block_time, &rest[len..]))
}
