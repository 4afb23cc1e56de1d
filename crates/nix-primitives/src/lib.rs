//! Primitives shared by the NIX parser crates.
//!
//! NIX is a proof-of-stake Bitcoin fork with zerocoin and confidential (RingCT)
//! outputs. Outputs that carry no conventional address are represented by a
//! single sentinel byte in place of the script, paired with a reserved
//! human-readable label.

mod address;
mod network;

pub use self::address::{AddressCodec, AddressError, Base58CheckCodec, Bech32Codec};
pub use self::network::{
    Network, NetworkError, NetworkParams, Registration, chain_params, init_networks,
    is_registered, register, registered,
};

/// Number of satoshis in one coin.
pub const COIN: u64 = 100_000_000;

/// Opcodes specific to the NIX script language.
pub mod opcodes {
    /// Burns coins into the zerocoin accumulator.
    pub const OP_ZEROCOINMINT: u8 = 0xc1;
    /// Redeems coins from the zerocoin accumulator.
    pub const OP_ZEROCOINSPEND: u8 = 0xc2;
    /// Opens a coinstake contract (lease proof-of-stake).
    pub const OP_ISCOINSTAKE: u8 = 0xb8;
}

/// Dummy internal addresses, stored as one-byte scripts.
pub mod sentinel {
    pub const STAKE: u8 = 0xf7;
    pub const RINGCT: u8 = 0xf8;
    pub const CTDATA: u8 = 0xf9;
    pub const COINBASE: u8 = 0xfa;
}

/// Reserved pseudo-address labels.
pub mod label {
    pub const STAKE: &str = "Proof of Stake TX";
    pub const COINBASE: &str = "CoinBase TX";
    pub const ZEROCOIN_MINT: &str = "Zerocoin Mint";
    pub const ZEROCOIN_SPEND: &str = "Zerocoin Spend";
    pub const RINGCT: &str = "RingCT";
    pub const CTDATA: &str = "Rangeproof";
}

/// Labels backed by a sentinel byte. Each label maps to exactly one sentinel.
pub const SENTINEL_LABELS: [(&str, u8); 4] = [
    (label::COINBASE, sentinel::COINBASE),
    (label::STAKE, sentinel::STAKE),
    (label::RINGCT, sentinel::RINGCT),
    (label::CTDATA, sentinel::CTDATA),
];

/// Returns the sentinel byte reserved for `label`, if any.
pub fn sentinel_for_label(label: &str) -> Option<u8> {
    SENTINEL_LABELS
        .iter()
        .find_map(|(l, sentinel)| (*l == label).then_some(*sentinel))
}
