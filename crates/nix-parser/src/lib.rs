//! Transaction parsing for the NIX chain.
//!
//! [`TxParser`] turns wire encoded blocks and transactions, or the node's JSON
//! representation, into the records consumed by the indexer. Outputs are
//! classified with a [`ScriptClassifier`](nix_script::ScriptClassifier), zerocoin
//! spend inputs get their value from the spend payload.

mod descriptor;
mod error;
mod json;
mod packed;
mod parser;
mod types;


pub use self::descriptor::{AddressDescriptor, address_to_descriptor, descriptor_to_addresses};
pub use self::error::{Error, Result};
pub use self::json::{AMOUNT_DECIMAL_POINT, amount_to_big_int};
pub use self::packed::{MAX_VARINT_LEN, MIN_PACKED_LEN, VarInt, pack, unpack};
pub use self::parser::TxParser;
pub use self::types::{Block, Tx, Vin, Vout};
