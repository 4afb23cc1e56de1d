//! Address descriptors, the binary form of an address used by the indexer.
//!
//! A descriptor is the output script paying to the address. Outputs without a
//! conventional address are stored as a one-byte sentinel script instead, which
//! the classifier maps back to the reserved label.

use crate::error::{Error, Result};
use nix_primitives::{NetworkParams, SENTINEL_LABELS, sentinel_for_label};
use nix_script::ScriptClassifier;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AddressDescriptor(Vec<u8>);

impl AddressDescriptor {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Whether this is a single sentinel byte standing for a reserved label.
    pub fn is_sentinel(&self) -> bool {
        match self.0.as_slice() {
            [byte] => SENTINEL_LABELS.iter().any(|(_, sentinel)| sentinel == byte),
            _ => false,
        }
    }
}

impl From<Vec<u8>> for AddressDescriptor {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AddressDescriptor {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for AddressDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Converts an address or a reserved label into its descriptor.
pub fn address_to_descriptor(address: &str, params: &NetworkParams) -> Result<AddressDescriptor> {
    if let Some(sentinel) = sentinel_for_label(address) {
        return Ok(AddressDescriptor(vec![sentinel]));
    }

    params
        .address_to_script(address)
        .map(|script| AddressDescriptor(script.into_bytes()))
        .map_err(|_| Error::InvalidAddress(address.to_string()))
}

/// Returns the addresses a descriptor stands for and whether they are searchable.
pub fn descriptor_to_addresses<C: ScriptClassifier + ?Sized>(
    descriptor: &AddressDescriptor,
    classifier: &C,
) -> (Vec<String>, bool) {
    let classification = classifier.classify(descriptor.as_bytes());
    (classification.addresses, classification.searchable)
}
