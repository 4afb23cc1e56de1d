use crate::address::{Base58CheckCodec, Bech32Codec};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;

/// NIX networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "main",
            Self::Testnet => "test",
        }
    }

    /// Maps the chain name reported by the node (`getblockchaininfo.chain`) to a network.
    ///
    /// Anything that is not `test` is treated as mainnet, including regtest.
    pub fn from_chain_name(chain: &str) -> Self {
        match chain {
            "test" => Self::Testnet,
            _ => Self::Mainnet,
        }
    }
}

impl std::str::FromStr for Network {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(Self::Mainnet),
            "test" | "testnet" => Ok(Self::Testnet),
            other => Err(NetworkError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address encoding parameters of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    /// Network magic. Mainnet and testnet share the same value.
    pub magic: u32,
    /// Version byte of P2PKH addresses.
    pub pubkey_hash_version: u8,
    /// Version byte of P2SH addresses.
    pub script_hash_version: u8,
    /// Version byte of WIF private keys.
    pub private_key_version: u8,
    /// Human-readable part of segwit addresses.
    pub bech32_hrp: &'static str,
}

impl NetworkParams {
    pub const MAINNET: Self = Self {
        network: Network::Mainnet,
        magic: 0xa3d0cfb6,
        pubkey_hash_version: 38,
        script_hash_version: 53,
        private_key_version: 128,
        bech32_hrp: "nix",
    };

    pub const TESTNET: Self = Self {
        network: Network::Testnet,
        magic: 0xa3d0cfb6,
        pubkey_hash_version: 1,
        script_hash_version: 3,
        private_key_version: 128,
        bech32_hrp: "tnix",
    };

    /// Codec for legacy base58check addresses.
    pub const fn base58(&self) -> Base58CheckCodec {
        Base58CheckCodec::new(self.pubkey_hash_version, self.script_hash_version)
    }

    /// Codec for native segwit addresses.
    pub const fn bech32(&self) -> Bech32Codec {
        Bech32Codec::new(self.bech32_hrp)
    }
}

/// Network registry error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("network {0} is not registered")]
    NotRegistered(Network),
    #[error("network {0} is already registered with different parameters")]
    Conflict(Network),
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

/// Outcome of a successful [`register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// Identical parameters were registered before, nothing changed.
    AlreadyRegistered,
}

static REGISTRY: RwLock<BTreeMap<Network, NetworkParams>> = RwLock::new(BTreeMap::new());

/// Registers the parameters of a network for the lifetime of the process.
///
/// Registering the same parameters twice is a no-op. Registering different
/// parameters for an already registered network fails and leaves the
/// registered ones untouched.
pub fn register(params: NetworkParams) -> Result<Registration, NetworkError> {
    let mut registry = REGISTRY.write();

    match registry.get(&params.network) {
        Some(existing) if *existing == params => Ok(Registration::AlreadyRegistered),
        Some(_) => Err(NetworkError::Conflict(params.network)),
        None => {
            registry.insert(params.network, params);
            tracing::debug!(network = %params.network, hrp = params.bech32_hrp, "Registered network parameters");
            Ok(Registration::Registered)
        }
    }
}

/// Whether the parameters of `network` have been registered.
pub fn is_registered(network: Network) -> bool {
    REGISTRY.read().contains_key(&network)
}

/// Returns the registered parameters of `network`.
pub fn registered(network: Network) -> Result<NetworkParams, NetworkError> {
    REGISTRY
        .read()
        .get(&network)
        .copied()
        .ok_or(NetworkError::NotRegistered(network))
}

/// Registers the builtin mainnet and testnet parameters.
///
/// Meant to be called once by the process bootstrap, calling it again is harmless.
pub fn init_networks() -> Result<(), NetworkError> {
    register(NetworkParams::MAINNET)?;
    register(NetworkParams::TESTNET)?;
    Ok(())
}

/// Returns the parameters for the chain name reported by the node, registering
/// the builtin networks on first use.
pub fn chain_params(chain: &str) -> Result<NetworkParams, NetworkError> {
    init_networks()?;
    registered(Network::from_chain_name(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        init_networks().unwrap();
        assert!(is_registered(Network::Mainnet));
        assert_eq!(
            register(NetworkParams::MAINNET),
            Ok(Registration::AlreadyRegistered)
        );
        assert_eq!(registered(Network::Mainnet), Ok(NetworkParams::MAINNET));
    }

    #[test]
    fn conflicting_registration_does_not_overwrite() {
        init_networks().unwrap();
        let bogus = NetworkParams {
            pubkey_hash_version: 0,
            ..NetworkParams::TESTNET
        };
        assert_eq!(register(bogus), Err(NetworkError::Conflict(Network::Testnet)));
        assert_eq!(registered(Network::Testnet), Ok(NetworkParams::TESTNET));
    }

    #[test]
    fn concurrent_first_use_registers_once() {
        let handles = (0..8)
            .map(|_| std::thread::spawn(|| chain_params("main")))
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(NetworkParams::MAINNET));
        }
    }

    #[test]
    fn chain_name_selection() {
        assert_eq!(chain_params("test").unwrap().bech32_hrp, "tnix");
        assert_eq!(chain_params("main").unwrap().bech32_hrp, "nix");
        assert_eq!(chain_params("regtest").unwrap().network, Network::Mainnet);
        assert_eq!("testnet".parse::<Network>(), Ok(Network::Testnet));
        assert!("signet".parse::<Network>().is_err());
    }
}
