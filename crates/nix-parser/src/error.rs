use nix_primitives::NetworkError;

/// Parser result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Parser errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither a reserved label nor an address of the active network.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// Packed record shorter than its header.
    #[error("Truncated packed transaction ({len} bytes)")]
    TruncatedRecord { len: usize },
    #[error(transparent)]
    Decode(#[from] bitcoin::consensus::encode::Error),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid txid: {0}")]
    InvalidTxid(String),
    #[error(transparent)]
    Network(#[from] NetworkError),
}
