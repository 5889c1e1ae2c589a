use thiserror::Error;

/// Errors returned by [`PolygonClient`](crate::PolygonClient) and the
/// building blocks it is made of.
///
/// Every variant maps to one [`ErrorKind`] so callers can branch on the
/// cause without matching on every variant.
#[derive(Error, Debug)]
pub enum PolygonError {
    // ============ Construction ============
    /// The endpoint could not be reached or is not an EVM node
    #[error("Failed to connect to Polygon provider {endpoint}: {reason}")]
    Connection {
        /// The endpoint URL that was dialed
        endpoint: String,
        /// What went wrong
        reason: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Lookups ============
    /// The node has no block for the identifier
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// The node has no record of the transaction
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    // ============ Validation ============
    /// Malformed account or contract address
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected input
        address: String,
        /// Parser message
        reason: String,
    },

    /// Malformed transaction hash
    #[error("Invalid transaction hash '{hash}': {reason}")]
    InvalidHash {
        /// The rejected input
        hash: String,
        /// Parser message
        reason: String,
    },

    /// Private key is not 32 bytes of hex or not a valid secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// ABI JSON could not be parsed
    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    /// The ABI has no function with this name
    #[error("Function '{0}' not found in ABI")]
    FunctionNotFound(String),

    /// Argument count or types do not match the function signature
    #[error("Invalid arguments for '{function}': {reason}")]
    InvalidArguments {
        /// Function name as requested
        function: String,
        /// What did not match
        reason: String,
    },

    /// Amount parsing or arithmetic failed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // ============ Write path ============
    /// The transaction could not be signed
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    /// The node rejected the signed transaction
    #[error("Failed to broadcast transaction: {0}")]
    Broadcast(String),

    // ============ Contract calls ============
    /// `eth_call` failed or reverted
    #[error("Contract call '{function}' failed: {reason}")]
    ContractCall {
        /// Function name
        function: String,
        /// Node or revert message
        reason: String,
    },

    /// Return data did not match the declared outputs
    #[error("Failed to decode return data of '{function}': {reason}")]
    Decode {
        /// Function name
        function: String,
        /// Decoder message
        reason: String,
    },

    // ============ Transport ============
    /// Any other JSON-RPC or transport failure
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Coarse classification of a [`PolygonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint unreachable or not chain-compatible
    Connection,
    /// Block or transaction absent at the queried identifier
    NotFound,
    /// Caller input rejected before anything was sent
    Validation,
    /// Signing failed or the node refused the transaction
    Broadcast,
    /// A read-only contract call reverted or returned undecodable data
    Contract,
    /// Transport or node failure outside the categories above
    Rpc,
}

impl PolygonError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::BlockNotFound(_) | Self::TransactionNotFound(_) => ErrorKind::NotFound,
            Self::Config(_)
            | Self::InvalidAddress { .. }
            | Self::InvalidHash { .. }
            | Self::InvalidPrivateKey(_)
            | Self::InvalidAbi(_)
            | Self::FunctionNotFound(_)
            | Self::InvalidArguments { .. }
            | Self::InvalidAmount(_) => ErrorKind::Validation,
            Self::Signing(_) | Self::Broadcast(_) => ErrorKind::Broadcast,
            Self::ContractCall { .. } | Self::Decode { .. } => ErrorKind::Contract,
            Self::Rpc(_) => ErrorKind::Rpc,
        }
    }

    /// True when the lookup target does not exist on the node.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn invalid_address(address: &str, reason: impl ToString) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PolygonError>;
