use thiserror::Error;

/// Errors that can occur while parsing hashes and addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Hash has invalid length
    #[error("Invalid hash length: {len} bytes, expected: {expected} bytes")]
    InvalidHashLength { len: usize, expected: usize },

    /// Address string is malformed or invalid
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Workchain id does not fit in a signed byte
    #[error("Invalid workchain: {0}")]
    InvalidWorkchain(String),
}
