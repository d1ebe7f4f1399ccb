//! Password hashing error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("the encoded hash is in the wrong format")]
    InvalidHashFormat,

    #[error("incompatible version of argon2: found {found}, expected {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },

    #[error("malformed hash parameter section: {0}")]
    MalformedParams(String),

    #[error("invalid base64 in encoded hash: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("randomness source failure: {0}")]
    RandomnessFailure(rand::Error),

    #[error("key derivation failed: {0}")]
    Kdf(argon2::Error),
}
