//! Argon2id password hashing.
//!
//! Hashes are stored as a self-describing string:
//!
//! ```text
//! $argon2id$v=19$m=65536,t=3,p=2$<base64 salt>$<base64 key>
//! ```
//!
//! Base64 is the standard alphabet without padding. The key length is not
//! stored; verification derives a key as long as the decoded stored key.
//!
//! The string is parsed here rather than through `argon2::PasswordHash`
//! so each malformed section maps to its own [`HashError`] variant.

pub mod error;

pub use error::HashError;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Algorithm tag written into every encoded hash.
pub const ALGORITHM_TAG: &str = "argon2id";

/// Argon2 version this implementation produces and accepts (0x13).
pub const KDF_VERSION: u32 = Version::V0x13 as u32;

const NUM_SECTIONS: usize = 6;

/// Largest memory cost accepted from a stored hash (4 GiB).
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
    /// Salt length in bytes
    pub salt_length: usize,
    /// Derived key length in bytes
    pub key_length: usize,
}

impl Default for HashParams {
    /// 64 MiB, 3 passes, 2 lanes, 16-byte salt, 32-byte key.
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 2,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// The pieces of a parsed hash string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHash {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub salt: Vec<u8>,
    pub key: Vec<u8>,
}

/// Hash `password` with a fresh random salt.
///
/// Blocking: with default parameters this takes tens to hundreds of
/// milliseconds and 64 MiB of memory. Async callers should run it on
/// `spawn_blocking`.
pub fn hash_password(password: &str, params: &HashParams) -> Result<String, HashError> {
    let mut salt = vec![0u8; params.salt_length];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(HashError::RandomnessFailure)?;

    let key = derive_key(
        password,
        &salt,
        params.memory_kib,
        params.iterations,
        params.parallelism,
        params.key_length,
    )?;

    Ok(format!(
        "${}$v={}$m={},t={},p={}${}${}",
        ALGORITHM_TAG,
        KDF_VERSION,
        params.memory_kib,
        params.iterations,
        params.parallelism,
        STANDARD_NO_PAD.encode(&salt),
        STANDARD_NO_PAD.encode(&key),
    ))
}

/// Check `password` against an encoded hash.
///
/// `Ok(false)` means the hash was readable and the password is wrong.
/// `Err(_)` means the hash itself could not be used.
pub fn verify_password(password: &str, encoded_hash: &str) -> Result<bool, HashError> {
    let decoded = decode_hash(encoded_hash)?;

    let derived = derive_key(
        password,
        &decoded.salt,
        decoded.memory_kib,
        decoded.iterations,
        decoded.parallelism,
        decoded.key.len(),
    )?;

    Ok(derived.ct_eq(&decoded.key).into())
}

/// Split an encoded hash into its parameters, salt and key.
pub fn decode_hash(encoded_hash: &str) -> Result<DecodedHash, HashError> {
    let sections: Vec<&str> = encoded_hash.split('$').collect();
    if sections.len() != NUM_SECTIONS {
        return Err(HashError::InvalidHashFormat);
    }
    if !sections[0].is_empty() || sections[1] != ALGORITHM_TAG {
        return Err(HashError::InvalidHashFormat);
    }

    let version = parse_field(sections[2], "v")?;
    if version != KDF_VERSION {
        return Err(HashError::IncompatibleVersion {
            found: version,
            expected: KDF_VERSION,
        });
    }

    let (memory_kib, iterations, parallelism) = parse_cost_section(sections[3])?;
    if memory_kib > MAX_MEMORY_KIB {
        return Err(HashError::MalformedParams(format!(
            "memory cost {} KiB exceeds limit of {} KiB",
            memory_kib, MAX_MEMORY_KIB
        )));
    }

    let salt = STANDARD_NO_PAD.decode(sections[4])?;
    let key = STANDARD_NO_PAD.decode(sections[5])?;

    Ok(DecodedHash {
        memory_kib,
        iterations,
        parallelism,
        salt,
        key,
    })
}

/// Parse `m=<int>,t=<int>,p=<int>`.
fn parse_cost_section(section: &str) -> Result<(u32, u32, u32), HashError> {
    let fields: Vec<&str> = section.split(',').collect();
    if fields.len() != 3 {
        return Err(HashError::MalformedParams(format!(
            "expected 3 cost fields, got {}",
            fields.len()
        )));
    }
    Ok((
        parse_field(fields[0], "m")?,
        parse_field(fields[1], "t")?,
        parse_field(fields[2], "p")?,
    ))
}

/// Parse a single `<name>=<int>` field.
fn parse_field(field: &str, name: &str) -> Result<u32, HashError> {
    field
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('='))
        .and_then(|value| value.parse::<u32>().ok())
        .ok_or_else(|| HashError::MalformedParams(format!("bad '{}' field: '{}'", name, field)))
}

fn derive_key(
    password: &str,
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    key_length: usize,
) -> Result<Vec<u8>, HashError> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(key_length))
        .map_err(HashError::Kdf)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = vec![0u8; key_length];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(HashError::Kdf)?;
    Ok(key)
}
