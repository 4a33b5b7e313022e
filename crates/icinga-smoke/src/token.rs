//! Random host names for each iteration

use crate::error::Result;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a host token
pub const TOKEN_BYTES: usize = 6;

/// Generate a token of [`TOKEN_BYTES`] random bytes as uppercase hex.
pub fn generate_host_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode_upper(bytes))
}
