// libese/libese/src/protocol/checksum.rs

//! LRC computation and verification.

use crate::{Error, Result};

/// Longitudinal redundancy check: XOR of every byte.
pub fn lrc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Check that the last byte of `frame` is the LRC of everything before it.
pub fn verify_lrc(frame: &[u8]) -> Result<()> {
    let Some((&actual, body)) = frame.split_last() else {
        return Err(Error::InvalidLength {
            expected: 1,
            actual: 0,
        });
    };
    let expected = lrc(body);
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
