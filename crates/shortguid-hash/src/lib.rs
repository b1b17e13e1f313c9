//! ShortGuid hashing primitives used by CATHODE scripting archives.
//!
//! Every name in a `commands.pak` archive (composites, parameters, function
//! types, enum types...) is stored as a 32-bit "ShortGuid". This crate holds
//! the two pure functions the format is built on:
//!
//! - [`generate`] - two-pass SHA-1 digest of a UTF-8 name, truncated to 4 bytes
//! - [`combine`] - order-sensitive 64-to-32 mixing of two ids, used to fold
//!   entity paths into checksums and instance ids
//!
//! # Example
//! ```
//! let id = shortguid_hash::generate("CAGEAnimation");
//! assert_eq!(id, [0xF2, 0x4C, 0xEE, 0x20]);
//!
//! let v = u32::from_le_bytes(id);
//! assert_eq!(shortguid_hash::combine(v, 0), v);
//! ```

use sha1::{Digest, Sha1};

/// Number of digest bytes that get word-swapped before the second pass.
const SWAPPED_BYTES: usize = 16;

/// Compute the 4 id bytes for a name.
///
/// The first SHA-1 digest is split into four 32-bit words whose bytes are
/// reversed, the resulting 16 bytes are hashed again, and the first four
/// bytes of the second digest are the id.
pub fn generate(name: &str) -> [u8; 4] {
    generate_bytes(name.as_bytes())
}

/// Same as [`generate`] for raw bytes.
pub fn generate_bytes(data: &[u8]) -> [u8; 4] {
    let first = Sha1::digest(data);

    let mut swapped = [0u8; SWAPPED_BYTES];
    for (dst, src) in swapped.chunks_exact_mut(4).zip(first[..SWAPPED_BYTES].chunks_exact(4)) {
        dst[0] = src[3];
        dst[1] = src[2];
        dst[2] = src[1];
        dst[3] = src[0];
    }

    let second = Sha1::digest(swapped);
    [second[0], second[1], second[2], second[3]]
}

/// Combine two 32-bit ids into one.
///
/// Zero acts as the identity on either side. Otherwise `a` is packed into the
/// high word and `b` into the low word of a 64-bit key, which is mixed with
/// Thomas Wang's 64-to-32 integer hash.
#[inline]
pub fn combine(a: u32, b: u32) -> u32 {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }

    let mut key = ((a as u64) << 32) | b as u64;
    key = (!key).wrapping_add(key << 18);
    key ^= key >> 31;
    key = key.wrapping_mul(21);
    key ^= key >> 11;
    key = key.wrapping_add(key << 6);
    key ^= key >> 22;
    key as u32
}

/// Fold a sequence of ids from the back: `combine(s[0], combine(s[1], ...))`.
pub fn combine_rev(ids: &[u32]) -> u32 {
    ids.iter().rev().fold(0, |acc, &id| combine(id, acc))
}
