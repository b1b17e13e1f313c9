//! ShortGuid identifiers.
//!
//! Every name in the archive is replaced by a 32-bit id derived from the name
//! with [`shortguid_hash::generate`]. Ids are rendered as their four stored
//! bytes, e.g. `F2-4C-EE-20` for `"CAGEAnimation"`.

mod cache;

pub use cache::GuidCache;

use std::fmt;
use std::str::FromStr;

use crate::util::Error;

/// 32-bit content-addressed identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShortGuid(u32);

impl ShortGuid {
    /// The zero id: "no entity", path terminator, identity for [`combine`](Self::combine).
    pub const INVALID: Self = Self(0);

    /// Seed for composite instance id chains (`FE-5B-F0-4A`).
    pub const INITIALISER_BASE: Self = Self(0x4AF0_5BFE);

    /// Wrap a raw value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Build from the four stored (little-endian) bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// The four stored bytes.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Raw numeric value (also the sort key used when encoding).
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check for the `Invalid` sentinel.
    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// Hash a name without touching any cache.
    pub fn from_name(name: &str) -> Self {
        Self::from_bytes(shortguid_hash::generate(name))
    }

    /// Order-sensitive combination of two ids; `INVALID` is the identity.
    #[inline]
    pub fn combine(self, other: ShortGuid) -> ShortGuid {
        Self(shortguid_hash::combine(self.0, other.0))
    }
}

impl From<u32> for ShortGuid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ShortGuid> for u32 {
    fn from(id: ShortGuid) -> Self {
        id.0
    }
}

impl fmt::Display for ShortGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.to_bytes();
        write!(f, "{:02X}-{:02X}-{:02X}-{:02X}", b[0], b[1], b[2], b[3])
    }
}

impl fmt::Debug for ShortGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortGuid({})", self)
    }
}

impl FromStr for ShortGuid {
    type Err = Error;

    /// Parse the `XX-XX-XX-XX` byte rendering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];
        let mut parts = s.split('-');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(|| Error::InvalidGuid(s.to_string()))?;
            if part.len() != 2 {
                return Err(Error::InvalidGuid(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| Error::InvalidGuid(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(Error::InvalidGuid(s.to_string()));
        }
        Ok(Self::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_pinned() {
        let id = ShortGuid::from_name("CAGEAnimation");
        assert_eq!(id.value(), 0x20EE4CF2);
        assert_eq!(id.to_string(), "F2-4C-EE-20");
    }

    #[test]
    fn test_display_roundtrip() {
        let id = ShortGuid::from_name("resource");
        assert_eq!(id.to_string(), "B0-87-62-9B");
        let parsed: ShortGuid = "B0-87-62-9B".parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(ShortGuid::INITIALISER_BASE.to_string(), "FE-5B-F0-4A");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("B0-87-62".parse::<ShortGuid>().is_err());
        assert!("B0-87-62-9B-00".parse::<ShortGuid>().is_err());
        assert!("ZZ-87-62-9B".parse::<ShortGuid>().is_err());
        assert!("B087-62-9B".parse::<ShortGuid>().is_err());

        let err = "not-a-guid".parse::<ShortGuid>().unwrap_err();
        assert!(matches!(&err, Error::InvalidGuid(text) if text == "not-a-guid"));
    }

    #[test]
    fn test_combine_identity() {
        let a = ShortGuid::from_name("A");
        assert_eq!(a.combine(ShortGuid::INVALID), a);
        assert_eq!(ShortGuid::INVALID.combine(a), a);
    }

    #[test]
    fn test_combine_not_commutative() {
        let a = ShortGuid::new(0x11223344);
        let b = ShortGuid::new(0x55667788);
        assert_ne!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b).value(), 0xD142A3E5);
    }
}
