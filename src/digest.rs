use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FormatError;
use crate::merkle::Element;

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// 32-byte hash output.
///
/// Digests order as unsigned big-endian byte strings: the derived `Ord` on
/// `[u8; 32]` compares byte 0 first. The sorted-pair rule and leaf sorting
/// both rely on this order.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Digest {
        Digest(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Consumes the digest into its raw bytes.
    pub fn into_bytes(self) -> [u8; DIGEST_LEN] {
        self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses hex with an optional `0x` prefix. Exactly 32 bytes must decode.
    pub fn from_hex(s: &str) -> Result<Digest, FormatError> {
        let decoded = decode_hex(s)?;
        <[u8; DIGEST_LEN]>::try_from(decoded.as_slice())
            .map(Digest)
            .map_err(|_| FormatError::DigestLength {
                actual: decoded.len(),
            })
    }
}

/// Decodes hex with an optional `0x` prefix. Whitespace anywhere, including
/// around the value, is invalid hex.
pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>, FormatError> {
    let cleaned = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(cleaned).map_err(|e| FormatError::Hex(e.to_string()))
}

impl Element for Digest {}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl FromStr for Digest {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::from_hex(s)
    }
}

/// `{}` prints lowercase hex, `{:#}` adds a `0x` prefix.
impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#}", self))
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DigestVisitor;

        impl<'de> Visitor<'de> for DigestVisitor {
            type Value = Digest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 32-byte hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Digest, E> {
                Digest::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DigestVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "29c0512e9f3108c4300a285b50718bf60252a11d058d4f033da1c36235433664";

    #[test]
    fn test_hex_round_trip() {
        let d: Digest = HEX.parse().unwrap();
        assert_eq!(d.to_hex(), HEX);
        assert_eq!(format!("{}", d), HEX);
        assert_eq!(format!("{:#}", d), format!("0x{}", HEX));
        assert_eq!(format!("0x{}", HEX).parse::<Digest>().unwrap(), d);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            Digest::from_hex("0xabcd"),
            Err(FormatError::DigestLength { actual: 2 })
        );
        assert!(matches!(Digest::from_hex("zz"), Err(FormatError::Hex(_))));
        assert!(matches!(
            Digest::from_hex(&format!(" {} ", HEX)),
            Err(FormatError::Hex(_))
        ));
    }

    #[test]
    fn test_order_is_big_endian() {
        let mut lo = [0u8; 32];
        let mut hi = [0u8; 32];
        lo[31] = 0xff;
        hi[0] = 0x01;
        assert!(Digest::new(lo) < Digest::new(hi));
        assert!(Digest::ZERO < Digest::new(lo));
    }

    #[test]
    fn test_serde_hex_string() {
        let d: Digest = HEX.parse().unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"0x{}\"", HEX));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<Digest>("\"0x00\"").is_err());
    }
}
