use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digest::{decode_hex, Digest};
use crate::error::FormatError;
use crate::hash::{Algorithm, Hashable};
use crate::sha3_alg::Sha3Algorithm;

/// Account identifier length in bytes.
pub const ADDRESS_LEN: usize = 32;

/// Serialized record length: account, private and public allocation.
pub const ENCODED_RECORD_LEN: usize = ADDRESS_LEN + 8 + 8;

/// 32-byte account identifier.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Address {
        Address(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parses hex with an optional `0x` prefix. Shorter or longer input is
    /// rejected, never padded or truncated.
    pub fn from_hex(s: &str) -> Result<Address, FormatError> {
        let decoded = decode_hex(s)?;
        <[u8; ADDRESS_LEN]>::try_from(decoded.as_slice())
            .map(Address)
            .map_err(|_| FormatError::AccountLength {
                expected: ADDRESS_LEN,
                actual: decoded.len(),
            })
    }
}

impl FromStr for Address {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = FormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::from_hex(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        format!("{:#}", a)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#})", self)
    }
}

impl<H: Hasher> Hashable<H> for Address {
    fn hash(&self, state: &mut H) {
        state.write(&self.0)
    }
}

/// One row of an allocation table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// Account the allocation belongs to.
    pub account: Address,
    /// Private allocation amount.
    pub private_allocation: u64,
    /// Public allocation amount.
    pub public_allocation: u64,
}

impl AllocationRecord {
    /// Creates a record from typed fields.
    pub fn new(account: Address, private_allocation: u64, public_allocation: u64) -> Self {
        AllocationRecord {
            account,
            private_allocation,
            public_allocation,
        }
    }

    /// Creates a record from its external form: a hex address and two
    /// decimal amounts.
    pub fn parse(
        account: &str,
        private_allocation: &str,
        public_allocation: &str,
    ) -> Result<Self, FormatError> {
        Ok(AllocationRecord {
            account: account.parse()?,
            private_allocation: parse_amount(private_allocation)?,
            public_allocation: parse_amount(public_allocation)?,
        })
    }

    /// The exact bytes hashed into the leaf.
    pub fn to_bytes(&self) -> [u8; ENCODED_RECORD_LEN] {
        let mut out = [0u8; ENCODED_RECORD_LEN];
        out[..ADDRESS_LEN].copy_from_slice(&self.account.0);
        out[ADDRESS_LEN..ADDRESS_LEN + 8].copy_from_slice(&self.private_allocation.to_le_bytes());
        out[ADDRESS_LEN + 8..].copy_from_slice(&self.public_allocation.to_le_bytes());
        out
    }

    /// Leaf digest of this record.
    pub fn leaf(&self) -> Digest {
        encode_leaf(self)
    }
}

impl<H: Hasher> Hashable<H> for AllocationRecord {
    fn hash(&self, state: &mut H) {
        self.account.hash(state);
        self.private_allocation.hash(state);
        self.public_allocation.hash(state);
    }
}

/// Hashes one record into its leaf digest: `SHA3-256(to_bytes())`.
pub fn encode_leaf(record: &AllocationRecord) -> Digest {
    Sha3Algorithm::default().leaf(record)
}

/// Parses a decimal u64. Signs, whitespace, fractions and values above
/// `u64::MAX` are rejected.
pub fn parse_amount(s: &str) -> Result<u64, FormatError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::Amount(s.to_owned()));
    }
    s.parse::<u64>().map_err(|_| FormatError::Amount(s.to_owned()))
}
