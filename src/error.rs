use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while encoding records, building trees or generating
/// proofs. A proof that does not verify is not an error, see
/// [`Verification`](crate::proof::Verification).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input record.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A tree needs at least one leaf.
    #[error("cannot build a merkle tree from zero leaves")]
    EmptyInput,

    /// Proof requested for a leaf the tree does not contain.
    #[error("leaf 0x{leaf} not found in tree")]
    LeafNotFound {
        /// Requested leaf, lowercase hex.
        leaf: String,
    },

    /// Proof requested for an account the allocation table does not list.
    #[error("account 0x{account} not found in table")]
    AccountNotFound {
        /// Requested account, lowercase hex.
        account: String,
    },

    /// Proof requested by digest for a leaf present at several positions.
    #[error("leaf 0x{leaf} is ambiguous, found at positions {positions:?}")]
    AmbiguousLeaf {
        /// Requested leaf, lowercase hex.
        leaf: String,
        /// Every position holding `leaf`.
        positions: Vec<usize>,
    },

    /// Proof requested for a position past the last leaf.
    #[error("leaf index {index} is out of bounds for tree with {leafs} leaves")]
    IndexOutOfBounds {
        /// Requested position.
        index: usize,
        /// Number of leaves in the tree.
        leafs: usize,
    },
}

/// Malformed account, amount or record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input is not valid hex.
    #[error("invalid hex encoding: {0}")]
    Hex(String),

    /// Account decoded to the wrong number of bytes.
    #[error("invalid account length: expected {expected} bytes, got {actual}")]
    AccountLength {
        /// Required length.
        expected: usize,
        /// Decoded length.
        actual: usize,
    },

    /// Digest decoded to the wrong number of bytes.
    #[error("invalid digest length: expected 32 bytes, got {actual}")]
    DigestLength {
        /// Decoded length.
        actual: usize,
    },

    /// Amount is not a decimal unsigned integer or does not fit in u64.
    #[error("allocation amount {0:?} is not a u64")]
    Amount(String),

    /// Record is missing fields or has the wrong shape.
    #[error("malformed record: {0}")]
    Record(String),
}

impl Error {
    /// Returns `true` for [`Error::Format`].
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}
