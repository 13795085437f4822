//! Sorted-pair _Merkle Tree_ over account allocation records.
//!
//! Every leaf is the hash of one allocation record (account + private and
//! public allocation amounts), the tree commits to the whole allocation
//! table with a single 32-byte root and any leaf can be proven against
//! that root with `O(log n)` sibling digests.
//!
//! Leaf and node encoding:
//!
//! ```text
//! LEAF(r)    = SHA3-256(account[32] || le64(private) || le64(public))
//! NODE(a, b) = SHA3-256(min(a, b) || max(a, b))
//! ```
//!
//! `min` / `max` compare digests as unsigned big-endian byte strings. A node
//! left without a partner at the end of a layer is promoted to the next
//! layer unchanged, it is never paired with itself.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Implementation choices
//!
//! Hashing follows `std::hash::Hasher`: records implement [`Hashable`] and
//! are streamed into an [`Algorithm`], which adds the full-length digest and
//! the leaf / node combination rules on top of `Hasher`. The tree is generic
//! over the digest type and the algorithm, [`AllocationTree`] fixes both to
//! [`Digest`] and [`Sha3Algorithm`].
//!
//! Layers are kept as index-addressed vectors of tagged nodes, so proof
//! paths are walked by index arithmetic only.
//!
//! # Interface
//!
//! ```text
//! - encode_leaf (record) -> digest
//! - build (leaves) -> tree
//! - root -> digest
//! - gen_proof (index | digest) -> proof
//! - verify_proof (leaf, proof, root) -> verification
//! ```
//!
//! # Quick start
//!
//! ```
//! use allocation_merkle::{encode_leaf, verify_proof, AllocationRecord, AllocationTree};
//!
//! # fn main() -> allocation_merkle::Result<()> {
//! let records = vec![
//!     AllocationRecord::parse(
//!         "0x96c740515c8d2fc6d37ba4dda9391eac18c19cd1d4abc0896df32cf70968b065",
//!         "1000000000",
//!         "1000000000",
//!     )?,
//!     AllocationRecord::parse(
//!         "0x540f1e1820db6c1e1b5c02f5bce67daeac57347313800dd83defed8b8b9efc60",
//!         "1000000000",
//!         "1000000000",
//!     )?,
//! ];
//!
//! let tree = AllocationTree::from_records(&records)?;
//! let leaf = encode_leaf(&records[1]);
//! let proof = tree.gen_proof_for_leaf(&leaf)?;
//!
//! assert!(verify_proof(&leaf, &proof, &tree.root()).is_valid());
//! # Ok(())
//! # }
//! ```

#![deny(
    missing_docs,
    unused_qualifications,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]

/// Hash infrastructure for items in Merkle tree.
pub mod hash;

/// Common implementations for [`Hashable`].
mod hash_impl;

/// SHA3-256 algorithm used for allocation trees.
pub mod sha3_alg;

/// 32-byte digest type.
pub mod digest;

/// Allocation records and the leaf encoder.
pub mod record;

/// Error types.
pub mod error;

/// Merkle tree abstractions, implementation and algorithms.
pub mod merkle;

/// Merkle tree inclusion proof and verifier.
pub mod proof;

/// JSON allocation tables.
pub mod table;

#[cfg(test)]
mod test_common;

pub use crate::digest::Digest;
pub use crate::error::{Error, FormatError, Result};
pub use crate::hash::{Algorithm, Hashable};
pub use crate::merkle::{Element, MerkleTree, Node, TreeConfig};
pub use crate::proof::{verify_proof, Position, Proof, ProofStep, Verification};
pub use crate::record::{encode_leaf, Address, AllocationRecord};
pub use crate::sha3_alg::Sha3Algorithm;
pub use crate::table::AllocationTable;

/// Merkle tree of allocation records hashed with SHA3-256.
pub type AllocationTree = MerkleTree<Digest, Sha3Algorithm>;
