use std::fmt;
use std::hash::Hasher;

use sha3::{Digest as _, Sha3_256};

use crate::digest::Digest;
use crate::hash::Algorithm;

/// SHA3-256 merkle algorithm.
///
/// Leaves are `SHA3-256(bytes)` of the serialized record, nodes are
/// `SHA3-256(min || max)`.
#[derive(Clone, Default)]
pub struct Sha3Algorithm(Sha3_256);

impl Sha3Algorithm {
    /// Creates a fresh hasher.
    pub fn new() -> Sha3Algorithm {
        Sha3Algorithm(Sha3_256::new())
    }
}

impl fmt::Debug for Sha3Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sha3Algorithm")
    }
}

impl Hasher for Sha3Algorithm {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        self.0.update(msg)
    }

    /// First 8 bytes of the digest of everything written so far.
    fn finish(&self) -> u64 {
        let out = self.0.clone().finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&out[..8]);
        u64::from_le_bytes(head)
    }
}

impl Algorithm<Digest> for Sha3Algorithm {
    #[inline]
    fn hash(&mut self) -> Digest {
        Digest::new(self.0.finalize_reset().into())
    }

    #[inline]
    fn reset(&mut self) {
        sha3::Digest::reset(&mut self.0);
    }
}
