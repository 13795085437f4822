use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::hash::Algorithm;
use crate::merkle::Element;
use crate::sha3_alg::Sha3Algorithm;

/// Side a sibling occupies relative to the node being proved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Sibling is the smaller digest and was hashed first.
    Left,
    /// Sibling was hashed second.
    Right,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Left => f.write_str("left"),
            Position::Right => f.write_str("right"),
        }
    }
}

/// One proof element: a sibling digest and its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep<T> {
    /// Sibling digest.
    pub sibling: T,
    /// Side of the sibling.
    pub position: Position,
}

impl<T> ProofStep<T> {
    /// Creates a proof step.
    pub fn new(sibling: T, position: Position) -> Self {
        ProofStep { sibling, position }
    }
}

/// Outcome of checking a proof. A mismatch is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verification {
    /// The path recomputes the expected root.
    Valid,
    /// The path does not recompute the expected root, or a step's side
    /// contradicts the sorted-pair order.
    Invalid,
}

impl Verification {
    /// Returns `true` for [`Verification::Valid`].
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

impl From<bool> for Verification {
    fn from(ok: bool) -> Self {
        if ok {
            Verification::Valid
        } else {
            Verification::Invalid
        }
    }
}

/// Merkle tree inclusion proof.
///
/// Steps are ordered from the leaf layer up. Layers where the proved node
/// was promoted without a partner contribute no step, so the length varies
/// between leaves of the same tree.
///
/// ```text
/// [ (s0, side0) (s1, side1) ... ]
/// ```
///
/// Proof validation folds the steps into the leaf with the sorted-pair rule
/// and compares the result with the root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proof<T> {
    steps: Vec<ProofStep<T>>,
}

impl<T> Proof<T> {
    /// Creates new MT inclusion proof
    pub fn new(steps: Vec<ProofStep<T>>) -> Proof<T> {
        Proof { steps }
    }

    /// Proof steps, leaf layer first.
    pub fn steps(&self) -> &[ProofStep<T>] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` for the proof of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T: Element> Proof<T> {
    /// Sibling digests without sides, the form sorted-pair verifiers
    /// usually take.
    pub fn siblings(&self) -> Vec<T> {
        self.steps.iter().map(|s| s.sibling.clone()).collect()
    }

    /// `0x`-prefixed lowercase hex of each sibling.
    pub fn to_hex(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| format!("0x{}", hex::encode(&s.sibling)))
            .collect()
    }

    /// Verifies MT inclusion proof of `leaf` against `root`.
    pub fn validate<A: Algorithm<T>>(&self, leaf: &T, root: &T) -> Verification {
        let mut a = A::default();
        let mut h = leaf.clone();

        for step in &self.steps {
            let consistent = match step.position {
                Position::Left => step.sibling <= h,
                Position::Right => step.sibling >= h,
            };
            if !consistent {
                return Verification::Invalid;
            }
            h = a.node(h, step.sibling.clone());
        }

        Verification::from(h == *root)
    }
}

/// Verifies that `proof` leads from `leaf` to `root` under SHA3-256.
pub fn verify_proof(leaf: &Digest, proof: &Proof<Digest>, root: &Digest) -> Verification {
    proof.validate::<Sha3Algorithm>(leaf, root)
}
