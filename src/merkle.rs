use std::fmt::Debug;
use std::marker::PhantomData;

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::hash::{Algorithm, Hashable};
use crate::proof::{Position, Proof, ProofStep, Verification};
use crate::record::AllocationRecord;

/// Layer width (number of nodes) at or above which pair hashing of a layer
/// runs on the rayon pool. Narrower layers are hashed on the calling thread,
/// where spawning work costs more than it saves.
pub const SMALL_TREE_BUILD: usize = 1024;

/// Element stored in the merkle tree.
pub trait Element: Ord + Clone + AsRef<[u8]> + Sync + Send + Debug {}

/// Tree build options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Sort the leaves by digest before building. Leaf positions then refer
    /// to the sorted order, and the root no longer depends on input order.
    pub sort_leaves: bool,
    /// See [`SMALL_TREE_BUILD`].
    pub parallel_threshold: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            sort_leaves: false,
            parallel_threshold: SMALL_TREE_BUILD,
        }
    }
}

impl TreeConfig {
    /// Sets [`TreeConfig::sort_leaves`].
    pub fn sort_leaves(mut self, sort: bool) -> Self {
        self.sort_leaves = sort;
        self
    }

    /// Sets [`TreeConfig::parallel_threshold`].
    pub fn parallel_threshold(mut self, width: usize) -> Self {
        self.parallel_threshold = width;
        self
    }
}

/// How a node was produced from the layer below.
///
/// Child indices address the layer directly below the node's own layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Layer 0 entry.
    Leaf,
    /// Hash of two siblings, `left` is the smaller digest and was hashed
    /// first.
    Internal {
        /// Index of the child hashed first.
        left: usize,
        /// Index of the child hashed second.
        right: usize,
    },
    /// Trailing node of an odd layer carried up unchanged.
    Promoted {
        /// Index of the carried node.
        child: usize,
    },
}

/// One tree layer: digests and the nodes describing them, index aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer<T: Element> {
    hashes: Vec<T>,
    nodes: Vec<Node>,
}

impl<T: Element> Layer<T> {
    /// Digests of this layer in order.
    pub fn hashes(&self) -> &[T] {
        &self.hashes
    }

    /// Node descriptions of this layer in order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Returns `true` if the layer has no nodes.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Merkle Tree.
///
/// Layers are stored bottom up, layer 0 holds the leaves in input order (or
/// sorted, see [`TreeConfig::sort_leaves`]) and the last layer holds the
/// root alone. Each parent is the hash of a pair of consecutive nodes, the
/// smaller digest hashed first:
///
/// ```text
///              root = h(min(h01, c), max(h01, c))
///             /                                  \
///   h01 = h(min(a, b), max(a, b))                 c
///      /              \                           |
///     a                b                          c
/// ```
///
/// In memory layout:
///
/// ```text
///     [[a b c] [h01 c] [root]]
/// ```
///
/// A trailing node without a partner (`c` above) is promoted to the next
/// layer unchanged. A single leaf is its own root. A tree over `n` leaves has
/// `ceil(log2(n))` layers above the leaves.
#[derive(Debug, Clone)]
pub struct MerkleTree<T, A>
where
    T: Element,
    A: Algorithm<T>,
{
    layers: Vec<Layer<T>>,
    leafs: usize,
    config: TreeConfig,

    _a: PhantomData<fn() -> A>,
}

impl<T: Element, A: Algorithm<T>> MerkleTree<T, A> {
    /// Creates new merkle from a sequence of leaf hashes.
    pub fn new<I: IntoIterator<Item = T>>(leaves: I) -> Result<MerkleTree<T, A>> {
        Self::new_with_config(leaves, TreeConfig::default())
    }

    /// Creates new merkle from a sequence of leaf hashes.
    pub fn new_with_config<I: IntoIterator<Item = T>>(
        leaves: I,
        config: TreeConfig,
    ) -> Result<MerkleTree<T, A>> {
        Self::build(leaves.into_iter().collect(), config)
    }

    /// Creates new merkle tree from a list of hashable objects.
    pub fn from_data<O: Hashable<A>, I: IntoIterator<Item = O>>(
        data: I,
    ) -> Result<MerkleTree<T, A>> {
        Self::from_data_with_config(data, TreeConfig::default())
    }

    /// Creates new merkle tree from a list of hashable objects.
    pub fn from_data_with_config<O: Hashable<A>, I: IntoIterator<Item = O>>(
        data: I,
        config: TreeConfig,
    ) -> Result<MerkleTree<T, A>> {
        let mut a = A::default();
        let leaves = data.into_iter().map(|x| a.leaf(&x)).collect();
        Self::build(leaves, config)
    }

    /// Creates new merkle tree over allocation records, one leaf per record
    /// in slice order.
    pub fn from_records(records: &[AllocationRecord]) -> Result<MerkleTree<T, A>> {
        Self::from_data(records)
    }

    /// Creates new merkle tree over allocation records.
    pub fn from_records_with_config(
        records: &[AllocationRecord],
        config: TreeConfig,
    ) -> Result<MerkleTree<T, A>> {
        Self::from_data_with_config(records, config)
    }

    fn build(mut leaves: Vec<T>, config: TreeConfig) -> Result<Self> {
        if leaves.is_empty() {
            return Err(Error::EmptyInput);
        }
        if config.sort_leaves {
            leaves.sort();
        }

        let leafs = leaves.len();
        let height = proof_max_len(leafs);
        let mut layers = Vec::with_capacity(height + 1);
        layers.push(Layer {
            nodes: vec![Node::Leaf; leafs],
            hashes: leaves,
        });

        let mut below = 0;
        while layers[below].len() > 1 {
            let next = Self::build_layer(&layers[below].hashes, config.parallel_threshold);
            layers.push(next);
            below += 1;
        }

        debug_assert_eq!(layers.len(), height + 1);
        debug!(
            "built merkle tree: leafs {}, layers above leafs {}, sorted leaves {}",
            leafs, height, config.sort_leaves
        );

        Ok(MerkleTree {
            layers,
            leafs,
            config,
            _a: PhantomData,
        })
    }

    /// Hashes consecutive pairs of `below` into the next layer, promoting a
    /// trailing odd node.
    fn build_layer(below: &[T], parallel_threshold: usize) -> Layer<T> {
        let parallel = below.len() >= parallel_threshold;
        trace!("hashing layer of width {} (parallel: {})", below.len(), parallel);

        let (hashes, nodes): (Vec<T>, Vec<Node>) = if parallel {
            below
                .par_chunks(2)
                .enumerate()
                .map(|(i, pair)| Self::join(i, pair))
                .unzip()
        } else {
            below
                .chunks(2)
                .enumerate()
                .map(|(i, pair)| Self::join(i, pair))
                .unzip()
        };

        Layer { hashes, nodes }
    }

    #[inline]
    fn join(index: usize, pair: &[T]) -> (T, Node) {
        let base = 2 * index;
        match pair {
            [a, b] => {
                let node = if b < a {
                    Node::Internal {
                        left: base + 1,
                        right: base,
                    }
                } else {
                    Node::Internal {
                        left: base,
                        right: base + 1,
                    }
                };
                (A::default().node(a.clone(), b.clone()), node)
            }
            // chunks(2) only ever yields a single trailing element here
            _ => (pair[0].clone(), Node::Promoted { child: base }),
        }
    }

    /// Generate merkle tree inclusion proof for leaf `i`.
    pub fn gen_proof(&self, i: usize) -> Result<Proof<T>> {
        if i >= self.leafs {
            return Err(Error::IndexOutOfBounds {
                index: i,
                leafs: self.leafs,
            });
        }

        let mut steps = Vec::with_capacity(self.layers.len() - 1);
        let mut j = i;
        for (below, above) in self.layers.iter().zip(self.layers.iter().skip(1)) {
            let parent = j / 2;
            match above.nodes[parent] {
                Node::Internal { left, right } => {
                    let (sibling, position) = if left == j {
                        (right, Position::Right)
                    } else {
                        (left, Position::Left)
                    };
                    steps.push(ProofStep::new(below.hashes[sibling].clone(), position));
                }
                // promoted: no sibling at this layer
                Node::Promoted { .. } | Node::Leaf => {}
            }
            j = parent;
        }

        debug!("generated proof for leaf {}: {} steps", i, steps.len());
        Ok(Proof::new(steps))
    }

    /// Generate the proof for the leaf equal to `leaf`.
    ///
    /// Fails with [`Error::LeafNotFound`] if no leaf matches and with
    /// [`Error::AmbiguousLeaf`] if several positions hold the same digest,
    /// use [`MerkleTree::proofs_for_leaf`] to get all of them.
    pub fn gen_proof_for_leaf(&self, leaf: &T) -> Result<Proof<T>> {
        match self.positions_of(leaf).as_slice() {
            [] => Err(Error::LeafNotFound {
                leaf: hex::encode(leaf),
            }),
            [i] => self.gen_proof(*i),
            many => Err(Error::AmbiguousLeaf {
                leaf: hex::encode(leaf),
                positions: many.to_vec(),
            }),
        }
    }

    /// Proofs for every position holding `leaf`, paired with the position.
    pub fn proofs_for_leaf(&self, leaf: &T) -> Result<Vec<(usize, Proof<T>)>> {
        let positions = self.positions_of(leaf);
        if positions.is_empty() {
            return Err(Error::LeafNotFound {
                leaf: hex::encode(leaf),
            });
        }
        positions
            .into_iter()
            .map(|i| Ok((i, self.gen_proof(i)?)))
            .collect()
    }

    /// Checks `proof` for `leaf` against this tree's root.
    pub fn verify(&self, leaf: &T, proof: &Proof<T>) -> Verification {
        proof.validate::<A>(leaf, &self.root())
    }

    /// Returns merkle root
    pub fn root(&self) -> T {
        // build() never produces an empty layer list nor an empty top layer
        self.layers[self.layers.len() - 1].hashes[0].clone()
    }

    /// First position of `leaf` in layer 0.
    pub fn position_of(&self, leaf: &T) -> Option<usize> {
        self.leaves().iter().position(|l| l == leaf)
    }

    /// Every position of `leaf` in layer 0.
    pub fn positions_of(&self, leaf: &T) -> Vec<usize> {
        self.leaves()
            .iter()
            .enumerate()
            .filter(|(_, l)| *l == leaf)
            .map(|(i, _)| i)
            .collect()
    }

    /// Leaf digests in tree order.
    pub fn leaves(&self) -> &[T] {
        &self.layers[0].hashes
    }

    /// Leaf at position `i`.
    pub fn leaf(&self, i: usize) -> Option<&T> {
        self.layers[0].hashes.get(i)
    }

    /// All layers, leaves first, root last.
    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    /// Returns number of layers including the leaves and the root layer.
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    /// Returns original number of elements the tree was built upon.
    pub fn leafs(&self) -> usize {
        self.leafs
    }

    /// Returns total number of nodes across all layers.
    pub fn len(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Always `false`, a tree holds at least one leaf.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Options the tree was built with.
    pub fn config(&self) -> TreeConfig {
        self.config
    }
}

/// Longest possible proof for a tree of `leafs` leaves, `ceil(log2(leafs))`.
/// Also the number of layers above the leaves.
pub fn proof_max_len(leafs: usize) -> usize {
    if leafs <= 1 {
        return 0;
    }
    log2_pow2(next_pow2(leafs))
}

/// `next_pow2` returns next highest power of two from a given number if
/// it is not already a power of two.
pub fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}

/// find power of 2 of a number which is power of 2
pub fn log2_pow2(n: usize) -> usize {
    n.trailing_zeros() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_common::{get_vec_tree_from_slice, item, sorted_node, Item, XOR128};

    #[test]
    fn test_empty_input() {
        let t = MerkleTree::<Item, XOR128>::new(Vec::new());
        assert_eq!(t.unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let t = MerkleTree::<Item, XOR128>::new(vec![item(7)]).unwrap();
        assert_eq!(t.root(), item(7));
        assert_eq!(t.height(), 1);
        assert!(t.gen_proof(0).unwrap().is_empty());
    }

    #[test]
    fn test_odd_node_promoted() {
        let (a, b, c) = (item(3), item(1), item(2));
        let t = MerkleTree::<Item, XOR128>::new(vec![a, b, c]).unwrap();

        let ab = sorted_node(a, b);
        assert_eq!(t.layers()[1].hashes(), &[ab, c]);
        assert_eq!(
            t.layers()[1].nodes(),
            &[Node::Internal { left: 1, right: 0 }, Node::Promoted { child: 2 }]
        );
        assert_eq!(t.root(), sorted_node(ab, c));
        assert_eq!(t.height(), 3);
    }

    #[test]
    fn test_layer_counts() {
        for (leafs, above) in [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (1000, 10)] {
            let t = get_vec_tree_from_slice(leafs);
            assert_eq!(t.height() - 1, above, "leafs {}", leafs);
            assert_eq!(proof_max_len(leafs), above);
        }
    }

    #[test]
    fn test_proof_skips_promoted_layers() {
        let t = get_vec_tree_from_slice(5);
        assert_eq!(t.gen_proof(4).unwrap().len(), 1);
        assert_eq!(t.gen_proof(0).unwrap().len(), 3);
        assert_eq!(t.gen_proof(3).unwrap().len(), 3);
    }

    #[test]
    fn test_proof_positions_follow_sort_order() {
        let (a, b) = (item(9), item(4));
        let t = MerkleTree::<Item, XOR128>::new(vec![a, b]).unwrap();

        // b < a, so b was hashed first
        let p = t.gen_proof(0).unwrap();
        assert_eq!(p.steps()[0].sibling, b);
        assert_eq!(p.steps()[0].position, Position::Left);

        let p = t.gen_proof(1).unwrap();
        assert_eq!(p.steps()[0].sibling, a);
        assert_eq!(p.steps()[0].position, Position::Right);
    }

    #[test]
    fn test_swapping_pair_keeps_root() {
        let leaves: Vec<Item> = (0..7).map(|x| item(x * 11 + 1)).collect();
        let mut swapped = leaves.clone();
        swapped.swap(2, 3);

        let t1 = MerkleTree::<Item, XOR128>::new(leaves).unwrap();
        let t2 = MerkleTree::<Item, XOR128>::new(swapped).unwrap();
        assert_eq!(t1.root(), t2.root());
    }

    #[test]
    fn test_sort_leaves_is_permutation_invariant() {
        let leaves: Vec<Item> = (0..13).map(|x| item(x * 37 + 5)).collect();
        let mut reversed = leaves.clone();
        reversed.reverse();

        let config = TreeConfig::default().sort_leaves(true);
        let t1 = MerkleTree::<Item, XOR128>::new_with_config(leaves, config).unwrap();
        let t2 = MerkleTree::<Item, XOR128>::new_with_config(reversed, config).unwrap();
        assert_eq!(t1.root(), t2.root());
        assert!(t1.leaves().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let leaves: Vec<Item> = (0..777).map(|x| item(x * 93)).collect();
        let seq = MerkleTree::<Item, XOR128>::new_with_config(
            leaves.clone(),
            TreeConfig::default().parallel_threshold(usize::MAX),
        )
        .unwrap();
        let par = MerkleTree::<Item, XOR128>::new_with_config(
            leaves,
            TreeConfig::default().parallel_threshold(0),
        )
        .unwrap();
        assert_eq!(seq.layers(), par.layers());
    }

    #[test]
    fn test_proof_round_trip_all_sizes() {
        for leafs in 1..=33 {
            let t = get_vec_tree_from_slice(leafs);
            for i in 0..t.leafs() {
                let p = t.gen_proof(i).unwrap();
                assert!(p.len() <= proof_max_len(leafs));
                assert!(t.verify(&t.leaves()[i], &p).is_valid(), "leafs {} i {}", leafs, i);
            }
        }
    }

    #[test]
    fn test_lookup_by_digest() {
        let t = MerkleTree::<Item, XOR128>::new(vec![item(1), item(2), item(1), item(3)]).unwrap();

        assert_eq!(t.position_of(&item(3)), Some(3));
        assert_eq!(
            t.gen_proof_for_leaf(&item(3)).unwrap(),
            t.gen_proof(3).unwrap()
        );
        assert!(matches!(
            t.gen_proof_for_leaf(&item(9)),
            Err(Error::LeafNotFound { .. })
        ));
        assert_eq!(
            t.gen_proof_for_leaf(&item(1)).unwrap_err(),
            Error::AmbiguousLeaf {
                leaf: hex::encode(item(1)),
                positions: vec![0, 2],
            }
        );

        let all = t.proofs_for_leaf(&item(1)).unwrap();
        assert_eq!(all.len(), 2);
        for (i, p) in all {
            assert_eq!(p, t.gen_proof(i).unwrap());
            assert!(t.verify(&item(1), &p).is_valid());
        }
    }

    #[test]
    fn test_index_out_of_bounds() {
        let t = get_vec_tree_from_slice(3);
        assert_eq!(
            t.gen_proof(3).unwrap_err(),
            Error::IndexOutOfBounds { index: 3, leafs: 3 }
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shared_across_threads() {
        assert_send_sync::<MerkleTree<Item, XOR128>>();
        assert_send_sync::<crate::AllocationTree>();

        let t = get_vec_tree_from_slice(9);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..t.leafs())
                .map(|i| {
                    let t = &t;
                    s.spawn(move || {
                        let p = t.gen_proof(i).unwrap();
                        t.verify(t.leaf(i).unwrap(), &p).is_valid()
                    })
                })
                .collect();
            for h in handles {
                assert!(h.join().unwrap());
            }
        });
    }
}
