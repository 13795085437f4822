use crate::hash::*;
use crate::merkle::{Element, MerkleTree};
use std::fmt;
use std::hash::Hasher;

pub const SIZE: usize = 0x10;

pub type Item = [u8; SIZE];

/// Toy 128-bit hasher. Every full pass over the state rotates the incoming
/// bytes one more bit, so `node(a, b) != node(b, a)` for `a != b`.
#[derive(Debug, Copy, Clone, Default)]
pub struct XOR128 {
    data: Item,
    i: usize,
}

impl XOR128 {
    pub fn new() -> XOR128 {
        XOR128 {
            data: [0; SIZE],
            i: 0,
        }
    }
}

impl Hasher for XOR128 {
    fn write(&mut self, bytes: &[u8]) {
        for x in bytes {
            let turn = (self.i / SIZE) as u32;
            self.data[self.i & (SIZE - 1)] ^= x.rotate_left(turn);
            self.i += 1;
        }
    }

    fn finish(&self) -> u64 {
        let mut h = [0u8; 8];
        h.copy_from_slice(&self.data[..8]);
        u64::from_le_bytes(h)
    }
}

impl Algorithm<Item> for XOR128 {
    #[inline]
    fn hash(&mut self) -> Item {
        self.data
    }

    #[inline]
    fn reset(&mut self) {
        *self = XOR128::new();
    }
}

impl fmt::UpperHex for XOR128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        for b in self.data.as_ref() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl Element for Item {}

/// Item whose first 8 bytes are `x` big-endian, so items order like `x`.
pub fn item(x: u64) -> Item {
    let mut el = [0u8; SIZE];
    el[..8].copy_from_slice(&x.to_be_bytes());
    el
}

/// Parent of `a` and `b` under the sorted-pair rule.
pub fn sorted_node(a: Item, b: Item) -> Item {
    XOR128::new().node(a, b)
}

pub fn get_vec_tree_from_slice(leafs: usize) -> MerkleTree<Item, XOR128> {
    let x: Vec<u64> = (0..leafs as u64).map(|i| i * 93 + 1).collect();
    MerkleTree::from_data(&x).expect("failed to create tree from slice")
}
