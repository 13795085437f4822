use std::hash::Hasher;

use crate::merkle::Element;

/// A hashable type.
///
/// Types implementing `Hashable` are able to be [`hash`]ed with an instance of
/// [`Hasher`]. Unlike `std::hash::Hash`, implementations must write a stable,
/// platform independent byte layout, because the bytes fed into the state are
/// what external verifiers recompute.
///
/// ```text
/// struct Allocation {
///     account: [u8; 32],
///     amount: u64,
/// }
///
/// impl<H: Hasher> Hashable<H> for Allocation {
///     fn hash(&self, state: &mut H) {
///         self.account.hash(state);
///         self.amount.hash(state);
///     }
/// }
/// ```
///
/// ## `Hashable` and `Eq`
///
/// ```text
/// k1 == k2 -> hash(k1) == hash(k2)
/// ```
///
/// [`hash`]: Hashable::hash
pub trait Hashable<H: Hasher> {
    /// Feeds this value into the given [`Hasher`].
    fn hash(&self, state: &mut H);

    /// Feeds a slice of this type into the given [`Hasher`].
    fn hash_slice(data: &[Self], state: &mut H)
    where
        Self: Sized,
    {
        for piece in data {
            piece.hash(state);
        }
    }
}

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait and provides methods to return
/// full length hash and reset current state. `leaf` and `node` define how the
/// tree turns data into leaves and pairs into parents.
pub trait Algorithm<T>: Hasher + Default
where
    T: Element,
{
    /// Returns the hash value for the data stream written so far.
    fn hash(&mut self) -> T;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Returns the leaf hash of `data`. No prefix is written, the leaf is the
    /// plain digest of the serialized value.
    fn leaf<O: Hashable<Self> + ?Sized>(&mut self, data: &O) -> T {
        self.reset();
        data.hash(self);
        self.hash()
    }

    /// Returns the parent of two sibling nodes, smaller digest written first.
    fn node(&mut self, a: T, b: T) -> T {
        let (left, right) = sorted_pair(a, b);
        self.reset();
        self.write(left.as_ref());
        self.write(right.as_ref());
        self.hash()
    }
}

/// Orders two siblings for hashing: `(min, max)` by unsigned byte comparison.
#[inline]
pub fn sorted_pair<T: Ord>(a: T, b: T) -> (T, T) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}
