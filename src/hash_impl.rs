use crate::hash::Hashable;
use std::hash::Hasher;

// Integers are written little-endian regardless of the host, matching the
// BCS encoding of unsigned integers. `Hasher::write_u64` and friends use
// native byte order and are avoided on purpose.
macro_rules! impl_write_le {
    ($($ty:ident,)*) => {$(
        impl<H: Hasher> Hashable<H> for $ty {
            fn hash(&self, state: &mut H) {
                state.write(&self.to_le_bytes())
            }
        }
    )*}
}

impl_write_le! {
    u16,
    u32,
    u64,
    u128,
}

impl<H: Hasher> Hashable<H> for u8 {
    fn hash(&self, state: &mut H) {
        state.write_u8(*self)
    }

    fn hash_slice(data: &[u8], state: &mut H) {
        state.write(data)
    }
}

impl<H: Hasher> Hashable<H> for bool {
    fn hash(&self, state: &mut H) {
        state.write_u8(u8::from(*self))
    }
}

impl<H: Hasher> Hashable<H> for str {
    fn hash(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl<H: Hasher> Hashable<H> for String {
    fn hash(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

// Fixed size arrays carry no length prefix.
impl<H: Hasher, T: Hashable<H>, const N: usize> Hashable<H> for [T; N] {
    fn hash(&self, state: &mut H) {
        T::hash_slice(&self[..], state)
    }
}

macro_rules! impl_hash_tuple {
    ( $($name:ident)+) => (
        impl<Z: Hasher, $($name: Hashable<Z>),*> Hashable<Z> for ($($name,)*) {
            #[allow(non_snake_case)]
            fn hash(&self, state: &mut Z) {
                let ($(ref $name,)*) = *self;
                $($name.hash(state);)*
            }
        }
    );
}

impl_hash_tuple! { A }
impl_hash_tuple! { A B }
impl_hash_tuple! { A B C }
impl_hash_tuple! { A B C D }

impl<'a, H: Hasher, T: ?Sized + Hashable<H>> Hashable<H> for &'a T {
    fn hash(&self, state: &mut H) {
        (**self).hash(state);
    }
}
