//! Fixed-capacity storage paired with an explicit valid length.
//!
//! Mirrors the contract's `T[N]` + count layout: the backing array always has
//! `N` slots, but only the first `len` are ever exposed.

use std::fmt;

/// Clamp an untrusted, contract-declared count into `[0, capacity]`.
pub fn clamp_count(declared: i64, capacity: usize) -> usize {
    if declared <= 0 {
        0
    } else {
        (declared as u64).min(capacity as u64) as usize
    }
}

/// A value type holding at most `N` items.
#[derive(Clone, Copy)]
pub struct Bounded<T, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Bounded<T, N> {
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
        }
    }

    /// Adopt a full backing array whose valid length is declared by a peer.
    ///
    /// The declared count is clamped to the capacity and slots past it are
    /// reset, so nothing beyond `len` survives.
    pub fn from_backing(mut items: [T; N], declared: i64) -> Self {
        let len = clamp_count(declared, N);
        for slot in &mut items[len..] {
            *slot = T::default();
        }
        Self { items, len }
    }

    /// Append an item, handing it back if the container is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.len == N {
            return Err(item);
        }
        self.items[self.len] = item;
        self.len += 1;
        Ok(())
    }

    /// Full-capacity copy with unused slots zero-filled, ready for the wire.
    pub fn to_backing(&self) -> [T; N] {
        let mut out = [T::default(); N];
        out[..self.len].copy_from_slice(self.as_slice());
        out
    }
}

impl<T, const N: usize> Bounded<T, N> {
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }
}

impl<T: Copy + Default, const N: usize> Default for Bounded<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, const N: usize> PartialEq for Bounded<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for Bounded<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Bounded<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a Bounded<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "json")]
impl<T: serde::Serialize, const N: usize> serde::Serialize for Bounded<T, N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_untrusted_counts() {
        assert_eq!(clamp_count(-3, 8), 0);
        assert_eq!(clamp_count(0, 8), 0);
        assert_eq!(clamp_count(5, 8), 5);
        assert_eq!(clamp_count(99, 8), 8);
        assert_eq!(clamp_count(i64::MAX, 32), 32);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut b = Bounded::<u32, 2>::new();
        assert_eq!(b.push(1), Ok(()));
        assert_eq!(b.push(2), Ok(()));
        assert!(b.is_full());
        assert_eq!(b.push(3), Err(3));
        assert_eq!(b.as_slice(), &[1, 2]);
    }

    #[test]
    fn backing_hides_slots_past_count() {
        let b = Bounded::<u8, 4>::from_backing([9, 8, 7, 6], 2);
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(2), None);
        assert_eq!(b.to_backing(), [9, 8, 0, 0]);

        // equality ignores what used to live past the count
        let c = Bounded::<u8, 4>::from_backing([9, 8, 1, 1], 2);
        assert_eq!(b, c);
    }
}
