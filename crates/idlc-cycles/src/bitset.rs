//! Fixed-universe bitset
//!
//! Used by the partitioner to track reachability and forbidden merges. Every
//! bitset is created for a declared universe of `n` bits; combining bitsets
//! from different universes is a programming error and panics.

const WORD_BITS: usize = u64::BITS as usize;

/// A set of small integers in `0..len`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bitset {
    len: usize,
    words: Vec<u64>,
}

impl Bitset {
    /// Create an empty bitset over the universe `0..len`
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    /// Create a bitset holding exactly one element
    pub fn singleton(len: usize, index: usize) -> Self {
        let mut set = Self::new(len);
        set.insert(index);
        set
    }

    /// Size of the universe
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the set has no elements
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Add `index` to the set
    pub fn insert(&mut self, index: usize) {
        self.check_index(index);
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Remove `index` from the set
    pub fn remove(&mut self, index: usize) {
        self.check_index(index);
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    /// Check whether `index` is in the set
    pub fn has(&self, index: usize) -> bool {
        self.check_index(index);
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Union of `self` and `other` as a new bitset
    pub fn union(&self, other: &Bitset) -> Bitset {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// In-place union
    pub fn union_with(&mut self, other: &Bitset) {
        self.check_universe(other);
        for (word, theirs) in self.words.iter_mut().zip(&other.words) {
            *word |= theirs;
        }
    }

    /// Elements of `self` that are not in `other`
    pub fn difference(&self, other: &Bitset) -> Bitset {
        self.check_universe(other);
        Bitset {
            len: self.len,
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(ours, theirs)| ours & !theirs)
                .collect(),
        }
    }

    /// Check whether the two sets share an element
    pub fn intersects(&self, other: &Bitset) -> bool {
        self.check_universe(other);
        self.words
            .iter()
            .zip(&other.words)
            .any(|(ours, theirs)| ours & theirs != 0)
    }

    /// Number of elements in the set
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the elements in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "bit index {} out of range for universe of {}",
            index,
            self.len
        );
    }

    fn check_universe(&self, other: &Bitset) {
        assert_eq!(
            self.len, other.len,
            "bitset universe mismatch: {} vs {}",
            self.len, other.len
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_has() {
        let mut set = Bitset::new(130);
        assert!(!set.has(0));

        set.insert(0);
        set.insert(64);
        set.insert(129);
        assert!(set.has(0));
        assert!(set.has(64));
        assert!(set.has(129));
        assert!(!set.has(65));
        assert_eq!(set.count(), 3);

        set.remove(64);
        assert!(!set.has(64));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_union_and_intersects() {
        let a = Bitset::singleton(100, 3);
        let b = Bitset::singleton(100, 70);
        assert!(!a.intersects(&b));

        let both = a.union(&b);
        assert!(both.intersects(&a));
        assert!(both.intersects(&b));
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![3, 70]);
    }

    #[test]
    fn test_difference() {
        let mut a = Bitset::new(10);
        a.insert(1);
        a.insert(2);
        a.insert(9);
        let b = Bitset::singleton(10, 2);

        assert_eq!(a.difference(&b).iter().collect::<Vec<_>>(), vec![1, 9]);
    }

    #[test]
    fn test_is_empty_tracks_elements() {
        let mut set = Bitset::new(70);
        assert!(set.is_empty());
        assert_eq!(set.len(), 70);

        set.insert(65);
        assert!(!set.is_empty());

        set.remove(65);
        assert!(set.is_empty());
        assert!(!Bitset::singleton(3, 0).is_empty());
    }

    #[test]
    fn test_empty_universe() {
        let a = Bitset::new(0);
        assert!(a.is_empty());
        assert!(!a.intersects(&Bitset::new(0)));
        assert_eq!(a.iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "universe mismatch")]
    fn test_mismatched_universe_panics() {
        let a = Bitset::new(8);
        let b = Bitset::new(9);
        a.intersects(&b);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let mut a = Bitset::new(8);
        a.insert(8);
    }
}
