//! Fixed-width bitsets over repeat class ids.
//!
//! Equality and hashing depend only on which ids are present, never on how the set was built
//! or how wide it is, so two signatures over the same classes compare equal wherever they came
//! from.

use std::fmt;
use std::hash::{Hash, Hasher};

const WORD_BITS: usize = 64;

#[derive(Clone, Default)]
pub struct ClassSet {
    words: Vec<u64>,
}

impl ClassSet {
    /// Words up to the last non-zero one
    fn significant_words(&self) -> &[u64] {
        let end = self.words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        &self.words[..end]
    }

    /// Empty set able to hold ids in `0..universe`
    pub fn new(universe: usize) -> Self {
        Self {
            words: vec![0; universe.div_ceil(WORD_BITS)],
        }
    }

    /// Build a set from class ids; `universe` must exceed every id
    pub fn from_ids<I: IntoIterator<Item = u32>>(universe: usize, ids: I) -> Self {
        let mut set = Self::new(universe);
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn insert(&mut self, id: u32) {
        let id = id as usize;
        self.words[id / WORD_BITS] |= 1u64 << (id % WORD_BITS);
    }

    pub fn contains(&self, id: u32) -> bool {
        let id = id as usize;
        self.words
            .get(id / WORD_BITS)
            .is_some_and(|word| word & (1u64 << (id % WORD_BITS)) != 0)
    }

    /// Number of classes in the set
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some((i * WORD_BITS + bit) as u32)
            })
        })
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// In-place union, widening `self` when `other` is wider
    pub fn union_with(&mut self, other: &ClassSet) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }
}

/// `a ∪ b`
pub fn union(a: &ClassSet, b: &ClassSet) -> ClassSet {
    let mut out = a.clone();
    out.union_with(b);
    out
}

/// `a \ b`
pub fn difference(a: &ClassSet, b: &ClassSet) -> ClassSet {
    let words = a
        .words
        .iter()
        .enumerate()
        .map(|(i, &w)| w & !b.words.get(i).copied().unwrap_or(0))
        .collect();
    ClassSet { words }
}

/// `a ⊆ b`
pub fn is_subset(a: &ClassSet, b: &ClassSet) -> bool {
    a.words
        .iter()
        .enumerate()
        .all(|(i, &w)| w & !b.words.get(i).copied().unwrap_or(0) == 0)
}

impl PartialEq for ClassSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for ClassSet {}

impl Hash for ClassSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

impl fmt::Debug for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
