//! Observation and action spaces.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A set of elements, such as the possible observations or actions of an
/// environment.
pub trait Space {
    type Element;

    /// Whether the space contains a particular value.
    fn contains(&self, value: &Self::Element) -> bool;
}

/// A space containing finitely many elements, identified by index.
pub trait FiniteSpace: Space {
    /// The number of elements in the space.
    fn size(&self) -> usize;

    /// The index of an element. Must be in `0..size()`.
    fn to_index(&self, element: &Self::Element) -> usize;

    /// The element with a given index, if the index is valid.
    fn from_index(&self, index: usize) -> Option<Self::Element>;
}

/// A space from which elements can be sampled uniformly at random.
pub trait SampleSpace: Space {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element;
}

/// An index space; the integers `0 .. size-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpace {
    pub size: usize,
}

impl IndexSpace {
    pub const fn new(size: usize) -> Self {
        Self { size }
    }
}

impl fmt::Display for IndexSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IndexSpace({})", self.size)
    }
}

impl Space for IndexSpace {
    type Element = usize;

    fn contains(&self, value: &Self::Element) -> bool {
        value < &self.size
    }
}

impl FiniteSpace for IndexSpace {
    fn size(&self) -> usize {
        self.size
    }

    fn to_index(&self, element: &Self::Element) -> usize {
        *element
    }

    fn from_index(&self, index: usize) -> Option<Self::Element> {
        if index < self.size {
            Some(index)
        } else {
            None
        }
    }
}

impl SampleSpace for IndexSpace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        rng.gen_range(0..self.size)
    }
}

/// A space containing a single element, `()`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingletonSpace;

impl SingletonSpace {
    pub const fn new() -> Self {
        Self
    }
}

impl fmt::Display for SingletonSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SingletonSpace")
    }
}

impl Space for SingletonSpace {
    type Element = ();

    fn contains(&self, _value: &Self::Element) -> bool {
        true
    }
}

impl FiniteSpace for SingletonSpace {
    fn size(&self) -> usize {
        1
    }

    fn to_index(&self, _element: &Self::Element) -> usize {
        0
    }

    fn from_index(&self, index: usize) -> Option<Self::Element> {
        if index == 0 {
            Some(())
        } else {
            None
        }
    }
}

impl SampleSpace for SingletonSpace {
    fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) -> Self::Element {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn index_space_contains() {
        let space = IndexSpace::new(3);
        assert!(space.contains(&0));
        assert!(space.contains(&2));
        assert!(!space.contains(&3));
    }

    #[test]
    fn index_space_round_trip() {
        let space = IndexSpace::new(4);
        for i in 0..4 {
            assert_eq!(space.from_index(i), Some(i));
            assert_eq!(space.to_index(&i), i);
        }
        assert_eq!(space.from_index(4), None);
    }

    #[test]
    fn index_space_samples_in_range() {
        let space = IndexSpace::new(5);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert!(space.contains(&space.sample(&mut rng)));
        }
    }

    #[test]
    fn singleton_space() {
        let space = SingletonSpace::new();
        assert_eq!(space.size(), 1);
        assert_eq!(space.to_index(&()), 0);
        assert_eq!(space.from_index(1), None);
    }
}
