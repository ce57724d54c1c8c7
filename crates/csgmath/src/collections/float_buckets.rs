//! Ordered multimap keyed by a float, queried by approximate key.

use std::collections::BTreeMap;

use float_ord::FloatOrd;
use smallvec::SmallVec;

use crate::Float;

/// Multimap from floating-point keys to values, supporting lookup of every
/// value whose key lies within a window around a query point.
///
/// Values with identical keys are kept in insertion order.
#[derive(Debug, Clone)]
pub struct FloatBuckets<V> {
    buckets: BTreeMap<FloatOrd<Float>, SmallVec<[V; 2]>>,
}
impl<V> Default for FloatBuckets<V> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}
impl<V> FloatBuckets<V> {
    /// Constructs an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value at a key.
    pub fn insert(&mut self, key: Float, value: V) {
        self.buckets.entry(FloatOrd(key)).or_default().push(value);
    }

    /// Returns every value whose key is in `[center - half_width, center +
    /// half_width]`, ordered by key.
    pub fn find_near(&self, center: Float, half_width: Float) -> impl Iterator<Item = &V> {
        self.buckets
            .range(FloatOrd(center - half_width)..=FloatOrd(center + half_width))
            .flat_map(|(_, values)| values)
    }

    /// Returns the total number of values.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|v| v.len()).sum()
    }
    /// Returns whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_buckets() {
        let mut b = FloatBuckets::new();
        b.insert(1.0, 'a');
        b.insert(1.05, 'b');
        b.insert(1.0, 'c');
        b.insert(2.0, 'd');
        assert_eq!(b.len(), 4);
        let near: Vec<_> = b.find_near(1.0, 0.1).copied().collect();
        assert_eq!(near, ['a', 'c', 'b']);
        assert_eq!(b.find_near(1.5, 0.1).count(), 0);
        assert_eq!(b.find_near(Float::INFINITY, 0.1).count(), 0);
    }
}
