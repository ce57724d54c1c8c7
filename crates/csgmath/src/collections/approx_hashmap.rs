//! Approximate hash map for floating-point values such as transforms, using a
//! `BTreeMap` to record arbitrary hash values for floats.

pub use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use float_ord::FloatOrd;
use smallvec::SmallVec;

use crate::*;

/// Arbitrary hash value for a float.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FloatHash(u32);

/// Approximate hash map for objects with floating-point values, using a
/// `BTreeMap` to record arbitrary hash values for floats.
///
/// Floats within `epsilon` of a previously hashed float share its hash. The
/// default is [`EPSILON`].
#[derive(Clone)]
pub struct ApproxHashMap<K: ApproxHashMapKey, V> {
    keys: HashMap<K::Hash, K>,
    values: HashMap<K::Hash, V>,
    float_hashes: BTreeMap<FloatOrd<Float>, FloatHash>,
    epsilon: Float,
}
impl<K: ApproxHashMapKey, V> Default for ApproxHashMap<K, V> {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
            values: HashMap::new(),
            float_hashes: BTreeMap::new(),
            epsilon: EPSILON,
        }
    }
}
impl<K: ApproxHashMapKey + fmt::Debug, V: fmt::Debug> fmt::Debug for ApproxHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.keys.iter().map(|(hash, k)| (k, self.values.get(hash)));
        f.debug_map().entries(entries).finish()
    }
}
impl<K: ApproxHashMapKey, V> ApproxHashMap<K, V> {
    /// Constructs an empty map.
    pub fn new() -> Self {
        ApproxHashMap::default()
    }
    /// Constructs an empty map that merges floats within `epsilon`.
    pub fn with_epsilon(epsilon: Float) -> Self {
        debug_assert!(epsilon >= 0.0);
        Self {
            epsilon,
            ..ApproxHashMap::default()
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.values.len()
    }
    /// Returns whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Inserts an entry into the map and returns the old value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash_key = key.approx_hash(|x| self.hash_float(x));
        self.keys.insert(hash_key.clone(), key);
        self.values.insert(hash_key, value)
    }
    /// Returns the entry for a key (or something approximately equal). The
    /// first key inserted is the one retained.
    pub fn entry(&mut self, key: K) -> Entry<'_, K::Hash, V> {
        let hash_key = key.approx_hash(|x| self.hash_float(x));
        self.keys.entry(hash_key.clone()).or_insert(key);
        self.values.entry(hash_key)
    }
    /// Returns the value in the map associated to the given key (or something
    /// approximately equal).
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash_key = key.try_approx_hash(|x| self.try_hash_float(x))?;
        self.values.get(&hash_key)
    }

    /// Searches for an existing hash value for a float that is approximately
    /// equal to `x`, and returns it if found.
    fn try_hash_float(&self, x: Float) -> Option<FloatHash> {
        self.float_hashes
            .range(FloatOrd(x - self.epsilon)..=FloatOrd(x + self.epsilon))
            .next()
            .map(|(_, &hash)| hash)
    }
    /// Searches for an existing hash value for a float that is approximately
    /// equal to `x`, and returns it if found. If none is found, assigns a new
    /// hash value to `x` and returns that.
    fn hash_float(&mut self, x: Float) -> FloatHash {
        self.try_hash_float(x).unwrap_or_else(|| {
            let new_hash = FloatHash(
                self.float_hashes
                    .len()
                    .try_into()
                    .expect("too many unique floats"),
            );
            self.float_hashes.insert(FloatOrd(x), new_hash);
            new_hash
        })
    }

    /// Returns an iterator over all keys and values in the map.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter().map(|(k, v)| (&self.keys[k], v))
    }
}

/// Type that can be used as a key in an [`ApproxHashMap`].
pub trait ApproxHashMapKey {
    /// Hashable representation of the type, using [`FloatHash`] instead of any
    /// floating-point values.
    type Hash: fmt::Debug + Clone + Eq + Hash;

    /// Returns a hashable representation of a value, using [`FloatHash`]
    /// instead of any floating-point values.
    fn approx_hash(&self, float_hash_fn: impl FnMut(Float) -> FloatHash) -> Self::Hash;

    /// Returns a hashable representation of a value, or `None` if
    /// `float_hash_fn` ever returns `None`.
    fn try_approx_hash(
        &self,
        mut float_hash_fn: impl FnMut(Float) -> Option<FloatHash>,
    ) -> Option<Self::Hash> {
        let mut success = true;
        Some(self.approx_hash(|x| match float_hash_fn(x) {
            Some(h) => h,
            None => {
                success = false;
                FloatHash(0)
            }
        }))
        .filter(|_| success)
    }
}

/// Value derived from a list of floats that can be hashed. Don't use this
/// directly; use via [`ApproxHashMap`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct FloatsHash(u8, SmallVec<[FloatHash; 12]>);

impl ApproxHashMapKey for Real3 {
    type Hash = FloatsHash;

    fn approx_hash(&self, float_hash_fn: impl FnMut(Float) -> FloatHash) -> Self::Hash {
        FloatsHash(0, self.iter().map(float_hash_fn).collect())
    }
}

impl ApproxHashMapKey for VariantTransform {
    type Hash = FloatsHash;

    fn approx_hash(&self, float_hash_fn: impl FnMut(Float) -> FloatHash) -> Self::Hash {
        match self {
            VariantTransform::None(_) => FloatsHash(0, SmallVec::new()),
            VariantTransform::Translation(Translation(t)) => {
                FloatsHash(1, t.iter().map(float_hash_fn).collect())
            }
            VariantTransform::Transformation(t) => {
                let rot = t.rotation().0;
                let floats = rot.as_flattened().iter().copied().chain(t.translation().iter());
                FloatsHash(2, floats.map(float_hash_fn).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_hashmap_transforms() {
        let mut map = ApproxHashMap::<VariantTransform, usize>::new();
        let a = VariantTransform::from(Translation(real3(1.0, 0.0, 0.0)));
        let b = VariantTransform::from(Translation(real3(1.0 + EPSILON / 10.0, 0.0, 0.0)));
        let c = VariantTransform::from(Translation(real3(2.0, 0.0, 0.0)));
        assert_eq!(map.insert(a, 0), None);
        assert_eq!(map.get(&b), Some(&0));
        assert_eq!(map.get(&c), None);
        *map.entry(c).or_insert(1) += 10;
        assert_eq!(map.get(&c), Some(&11));
        assert_eq!(map.len(), 2);

        // Identity and translation never collide
        assert_eq!(map.get(&VariantTransform::default()), None);
    }

    #[test]
    fn test_approx_hashmap_epsilon() {
        let a = VariantTransform::from(Translation(real3(1.0, 0.0, 0.0)));
        let b = VariantTransform::from(Translation(real3(1.001, 0.0, 0.0)));

        let mut loose = ApproxHashMap::<VariantTransform, usize>::with_epsilon(0.01);
        loose.insert(a, 0);
        assert_eq!(loose.get(&b), Some(&0));

        let mut strict = ApproxHashMap::<VariantTransform, usize>::new();
        strict.insert(a, 0);
        assert_eq!(strict.get(&b), None);
    }
}
