//! Argument-type signatures keying the delegate cache.

use std::any::TypeId;
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use smallvec::SmallVec;

use super::value::Value;

// Fixed seeds so equal signatures hash equally across expression instances.
const SEEDS: (u64, u64, u64, u64) = (
    0x7f4a_7c15_9e37_79b9,
    0x94d0_49bb_1331_11eb,
    0xbf58_476d_1ce4_e5b9,
    0x2545_f491_4f6c_dd1d,
);

/// Runtime-type fingerprint of one argument list.
///
/// Two invocations share a compiled delegate exactly when their signatures are
/// equal. The hash is computed once at construction; map lookups on the hot
/// invoke path only re-mix a single `u64`. Up to four argument ids live
/// inline without allocating.
#[derive(Debug, Clone)]
pub struct Signature {
    ids: SmallVec<[TypeId; 4]>,
    hash: u64,
}

impl Signature {
    /// Fingerprints the supplied argument values.
    pub fn of_values(args: &[Value]) -> Self {
        Self::from_ids(args.iter().map(Value::runtime_type))
    }

    pub fn from_ids(ids: impl IntoIterator<Item = TypeId>) -> Self {
        let ids: SmallVec<[TypeId; 4]> = ids.into_iter().collect();
        let mut hasher = RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3).build_hasher();
        for id in &ids {
            id.hash(&mut hasher);
        }
        Self {
            hash: hasher.finish(),
            ids,
        }
    }

    /// Number of argument slots.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.ids == other.ids
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
