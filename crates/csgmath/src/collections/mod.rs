//! Collections for index newtypes and approximate float keys.

#[macro_use]
pub mod generic_vec;
mod approx_hashmap;
mod float_buckets;

pub use approx_hashmap::{ApproxHashMap, ApproxHashMapKey, FloatHash};
pub use float_buckets::FloatBuckets;
pub use generic_vec::{GenericVec, IndexNewtype, IndexOutOfRange, IndexOverflow};
