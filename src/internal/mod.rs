//! Internal implementation details.

pub(crate) mod build_lock;
pub(crate) mod circular;

pub(crate) use build_lock::BuildLock;
pub(crate) use circular::ResolutionChain;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "ahash")]
pub(crate) type Set<K> = std::collections::HashSet<K, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Set<K> = std::collections::HashSet<K>;

// Build stacks rarely grow past a handful of frames
#[cfg(feature = "smallvec")]
pub(crate) type BuildStack = smallvec::SmallVec<[String; 8]>;
#[cfg(not(feature = "smallvec"))]
pub(crate) type BuildStack = Vec<String>;
