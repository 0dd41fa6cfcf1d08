use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Non-negative count of resource subunits held by one node.
pub type Amount = u64;

/// Identity of a transported resource kind.
///
/// Every flavor (fluid, item, ...) supplies its own key type. [`EMPTY`]
/// means "no resource claimed".
///
/// [`EMPTY`]: ResourceKey::EMPTY
pub trait ResourceKey:
    Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static
{
    /// Sentinel for "no resource".
    const EMPTY: Self;

    fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestKey;

    #[test]
    fn empty_sentinel_is_empty() {
        assert!(TestKey::EMPTY.is_empty());
        assert!(!TestKey(7).is_empty());
    }
}
