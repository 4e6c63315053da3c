use core::fmt;
use core::marker::PhantomData;
use core::num::NonZeroU32;

use crate::{HsError, HsResult};

/// Compact, stable identifier tagged with the kind of object it indexes.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id<_>>` to be pointer-optimized
/// - the tag stops a task handle from being used to index the thermal arena
pub struct Id<T> {
    raw: NonZeroU32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Largest index an Id can carry.
    pub const MAX_INDEX: usize = (u32::MAX - 1) as usize;

    /// Create an Id from a 0-based index by storing index+1.
    ///
    /// Indices above [`Self::MAX_INDEX`] saturate to it, so they all share one
    /// id. Arenas that can grow that far should use [`Self::try_from_index`].
    pub fn from_index(index: usize) -> Self {
        Self::try_from_index(index.min(Self::MAX_INDEX)).unwrap_or(Self {
            raw: NonZeroU32::MAX,
            _kind: PhantomData,
        })
    }

    /// Checked form of [`Self::from_index`].
    pub fn try_from_index(index: usize) -> HsResult<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| NonZeroU32::MIN.checked_add(i))
            .map(|raw| Self {
                raw,
                _kind: PhantomData,
            })
            .ok_or(HsError::InvalidArg {
                what: "id index exceeds the 32-bit range",
            })
    }

    /// Recover the 0-based index.
    pub fn index(self) -> usize {
        (self.raw.get() - 1) as usize
    }
}

// Manual impls: derives would put bounds on `T`.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> core::hash::Hash for Id<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Tag for thermal network nodes.
pub enum NodeTag {}
/// Tag for scheduler tasks.
pub enum TaskTag {}

/// Slot of a thermal unit in the network state vector.
pub type NodeId = Id<NodeTag>;
/// Registration slot of a task in the scheduler.
pub type TaskId = Id<TaskTag>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_usize, 1, 2, 42, 10_000] {
            let id = NodeId::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn oversized_index_is_refused_or_saturated() {
        assert_eq!(NodeId::MAX_INDEX, (u32::MAX - 1) as usize);
        assert_eq!(
            NodeId::try_from_index(NodeId::MAX_INDEX).unwrap().index(),
            NodeId::MAX_INDEX
        );
        assert!(NodeId::try_from_index(NodeId::MAX_INDEX + 1).is_err());
        assert!(TaskId::try_from_index(usize::MAX).is_err());
        assert_eq!(
            NodeId::from_index(usize::MAX),
            NodeId::from_index(NodeId::MAX_INDEX)
        );
    }

    proptest! {
        #[test]
        fn checked_and_saturating_agree_in_range(i in 0usize..=NodeId::MAX_INDEX) {
            let id = NodeId::try_from_index(i).unwrap();
            prop_assert_eq!(id, NodeId::from_index(i));
            prop_assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<NodeId>(),
            core::mem::size_of::<Option<NodeId>>()
        );
    }

    #[test]
    fn ids_order_by_index() {
        let a = TaskId::from_index(3);
        let b = TaskId::from_index(7);
        assert!(a < b);
        assert_eq!(format!("{a}"), "3");
    }
}
