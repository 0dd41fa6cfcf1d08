//! Diagnostics emitted while ticking nodes.
//!
//! Invariant violations caused by inconsistent outside state are never
//! fatal: the tick clamps, logs, and records one of these events.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::id::NetworkId;
use crate::resource::{Amount, ResourceKey};

/// Events recorded during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "R: ResourceKey")]
pub enum PipeEvent<R: ResourceKey> {
    /// Buffer held more than the network capacity and was truncated.
    BufferOverCapacity { amount: Amount, capacity: Amount },
    /// Buffer was positive while the network held no resource; it was zeroed.
    BufferWithoutResource { amount: Amount },
    /// An endpoint returned more than it was asked for. The excess was
    /// discarded.
    ProviderOverdelivered {
        direction: Direction,
        requested: Amount,
        returned: Amount,
    },
    /// An endpoint yielded a positive amount without naming the resource.
    /// The amount was discarded.
    UnnamedExtraction { direction: Direction, amount: Amount },
    /// An empty network adopted a new resource pulled through `direction`.
    ResourceAdopted {
        resource: R,
        amount: Amount,
        direction: Direction,
    },
    /// Every member of a network emptied, so its resource claim was released.
    NetworkDrained { network: NetworkId },
}

impl<R: ResourceKey> PipeEvent<R> {
    /// Whether this event reports a state inconsistency rather than normal
    /// operation.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            PipeEvent::BufferOverCapacity { .. }
                | PipeEvent::BufferWithoutResource { .. }
                | PipeEvent::ProviderOverdelivered { .. }
                | PipeEvent::UnnamedExtraction { .. }
        )
    }
}

/// Running totals of invariant violations seen by one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesyncCounters {
    pub over_capacity: u32,
    pub without_resource: u32,
    pub provider_violations: u32,
}

impl DesyncCounters {
    pub fn total(&self) -> u32 {
        self.over_capacity
            .saturating_add(self.without_resource)
            .saturating_add(self.provider_violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestKey;

    #[test]
    fn desync_classification() {
        let over: PipeEvent<TestKey> = PipeEvent::BufferOverCapacity {
            amount: 10,
            capacity: 5,
        };
        let adopted = PipeEvent::ResourceAdopted {
            resource: TestKey(1),
            amount: 5,
            direction: Direction::Up,
        };
        assert!(over.is_desync());
        assert!(!adopted.is_desync());
    }

    #[test]
    fn counters_total() {
        let counters = DesyncCounters {
            over_capacity: 1,
            without_resource: 2,
            provider_violations: 3,
        };
        assert_eq!(counters.total(), 6);
        assert_eq!(DesyncCounters::default().total(), 0);
    }

    #[test]
    fn counters_total_saturates() {
        let counters = DesyncCounters {
            over_capacity: u32::MAX,
            without_resource: 1,
            provider_violations: u32::MAX,
        };
        assert_eq!(counters.total(), u32::MAX);
    }
}
