use metrics::IntCounter;
use types::Slot;

/// Minimal fork-choice read capability the circuit breaker needs (spec.md §5: "Fork-choice
/// store: reads require a read-lock; CircuitBreaker takes it for the duration of its
/// computation and releases before returning").
pub trait ForkChoiceView: Send + Sync {
    /// Highest slot for which a block has been received by fork choice.
    fn highest_received_slot(&self) -> Option<Slot>;

    /// Number of blocks received in the trailing epoch ending at `current_slot`.
    fn blocks_received_in_last_epoch(&self, current_slot: Slot, slots_per_epoch: u64) -> u64;
}

/// Gates builder use on recent missed-slot statistics (spec.md §4.4).
pub struct CircuitBreaker {
    max_consecutive_missed_slots: u64,
    max_epoch_missed_slots: u64,
    slots_per_epoch: u64,
    triggered_count: Option<IntCounter>,
}

impl CircuitBreaker {
    pub fn new(
        max_consecutive_missed_slots: u64,
        max_epoch_missed_slots: u64,
        slots_per_epoch: u64,
        triggered_count: Option<IntCounter>,
    ) -> Self {
        Self {
            max_consecutive_missed_slots,
            max_epoch_missed_slots,
            slots_per_epoch,
            triggered_count,
        }
    }

    /// True when the builder should be disabled (spec.md §4.4): either the gap since the last
    /// received block exceeds `MaxBuilderConsecutiveMissedSlots`, or fewer than
    /// `SLOTS_PER_EPOCH - MaxBuilderEpochMissedSlots` blocks were received in the last epoch.
    /// Absent fork-choice access, the breaker reports "tripped".
    pub fn is_tripped(&self, fork_choice: Option<&dyn ForkChoiceView>, current_slot: Slot) -> bool {
        let Some(fork_choice) = fork_choice else {
            self.record_trip();
            return true;
        };

        let gap_tripped = match fork_choice.highest_received_slot() {
            Some(highest) => {
                current_slot.as_u64().saturating_sub(highest.as_u64())
                    > self.max_consecutive_missed_slots
            }
            None => true,
        };

        let received = fork_choice.blocks_received_in_last_epoch(current_slot, self.slots_per_epoch);
        let liveness_threshold = self.slots_per_epoch.saturating_sub(self.max_epoch_missed_slots);
        let liveness_tripped = received < liveness_threshold;

        let tripped = gap_tripped || liveness_tripped;
        if tripped {
            self.record_trip();
        }
        tripped
    }

    /// The builder may be used iff the breaker is not tripped (spec.md §4.4: "returns `false`
    /// (closed) only when both conditions are satisfied").
    pub fn is_closed(&self, fork_choice: Option<&dyn ForkChoiceView>, current_slot: Slot) -> bool {
        !self.is_tripped(fork_choice, current_slot)
    }

    fn record_trip(&self) {
        if let Some(counter) = &self.triggered_count {
            counter.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        highest_received_slot: Option<Slot>,
        blocks_received_in_last_epoch: u64,
    }

    impl ForkChoiceView for Fake {
        fn highest_received_slot(&self) -> Option<Slot> {
            self.highest_received_slot
        }

        fn blocks_received_in_last_epoch(&self, _current_slot: Slot, _slots_per_epoch: u64) -> u64 {
            self.blocks_received_in_last_epoch
        }
    }

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(3, 8, 32, None)
    }

    #[test]
    fn closed_when_liveness_is_healthy() {
        let fc = Fake {
            highest_received_slot: Some(Slot::new(100)),
            blocks_received_in_last_epoch: 30,
        };
        assert!(breaker().is_closed(Some(&fc), Slot::new(100)));
    }

    #[test]
    fn tripped_on_large_gap() {
        let fc = Fake {
            highest_received_slot: Some(Slot::new(90)),
            blocks_received_in_last_epoch: 30,
        };
        assert!(breaker().is_tripped(Some(&fc), Slot::new(100)));
    }

    #[test]
    fn tripped_on_epoch_liveness_shortfall() {
        let fc = Fake {
            highest_received_slot: Some(Slot::new(100)),
            blocks_received_in_last_epoch: 10,
        };
        assert!(breaker().is_tripped(Some(&fc), Slot::new(100)));
    }

    #[test]
    fn absent_fork_choice_is_tripped() {
        assert!(breaker().is_tripped(None, Slot::new(100)));
    }
}
