use crate::level::Level;

/// Throttles serial writes: a level goes out only when it differs from the
/// last level actually sent by more than `threshold`.
///
/// Nothing has been sent initially, so the first level always passes.
/// Suppressed levels never move the reference point, so slow drift below the
/// threshold is only picked up by a later jump.
#[derive(Debug, Clone)]
pub struct TransmissionGate {
    threshold: u8,
    last_sent: Option<Level>,
}

impl TransmissionGate {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            last_sent: None,
        }
    }

    pub fn should_send(&self, level: Level) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => level.abs_diff(last) > self.threshold,
        }
    }

    /// Call only after the level was written successfully.
    pub fn record_sent(&mut self, level: Level) {
        self.last_sent = Some(level);
    }

    pub fn last_sent(&self) -> Option<Level> {
        self.last_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_level_always_sent() {
        for level in [0, 1, 2, 50, 100] {
            assert!(TransmissionGate::new(2).should_send(level));
        }
    }

    #[test]
    fn delta_must_exceed_threshold() {
        let mut gate = TransmissionGate::new(2);
        gate.record_sent(50);
        assert!(!gate.should_send(52));
        assert!(!gate.should_send(48));
        assert!(!gate.should_send(50));
        assert!(gate.should_send(53));
        assert!(gate.should_send(47));
    }

    #[test]
    fn held_levels_do_not_move_reference() {
        let mut gate = TransmissionGate::new(2);
        let mut sent = Vec::new();
        for level in [10, 11, 12, 20] {
            if gate.should_send(level) {
                gate.record_sent(level);
                sent.push(level);
            }
        }
        assert_eq!(sent, vec![10, 20]);
        assert_eq!(gate.last_sent(), Some(20));
    }

    #[test]
    fn slow_drift_is_never_resynchronized() {
        let mut gate = TransmissionGate::new(2);
        gate.record_sent(10);
        // Each step is within threshold of its neighbour but only the
        // distance from 10 matters.
        assert!(!gate.should_send(11));
        assert!(!gate.should_send(12));
        assert!(gate.should_send(13));
    }

    proptest! {
        #[test]
        fn decision_is_symmetric(last in 0u8..=100, level in 0u8..=100) {
            let mut a = TransmissionGate::new(2);
            a.record_sent(last);
            let mut b = TransmissionGate::new(2);
            b.record_sent(level);
            prop_assert_eq!(a.should_send(level), b.should_send(last));
        }

        #[test]
        fn same_level_is_never_resent(level in 0u8..=100, threshold in 0u8..10) {
            let mut gate = TransmissionGate::new(threshold);
            gate.record_sent(level);
            prop_assert!(!gate.should_send(level));
        }
    }
}
