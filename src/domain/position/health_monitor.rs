//! Per-position range health tracking with out-of-range hysteresis

use tracing::{debug, info, warn};

use super::{HealthState, HealthVerdict, PositionHealth};
use crate::shared::types::{PositionId, PositionSnapshot};

/// Decides when a position has been out of range long enough to pull it.
///
/// A single stray tick never triggers an exit: the position must be observed
/// out of range for `threshold` consecutive cycles, and any in-range
/// observation resets the count.
#[derive(Debug, Clone, Copy)]
pub struct PositionHealthMonitor {
    threshold: u32,
}

impl PositionHealthMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Advance `health` by one monitoring cycle
    pub fn observe(&self, id: PositionId, health: &mut PositionHealth, snapshot: &PositionSnapshot) -> HealthVerdict {
        if health.state == HealthState::Closed {
            debug!("Position {} already closed, ignoring observation", id);
            return HealthVerdict::AlreadyClosed;
        }

        health.tick_range = snapshot.range();

        if snapshot.is_in_range() {
            if health.state == HealthState::OutOfRange {
                info!(
                    "✅ Position {} back in range {} at tick {} after {} cycle(s) out",
                    id, health.tick_range, snapshot.current_tick, health.consecutive_out_of_range
                );
            }
            health.state = HealthState::InRange;
            health.consecutive_out_of_range = 0;
            return HealthVerdict::InRange;
        }

        health.consecutive_out_of_range += 1;
        let count = health.consecutive_out_of_range;

        if count >= self.threshold {
            warn!(
                "🚨 Position {} out of range {} for {} consecutive cycles (tick {}), removing",
                id, health.tick_range, count, snapshot.current_tick
            );
            health.state = HealthState::Closed;
            return HealthVerdict::Remove { count };
        }

        health.state = HealthState::OutOfRange;
        info!(
            "⚠️ Position {} out of range {} at tick {} ({}/{})",
            id, health.tick_range, snapshot.current_tick, count, self.threshold
        );
        HealthVerdict::OutOfRange {
            count,
            threshold: self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::TickRange;

    const IN: i32 = 0;
    const OUT: i32 = 500;

    fn snapshot(current_tick: i32) -> PositionSnapshot {
        PositionSnapshot {
            tick_lower: -60,
            tick_upper: 60,
            current_tick,
        }
    }

    fn fresh() -> PositionHealth {
        PositionHealth::new(TickRange::new(-60, 60).unwrap())
    }

    #[test]
    fn test_in_range_resets_counter() {
        let monitor = PositionHealthMonitor::new(3);
        let id = PositionId::new(1);
        let mut health = fresh();

        let verdicts: Vec<_> = [OUT, OUT, IN, OUT, OUT, OUT]
            .into_iter()
            .map(|tick| monitor.observe(id, &mut health, &snapshot(tick)))
            .collect();

        assert_eq!(
            verdicts,
            vec![
                HealthVerdict::OutOfRange { count: 1, threshold: 3 },
                HealthVerdict::OutOfRange { count: 2, threshold: 3 },
                HealthVerdict::InRange,
                HealthVerdict::OutOfRange { count: 1, threshold: 3 },
                HealthVerdict::OutOfRange { count: 2, threshold: 3 },
                HealthVerdict::Remove { count: 3 },
            ]
        );
        let removals = verdicts.iter().filter(|v| v.is_removal()).count();
        assert_eq!(removals, 1);
        assert_eq!(health.state, HealthState::Closed);
    }

    #[test]
    fn test_closed_position_never_removed_twice() {
        let monitor = PositionHealthMonitor::new(1);
        let id = PositionId::new(7);
        let mut health = fresh();

        assert_eq!(monitor.observe(id, &mut health, &snapshot(OUT)), HealthVerdict::Remove { count: 1 });
        assert_eq!(monitor.observe(id, &mut health, &snapshot(OUT)), HealthVerdict::AlreadyClosed);
        assert_eq!(monitor.observe(id, &mut health, &snapshot(IN)), HealthVerdict::AlreadyClosed);
    }

    #[test]
    fn test_boundary_ticks_count_as_in_range() {
        let monitor = PositionHealthMonitor::new(2);
        let id = PositionId::new(2);
        let mut health = fresh();

        assert_eq!(monitor.observe(id, &mut health, &snapshot(-60)), HealthVerdict::InRange);
        assert_eq!(monitor.observe(id, &mut health, &snapshot(60)), HealthVerdict::InRange);
        assert_eq!(
            monitor.observe(id, &mut health, &snapshot(61)),
            HealthVerdict::OutOfRange { count: 1, threshold: 2 }
        );
        assert_eq!(monitor.observe(id, &mut health, &snapshot(-61)), HealthVerdict::Remove { count: 2 });
    }

    #[test]
    fn test_default_threshold_needs_ten_cycles() {
        let monitor = PositionHealthMonitor::new(10);
        let id = PositionId::new(3);
        let mut health = fresh();

        for expected in 1..10 {
            assert_eq!(
                monitor.observe(id, &mut health, &snapshot(OUT)),
                HealthVerdict::OutOfRange { count: expected, threshold: 10 }
            );
        }
        assert_eq!(monitor.observe(id, &mut health, &snapshot(OUT)), HealthVerdict::Remove { count: 10 });
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(PositionHealthMonitor::new(0).threshold(), 1);
    }

    #[test]
    fn test_snapshot_range_refreshes_tracked_range() {
        let monitor = PositionHealthMonitor::new(5);
        let mut health = fresh();
        let moved = PositionSnapshot {
            tick_lower: 120,
            tick_upper: 240,
            current_tick: 180,
        };
        monitor.observe(PositionId::new(4), &mut health, &moved);
        assert_eq!(health.tick_range, TickRange::new(120, 240).unwrap());
    }
}
