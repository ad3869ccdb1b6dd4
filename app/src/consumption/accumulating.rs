use crate::core::time::{DateTime, Duration};
use crate::core::unit::KiloWattHours;

use super::{ConsumptionSnapshot, ENERGY_UNIT, parse_period};

/// Running total across all time. The device reports one cumulative counter
/// per hour, which may keep growing for the previous hour after the current
/// hour has started, so bookkeeping tracks a rolling two-hour window: the
/// hour currently processed and the last counter value seen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedConsumption {
    total: KiloWattHours,
    period_being_processed: Option<DateTime>,
    period_base: KiloWattHours,
}

impl AccumulatedConsumption {
    pub fn new() -> Self {
        Self {
            total: KiloWattHours(0.0),
            period_being_processed: None,
            period_base: KiloWattHours(0.0),
        }
    }

    pub fn restore(snapshot: &ConsumptionSnapshot) -> Self {
        let period_being_processed = parse_period(snapshot);

        //the base is only meaningful for the hour it was recorded in
        let period_base = match period_being_processed {
            Some(_) => KiloWattHours(snapshot.period_base_value.unwrap_or(0.0)),
            None => KiloWattHours(0.0),
        };

        Self {
            total: KiloWattHours(snapshot.value),
            period_being_processed,
            period_base,
        }
    }

    pub fn snapshot(&self) -> ConsumptionSnapshot {
        ConsumptionSnapshot {
            value: self.total.0,
            unit: ENERGY_UNIT.to_string(),
            period_being_processed: self.period_being_processed.map(|p| p.to_iso_string()),
            period_base_value: Some(self.period_base.0),
        }
    }

    pub fn total(&self) -> KiloWattHours {
        self.total
    }

    /// One update step. Returns the new total when it changed, `None` when
    /// the tick was a no-op. Never fails; missing samples are retried by the
    /// caller on its next tick.
    pub fn update(
        &mut self,
        now: DateTime,
        current: Option<KiloWattHours>,
        previous: Option<KiloWattHours>,
    ) -> Option<KiloWattHours> {
        let now = now.truncated_to_hour();
        let previous_hour = now - Duration::hours(1);

        //nothing reported for either hour yet, must stay a strict no-op
        if current.is_none() && previous.is_none() {
            return None;
        }

        //tracked period fell out of the two-hour window, consumption of the
        //skipped hours is lost and a new cycle starts
        if let Some(period) = self.period_being_processed
            && period != now
            && period != previous_hour
        {
            self.period_being_processed = Some(now);
            self.period_base = KiloWattHours(0.0);
        }

        match (current, previous) {
            // 1. Current hour has data while we were still finishing the
            //    previous one: the previous hour is complete, fold in its
            //    remaining delta once and roll forward.
            (Some(_), Some(previous)) if self.period_being_processed == Some(previous_hour) => {
                self.total = self.total + (previous - self.period_base).abs();
                self.period_being_processed = Some(now);
                self.period_base = KiloWattHours(0.0);
                Some(self.total)
            }

            // 2. Still finishing the previous hour, nothing for the current
            //    hour yet: add the delta but stay anchored to the previous
            //    hour.
            (None, Some(previous)) if self.period_being_processed == Some(previous_hour) => {
                self.total = self.total + (previous - self.period_base).abs();
                self.period_base = previous;
                Some(self.total)
            }

            // 3. Processing the current hour.
            (Some(current), _) => {
                self.period_being_processed = Some(now);
                self.total = self.total + (current - self.period_base).abs();
                self.period_base = current;
                Some(self.total)
            }

            _ => None,
        }
    }
}

impl Default for AccumulatedConsumption {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(iso: &str) -> DateTime {
        DateTime::from_iso(iso).unwrap()
    }

    fn kwh(v: f64) -> Option<KiloWattHours> {
        Some(KiloWattHours(v))
    }

    fn tracking(total: f64, period: DateTime, base: f64) -> AccumulatedConsumption {
        AccumulatedConsumption {
            total: KiloWattHours(total),
            period_being_processed: Some(period),
            period_base: KiloWattHours(base),
        }
    }

    #[test]
    fn no_op_when_both_samples_missing() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut accumulator = tracking(10.0, now, 1.5);
        let before = accumulator.clone();

        assert_eq!(accumulator.update(now, None, None), None);
        assert_eq!(accumulator, before);

        //even with stale state no mutation happens
        let mut stale = tracking(10.0, hour("2024-11-03T09:00:00+01:00"), 1.5);
        let before = stale.clone();
        assert_eq!(stale.update(now, None, None), None);
        assert_eq!(stale, before);
    }

    #[test]
    fn previous_hour_finalized_rolls_forward() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let previous_hour = hour("2024-11-03T14:00:00+01:00");
        let mut accumulator = tracking(10.0, previous_hour, 2.0);

        let result = accumulator.update(now, kwh(0.1), kwh(5.0));

        assert_eq!(result, Some(KiloWattHours(13.0)));
        assert_eq!(accumulator.period_being_processed, Some(now));
        assert_eq!(accumulator.period_base, KiloWattHours(0.0));
    }

    #[test]
    fn still_finalizing_previous_hour() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let previous_hour = hour("2024-11-03T14:00:00+01:00");
        let mut accumulator = tracking(10.0, previous_hour, 2.0);

        let result = accumulator.update(now, None, kwh(5.0));

        assert_eq!(result, Some(KiloWattHours(13.0)));
        assert_eq!(accumulator.period_being_processed, Some(previous_hour));
        assert_eq!(accumulator.period_base, KiloWattHours(5.0));
    }

    #[test]
    fn current_hour_in_progress() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut accumulator = tracking(10.0, now, 5.0);

        let result = accumulator.update(now, kwh(7.0), None);

        assert_eq!(result, Some(KiloWattHours(12.0)));
        assert_eq!(accumulator.period_being_processed, Some(now));
        assert_eq!(accumulator.period_base, KiloWattHours(7.0));
    }

    #[test]
    fn first_update_starts_tracking_current_hour() {
        let now = hour("2024-11-03T15:23:46+01:00");
        let mut accumulator = AccumulatedConsumption::new();

        let result = accumulator.update(now, kwh(0.4), None);

        assert_eq!(result, Some(KiloWattHours(0.4)));
        assert_eq!(
            accumulator.period_being_processed,
            Some(hour("2024-11-03T15:00:00+01:00"))
        );
        assert_eq!(accumulator.period_base, KiloWattHours(0.4));
    }

    #[test]
    fn stale_period_resets_base_before_accounting() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut accumulator = tracking(10.0, hour("2024-11-03T12:00:00+01:00"), 3.0);

        let result = accumulator.update(now, kwh(0.5), None);

        //base was zeroed, only the current hour sample counts
        assert_eq!(result, Some(KiloWattHours(10.5)));
        assert_eq!(accumulator.period_being_processed, Some(now));
        assert_eq!(accumulator.period_base, KiloWattHours(0.5));
    }

    #[test]
    fn total_is_monotonic_without_stale_gaps() {
        let h14 = hour("2024-11-03T14:00:00+01:00");
        let h15 = hour("2024-11-03T15:00:00+01:00");
        let mut accumulator = AccumulatedConsumption::new();
        let mut last_total = KiloWattHours(0.0);

        let ticks = [
            (h14, kwh(0.2), None),
            (h14, kwh(0.5), None),
            (h15, None, kwh(0.8)),
            (h15, kwh(0.1), kwh(0.8)),
            (h15, kwh(0.3), kwh(0.8)),
        ];

        for (now, current, previous) in ticks {
            if let Some(total) = accumulator.update(now, current, previous) {
                assert!(total >= last_total);
                last_total = total;
            }
        }

        //0.8 kWh for the finalized hour 14, 0.3 kWh so far within hour 15
        assert!((accumulator.total().0 - 1.1).abs() < 1e-9);
    }

    #[test]
    fn backward_counter_glitch_counts_absolute_delta() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut accumulator = tracking(10.0, now, 5.0);

        //device counter glitched backwards within the hour, tolerated as a
        //positive delta instead of a drop
        let result = accumulator.update(now, kwh(4.5), None);

        assert_eq!(result, Some(KiloWattHours(10.5)));
        assert_eq!(accumulator.period_base, KiloWattHours(4.5));
    }

    #[test]
    fn snapshot_roundtrip() {
        let period = hour("2024-11-03T15:00:00+01:00");
        let accumulator = tracking(12.5, period, 0.7);

        let snapshot = accumulator.snapshot();
        assert_eq!(snapshot.value, 12.5);
        assert_eq!(snapshot.unit, "kWh");
        assert_eq!(snapshot.period_base_value, Some(0.7));

        let restored = AccumulatedConsumption::restore(&snapshot);
        assert_eq!(restored, accumulator);
    }

    #[test]
    fn restore_tolerates_missing_fields() {
        let snapshot = ConsumptionSnapshot {
            value: 3.0,
            unit: "kWh".to_string(),
            period_being_processed: None,
            period_base_value: None,
        };

        let restored = AccumulatedConsumption::restore(&snapshot);
        assert_eq!(restored.total(), KiloWattHours(3.0));
        assert_eq!(restored.period_being_processed, None);
        assert_eq!(restored.period_base, KiloWattHours(0.0));
    }

    #[test]
    fn restore_drops_base_without_period() {
        let snapshot = ConsumptionSnapshot {
            value: 3.0,
            unit: "kWh".to_string(),
            period_being_processed: None,
            period_base_value: Some(2.0),
        };

        let restored = AccumulatedConsumption::restore(&snapshot);
        assert_eq!(restored.period_base, KiloWattHours(0.0));
    }
}
