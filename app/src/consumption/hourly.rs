use crate::core::time::{DateTime, Duration};
use crate::core::unit::KiloWattHours;

use super::{ConsumptionSnapshot, ENERGY_UNIT, parse_period};

/// Per-hour consumption that drops back to zero at each hour boundary.
/// On rollover the observed sequence is final previous-hour value, zero,
/// then the current-hour value, so downstream statistics see every hour as
/// a discrete measurement instead of a continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyConsumption {
    value: KiloWattHours,
    period_being_processed: Option<DateTime>,
}

impl HourlyConsumption {
    pub fn new() -> Self {
        Self {
            value: KiloWattHours(0.0),
            period_being_processed: None,
        }
    }

    pub fn restore(snapshot: &ConsumptionSnapshot) -> Self {
        Self {
            value: KiloWattHours(snapshot.value),
            period_being_processed: parse_period(snapshot),
        }
    }

    pub fn snapshot(&self) -> ConsumptionSnapshot {
        ConsumptionSnapshot {
            value: self.value.0,
            unit: ENERGY_UNIT.to_string(),
            period_being_processed: self.period_being_processed.map(|p| p.to_iso_string()),
            period_base_value: None,
        }
    }

    pub fn value(&self) -> KiloWattHours {
        self.value
    }

    /// One update step. Returns every value an observer must see for this
    /// tick, in order; empty when the tick was a no-op.
    pub fn update(
        &mut self,
        now: DateTime,
        current: Option<KiloWattHours>,
        previous: Option<KiloWattHours>,
    ) -> Vec<KiloWattHours> {
        let now = now.truncated_to_hour();
        let previous_hour = now - Duration::hours(1);

        //nothing reported for either hour yet, must stay a strict no-op
        if current.is_none() && previous.is_none() {
            return Vec::new();
        }

        //tracked period fell out of the two-hour window, reset to zero and
        //start a new cycle on the next tick
        if self.period_being_processed != Some(now) && self.period_being_processed != Some(previous_hour) {
            self.period_being_processed = Some(now);
            self.value = KiloWattHours(0.0);
            return vec![self.value];
        }

        match (current, previous) {
            // 1. Previous hour is complete while we were still processing
            //    it: publish its final value, pulse to zero, then show the
            //    running value of the new hour.
            (Some(current), Some(previous)) if self.period_being_processed == Some(previous_hour) => {
                self.period_being_processed = Some(now);
                self.value = current;
                vec![previous, KiloWattHours(0.0), current]
            }

            // 2. Still processing the previous hour, nothing for the
            //    current hour yet.
            (None, Some(previous)) if self.period_being_processed == Some(previous_hour) => {
                self.value = previous;
                vec![previous]
            }

            // 3. Processing the current hour.
            (Some(current), _) => {
                self.period_being_processed = Some(now);
                self.value = current;
                vec![current]
            }

            _ => Vec::new(),
        }
    }
}

impl Default for HourlyConsumption {
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

    fn tracking(value: f64, period: DateTime) -> HourlyConsumption {
        HourlyConsumption {
            value: KiloWattHours(value),
            period_being_processed: Some(period),
        }
    }

    #[test]
    fn no_op_when_both_samples_missing() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut sensor = tracking(4.2, hour("2024-11-03T09:00:00+01:00"));
        let before = sensor.clone();

        assert!(sensor.update(now, None, None).is_empty());
        assert_eq!(sensor, before);
    }

    #[test]
    fn rollover_pulses_through_zero() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let previous_hour = hour("2024-11-03T14:00:00+01:00");
        let mut sensor = tracking(8.5, previous_hour);

        let observed = sensor.update(now, kwh(0.4), kwh(9.0));

        assert_eq!(
            observed,
            vec![KiloWattHours(9.0), KiloWattHours(0.0), KiloWattHours(0.4)]
        );
        assert_eq!(sensor.value(), KiloWattHours(0.4));
        assert_eq!(sensor.period_being_processed, Some(now));
    }

    #[test]
    fn previous_hour_value_keeps_updating() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let previous_hour = hour("2024-11-03T14:00:00+01:00");
        let mut sensor = tracking(8.5, previous_hour);

        let observed = sensor.update(now, None, kwh(9.0));

        assert_eq!(observed, vec![KiloWattHours(9.0)]);
        assert_eq!(sensor.period_being_processed, Some(previous_hour));
    }

    #[test]
    fn current_hour_replaces_value() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut sensor = tracking(0.2, now);

        let observed = sensor.update(now, kwh(0.7), None);

        assert_eq!(observed, vec![KiloWattHours(0.7)]);
        assert_eq!(sensor.value(), KiloWattHours(0.7));
    }

    #[test]
    fn stale_period_resets_to_zero() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let mut sensor = tracking(4.2, hour("2024-11-03T12:00:00+01:00"));

        let observed = sensor.update(now, kwh(0.7), None);

        assert_eq!(observed, vec![KiloWattHours(0.0)]);
        assert_eq!(sensor.value(), KiloWattHours(0.0));
        assert_eq!(sensor.period_being_processed, Some(now));

        //next tick picks up the current hour normally
        let observed = sensor.update(now, kwh(0.7), None);
        assert_eq!(observed, vec![KiloWattHours(0.7)]);
    }

    #[test]
    fn first_update_starts_with_zero() {
        let now = hour("2024-11-03T15:23:46+01:00");
        let mut sensor = HourlyConsumption::new();

        let observed = sensor.update(now, kwh(0.4), None);

        assert_eq!(observed, vec![KiloWattHours(0.0)]);
        assert_eq!(
            sensor.period_being_processed,
            Some(hour("2024-11-03T15:00:00+01:00"))
        );
    }

    #[test]
    fn snapshot_roundtrip() {
        let sensor = tracking(0.9, hour("2024-11-03T15:00:00+01:00"));

        let snapshot = sensor.snapshot();
        assert_eq!(snapshot.value, 0.9);
        assert_eq!(snapshot.period_base_value, None);

        let restored = HourlyConsumption::restore(&snapshot);
        assert_eq!(restored, sensor);
    }
}
