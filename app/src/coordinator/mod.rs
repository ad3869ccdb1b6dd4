use std::collections::HashMap;

use infrastructure::MqttSender;
use tokio::sync::mpsc;

use crate::command::{AquareaCommandExecutor, Command, CommandExecutionResult, CommandExecutor};
use crate::consumption::ConsumptionSnapshot;
use crate::core::time::DateTime;
use crate::core::unit::KiloWattHours;
use crate::device::{DeviceInfo, DeviceStatus};
use crate::entity::{ConsumptionSensor, EntitySet};
use crate::frontends::homeassistant::DeviceTopics;
use crate::port::{AquareaApi, ConsumptionError};
use crate::restore::SnapshotRepository;
use crate::t;

/// Owns everything belonging to one device: the entity set, the consumption
/// accumulators and the freshest status. Runs the poll loop and is the only
/// writer of that state; commands arrive over a channel and are handled in
/// between ticks.
pub struct DeviceCoordinator<A> {
    api: A,
    executor: AquareaCommandExecutor<A>,
    info: DeviceInfo,
    entities: EntitySet,
    topics: DeviceTopics,
    mqtt: MqttSender,
    repo: SnapshotRepository,
    command_rx: mpsc::Receiver<Command>,
    scan_interval: std::time::Duration,
    status: Option<DeviceStatus>,
    published: HashMap<String, String>,
}

impl<A: AquareaApi + Clone> DeviceCoordinator<A> {
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        api: A,
        info: DeviceInfo,
        topics: DeviceTopics,
        mqtt: MqttSender,
        repo: SnapshotRepository,
        command_rx: mpsc::Receiver<Command>,
        scan_interval: std::time::Duration,
    ) -> Self {
        let mut entities = EntitySet::for_device(&info);

        match repo.load_for_device(&info.device_id).await {
            Ok(snapshots) => entities.restore_consumption(&snapshots),
            Err(e) => {
                tracing::error!(
                    "Error restoring consumption snapshots for {}, starting fresh: {:?}",
                    info.device_id,
                    e
                );
            }
        }

        Self {
            executor: AquareaCommandExecutor::new(api.clone()),
            api,
            info,
            entities,
            topics,
            mqtt,
            repo,
            command_rx,
            scan_interval,
            status: None,
            published: HashMap::new(),
        }
    }

    pub async fn run(mut self) {
        self.announce().await;

        let mut interval = tokio::time::interval(self.scan_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_tick().await;
                }
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => break,
                    }
                }
            }
        }
    }

    async fn announce(&self) {
        for (topic, config) in self.entities.discovery_configs(&self.info, &self.topics) {
            if let Err(e) = self.mqtt.send_retained(topic, config.to_string()).await {
                tracing::error!("Error announcing entity of {}: {:?}", self.info.device_id, e);
            }
        }
    }

    async fn refresh_tick(&mut self) {
        match self.api.refresh_status(&self.info.device_id).await {
            Ok(status) => {
                self.status = Some(status);
            }
            Err(e) => {
                //skip the tick, the next poll retries
                tracing::warn!("Error refreshing status of {}: {:?}", self.info.device_id, e);
                return;
            }
        }

        self.publish_entity_states().await;
        self.update_consumption().await;
    }

    async fn publish_entity_states(&mut self) {
        let Some(status) = &self.status else {
            return;
        };

        for (object_id, payload) in self.entities.states(status) {
            if self.published.get(&object_id) == Some(&payload) {
                continue;
            }

            if let Err(e) = self.mqtt.send_retained(self.topics.state(&object_id), payload.clone()).await {
                tracing::error!("Error publishing state of {}: {:?}", object_id, e);
                continue;
            }

            self.published.insert(object_id, payload);
        }
    }

    async fn update_consumption(&mut self) {
        let updates = collect_consumption_updates(
            &self.api,
            &self.info.device_id,
            self.entities.consumption_sensors_mut(),
            t!(now),
        )
        .await;

        for update in updates {
            for value in &update.observed {
                let payload = value.0.to_string();
                if let Err(e) = self.mqtt.send_retained(self.topics.state(&update.object_id), payload).await {
                    tracing::error!("Error publishing consumption of {}: {:?}", update.object_id, e);
                }
            }

            if let Err(e) = self
                .repo
                .save(&self.info.device_id, &update.object_id, &update.snapshot)
                .await
            {
                tracing::error!("Error persisting snapshot of {}: {:?}", update.object_id, e);
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match self
            .executor
            .execute_command(&self.info.device_id, &command, self.status.as_ref())
            .await
        {
            Ok(CommandExecutionResult::Triggered) => {
                tracing::info!("Executed command for {}: {:?}", self.info.device_id, command);
                //refresh right away so the new state shows up without
                //waiting for the next poll
                self.refresh_tick().await;
            }
            Ok(CommandExecutionResult::Skipped) => {
                tracing::debug!("Skipped no-op command for {}: {:?}", self.info.device_id, command);
            }
            Err(e) => {
                tracing::error!("Error executing command for {}: {:?}", self.info.device_id, e);
            }
        }
    }
}

struct ConsumptionUpdate {
    object_id: String,
    observed: Vec<KiloWattHours>,
    snapshot: ConsumptionSnapshot,
}

/// Runs the accumulator step of every consumption sensor against the data
/// source. A sample that is not yet available skips the sensor for this
/// tick, and so does any lookup failure; the next tick retries.
async fn collect_consumption_updates<'a, A: AquareaApi>(
    api: &A,
    device_id: &str,
    sensors: impl Iterator<Item = &'a mut ConsumptionSensor>,
    now: DateTime,
) -> Vec<ConsumptionUpdate> {
    let hour = now.truncated_to_hour();
    let previous_hour = hour - crate::core::time::Duration::hours(1);

    let mut updates = Vec::new();

    for sensor in sensors {
        let current = match api.consumption(device_id, hour, sensor.category()).await {
            Ok(value) => value,
            Err(ConsumptionError::NotYetAvailable) => continue,
            Err(ConsumptionError::Upstream(e)) => {
                tracing::warn!("Error reading consumption for {}: {:?}", sensor.object_id(), e);
                continue;
            }
        };

        let previous = match api.consumption(device_id, previous_hour, sensor.category()).await {
            Ok(value) => value,
            Err(ConsumptionError::NotYetAvailable) => continue,
            Err(ConsumptionError::Upstream(e)) => {
                tracing::warn!("Error reading consumption for {}: {:?}", sensor.object_id(), e);
                continue;
            }
        };

        let observed = sensor.update(hour, current, previous);
        if observed.is_empty() {
            continue;
        }

        updates.push(ConsumptionUpdate {
            object_id: sensor.object_id().to_string(),
            observed,
            snapshot: sensor.snapshot(),
        });
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use anyhow::Result;
    use crate::core::unit::DegreeCelsius;
    use crate::device::{ConsumptionType, PowerfulTime, QuietMode, UpdateOperationMode, ZoneInfo};
    use crate::entity::EntitySet;

    #[derive(Default, Clone)]
    struct FakeApi {
        samples: HashMap<(String, ConsumptionType), Option<f64>>,
        unavailable: bool,
    }

    impl FakeApi {
        fn with_sample(mut self, hour: &str, category: ConsumptionType, value: Option<f64>) -> Self {
            self.samples.insert((hour.to_string(), category), value);
            self
        }
    }

    impl AquareaApi for FakeApi {
        async fn get_devices(&self) -> Result<Vec<DeviceInfo>> {
            unimplemented!()
        }

        async fn refresh_status(&self, _: &str) -> Result<DeviceStatus> {
            unimplemented!()
        }

        async fn consumption(
            &self,
            _: &str,
            hour: DateTime,
            category: ConsumptionType,
        ) -> Result<Option<KiloWattHours>, ConsumptionError> {
            if self.unavailable {
                return Err(ConsumptionError::NotYetAvailable);
            }

            Ok(self
                .samples
                .get(&(hour.to_iso_string(), category))
                .copied()
                .flatten()
                .map(KiloWattHours))
        }

        async fn set_zone_mode(&self, _: &str, _: u8, _: UpdateOperationMode) -> Result<()> {
            unimplemented!()
        }

        async fn set_zone_temperature(&self, _: &str, _: u8, _: DegreeCelsius) -> Result<()> {
            unimplemented!()
        }

        async fn set_tank_mode(&self, _: &str, _: bool) -> Result<()> {
            unimplemented!()
        }

        async fn set_tank_temperature(&self, _: &str, _: DegreeCelsius) -> Result<()> {
            unimplemented!()
        }

        async fn set_quiet_mode(&self, _: &str, _: QuietMode) -> Result<()> {
            unimplemented!()
        }

        async fn set_powerful_time(&self, _: &str, _: PowerfulTime) -> Result<()> {
            unimplemented!()
        }

        async fn set_force_dhw(&self, _: &str, _: bool) -> Result<()> {
            unimplemented!()
        }

        async fn set_force_heater(&self, _: &str, _: bool) -> Result<()> {
            unimplemented!()
        }

        async fn request_defrost(&self, _: &str) -> Result<()> {
            unimplemented!()
        }
    }

    fn test_device() -> DeviceInfo {
        DeviceInfo {
            device_id: "ABC123".to_string(),
            name: "Heat Pump".to_string(),
            manufacturer: "Panasonic".to_string(),
            firmware_version: "2.11".to_string(),
            has_tank: false,
            zones: vec![ZoneInfo {
                zone_id: 1,
                name: "House".to_string(),
                cool_mode: false,
                supports_set_temperature: true,
            }],
        }
    }

    fn hour(iso: &str) -> DateTime {
        DateTime::from_iso(iso).unwrap()
    }

    #[tokio::test]
    async fn sensors_update_from_samples() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let api = FakeApi::default()
            .with_sample(&now.to_iso_string(), ConsumptionType::Heat, Some(0.4))
            .with_sample(&now.to_iso_string(), ConsumptionType::Total, Some(0.6));

        let mut entities = EntitySet::for_device(&test_device());
        let updates = collect_consumption_updates(&api, "ABC123", entities.consumption_sensors_mut(), now).await;

        //both heat sensors and both total sensors react, nothing is
        //reported for the previous hour
        let ids: Vec<&str> = updates.iter().map(|u| u.object_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "heating_accumulated_energy_consumption",
                "heating_energy_consumption",
                "accumulated_energy_consumption",
                "energy_consumption",
            ]
        );

        let heating = &updates[0];
        assert_eq!(heating.observed, vec![KiloWattHours(0.4)]);
        assert_eq!(heating.snapshot.value, 0.4);
        assert_eq!(heating.snapshot.period_being_processed, Some(now.to_iso_string()));
    }

    #[tokio::test]
    async fn not_yet_available_skips_every_sensor() {
        let api = FakeApi {
            unavailable: true,
            ..Default::default()
        };

        let mut entities = EntitySet::for_device(&test_device());
        let updates = collect_consumption_updates(
            &api,
            "ABC123",
            entities.consumption_sensors_mut(),
            hour("2024-11-03T15:00:00+01:00"),
        )
        .await;

        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn missing_samples_are_a_no_op() {
        //samples map is empty, both lookups yield None
        let api = FakeApi::default();

        let mut entities = EntitySet::for_device(&test_device());
        let updates = collect_consumption_updates(
            &api,
            "ABC123",
            entities.consumption_sensors_mut(),
            hour("2024-11-03T15:00:00+01:00"),
        )
        .await;

        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn rollover_emits_reset_pulse_for_hourly_sensor() {
        let now = hour("2024-11-03T15:00:00+01:00");
        let previous = hour("2024-11-03T14:00:00+01:00");

        let mut entities = EntitySet::for_device(&test_device());

        //first tick within the previous hour
        let api = FakeApi::default().with_sample(&previous.to_iso_string(), ConsumptionType::Heat, Some(9.0));
        collect_consumption_updates(&api, "ABC123", entities.consumption_sensors_mut(), previous).await;
        //second tick establishes the tracked period
        collect_consumption_updates(&api, "ABC123", entities.consumption_sensors_mut(), previous).await;

        //hour rolls over with both samples present
        let api = api.with_sample(&now.to_iso_string(), ConsumptionType::Heat, Some(0.4));
        let updates = collect_consumption_updates(&api, "ABC123", entities.consumption_sensors_mut(), now).await;

        let hourly = updates
            .iter()
            .find(|u| u.object_id == "heating_energy_consumption")
            .unwrap();
        assert_eq!(
            hourly.observed,
            vec![KiloWattHours(9.0), KiloWattHours(0.0), KiloWattHours(0.4)]
        );
    }
}
