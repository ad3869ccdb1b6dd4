mod binary_sensor;
mod button;
mod climate;
mod select;
mod sensor;
mod switch;
mod water_heater;

pub use binary_sensor::{DefrostBinarySensor, StatusBinarySensor};
pub use button::DefrostButton;
pub use climate::ClimateEntity;
pub use select::{PowerfulTimeSelect, QuietModeSelect};
pub use sensor::{ConsumptionSensor, OutdoorTemperatureSensor};
pub use switch::{ForceDhwSwitch, ForceHeaterSwitch};
pub use water_heater::WaterHeaterEntity;

use std::collections::HashMap;

use crate::command::Command;
use crate::consumption::ConsumptionSnapshot;
use crate::device::{DeviceInfo, DeviceStatus};
use crate::frontends::homeassistant::DeviceTopics;

enum HeatPumpEntity {
    Climate(ClimateEntity),
    WaterHeater(WaterHeaterEntity),
    OutdoorTemperature(OutdoorTemperatureSensor),
    StatusProblem(StatusBinarySensor),
    Defrost(DefrostBinarySensor),
    ForceDhw(ForceDhwSwitch),
    ForceHeater(ForceHeaterSwitch),
    QuietMode(QuietModeSelect),
    PowerfulTime(PowerfulTimeSelect),
    RequestDefrost(DefrostButton),
}

/// All entities exposed for one device. The plain entities derive their
/// state from the latest `DeviceStatus`; the consumption sensors carry their
/// own accumulator state and are driven separately by the coordinator.
pub struct EntitySet {
    entities: Vec<HeatPumpEntity>,
    consumption: Vec<ConsumptionSensor>,
}

impl EntitySet {
    pub fn for_device(info: &DeviceInfo) -> Self {
        let mut entities: Vec<HeatPumpEntity> = info
            .zones
            .iter()
            .map(|zone| HeatPumpEntity::Climate(ClimateEntity::new(zone.clone())))
            .collect();

        if info.has_tank {
            entities.push(HeatPumpEntity::WaterHeater(WaterHeaterEntity));
            entities.push(HeatPumpEntity::ForceDhw(ForceDhwSwitch));
        }

        entities.extend([
            HeatPumpEntity::OutdoorTemperature(OutdoorTemperatureSensor),
            HeatPumpEntity::StatusProblem(StatusBinarySensor),
            HeatPumpEntity::Defrost(DefrostBinarySensor),
            HeatPumpEntity::ForceHeater(ForceHeaterSwitch),
            HeatPumpEntity::QuietMode(QuietModeSelect),
            HeatPumpEntity::PowerfulTime(PowerfulTimeSelect),
            HeatPumpEntity::RequestDefrost(DefrostButton),
        ]);

        Self {
            entities,
            consumption: sensor::consumption_sensors(info),
        }
    }

    /// Retained discovery announcements: one `(topic, payload)` pair per
    /// entity, addressed by Home Assistant's discovery convention.
    pub fn discovery_configs(&self, info: &DeviceInfo, topics: &DeviceTopics) -> Vec<(String, serde_json::Value)> {
        let mut configs: Vec<(&'static str, String, serde_json::Value)> = self
            .entities
            .iter()
            .map(|entity| match entity {
                HeatPumpEntity::Climate(e) => ("climate", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::WaterHeater(e) => ("water_heater", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::OutdoorTemperature(e) => ("sensor", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::StatusProblem(e) => ("binary_sensor", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::Defrost(e) => ("binary_sensor", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::ForceDhw(e) => ("switch", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::ForceHeater(e) => ("switch", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::QuietMode(e) => ("select", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::PowerfulTime(e) => ("select", e.object_id(), e.discovery(info, topics)),
                HeatPumpEntity::RequestDefrost(e) => ("button", e.object_id(), e.discovery(info, topics)),
            })
            .collect();

        configs.extend(
            self.consumption
                .iter()
                .map(|sensor| ("sensor", sensor.object_id().to_string(), sensor.discovery(info, topics))),
        );

        configs
            .into_iter()
            .map(|(component, object_id, config)| (topics.discovery(component, &object_id), config))
            .collect()
    }

    /// State payloads of all plain entities for the given status. Entities
    /// without a valid state (e.g. the tank on a device that lost it) are
    /// skipped.
    pub fn states(&self, status: &DeviceStatus) -> Vec<(String, String)> {
        self.entities
            .iter()
            .filter_map(|entity| match entity {
                HeatPumpEntity::Climate(e) => e.state(status).map(|s| (e.object_id(), s)),
                HeatPumpEntity::WaterHeater(e) => e.state(status).map(|s| (e.object_id(), s)),
                HeatPumpEntity::OutdoorTemperature(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::StatusProblem(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::Defrost(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::ForceDhw(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::ForceHeater(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::QuietMode(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::PowerfulTime(e) => Some((e.object_id(), e.state(status))),
                HeatPumpEntity::RequestDefrost(_) => None,
            })
            .collect()
    }

    pub fn consumption_sensors_mut(&mut self) -> impl Iterator<Item = &mut ConsumptionSensor> {
        self.consumption.iter_mut()
    }

    pub fn restore_consumption(&mut self, snapshots: &HashMap<String, ConsumptionSnapshot>) {
        for sensor in self.consumption.iter_mut() {
            if let Some(snapshot) = snapshots.get(sensor.object_id()) {
                sensor.restore(snapshot);
            }
        }
    }
}

/// Maps an inbound command-topic message to a command, based on the static
/// device layout alone. Unknown topics and unparseable payloads map to
/// `None` and are logged by the caller.
pub fn parse_command(info: &DeviceInfo, object_id: &str, field: Option<&str>, payload: &str) -> Option<Command> {
    if let Some(zone_id) = object_id
        .strip_prefix("climate_")
        .and_then(|id| id.parse::<u8>().ok())
    {
        info.zone(zone_id)?;
        return climate::parse_command(zone_id, field?, payload);
    }

    match (object_id, field) {
        ("tank", Some(field)) if info.has_tank => water_heater::parse_command(field, payload),
        ("force_dhw", None) if info.has_tank => switch::parse_on_off(payload).map(|on| Command::SetForceDhw { on }),
        ("force_heater", None) => switch::parse_on_off(payload).map(|on| Command::SetForceHeater { on }),
        ("quiet_mode", None) => select::parse_quiet_mode(payload).map(|mode| Command::SetQuietMode { mode }),
        ("powerful_time", None) => {
            select::parse_powerful_time(payload).map(|duration| Command::SetPowerfulTime { duration })
        }
        ("request_defrost", None) => button::parse_press(payload).then_some(Command::RequestDefrost),
        _ => None,
    }
}

pub(crate) fn device_block(info: &DeviceInfo) -> serde_json::Value {
    serde_json::json!({
        "identifiers": [info.device_id],
        "name": info.name,
        "manufacturer": info.manufacturer,
        "sw_version": info.firmware_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unit::DegreeCelsius;
    use crate::device::{
        DeviceAction, DeviceModeStatus, ExtendedOperationMode, OperationStatus, PowerfulTime, QuietMode, TankStatus,
        UpdateOperationMode, ZoneInfo, ZoneStatus,
    };

    pub(super) fn test_status() -> DeviceStatus {
        DeviceStatus {
            mode: ExtendedOperationMode::Heat,
            action: DeviceAction::Heating,
            mode_status: DeviceModeStatus::Normal,
            quiet_mode: QuietMode::Off,
            powerful_time: PowerfulTime::Off,
            force_dhw: false,
            force_heater: false,
            is_on_error: false,
            outdoor_temperature: DegreeCelsius(4.5),
            zones: vec![ZoneStatus {
                zone_id: 1,
                operation_status: OperationStatus::On,
                temperature: DegreeCelsius(21.0),
                heat_target: DegreeCelsius(22.0),
                heat_min: DegreeCelsius(16.0),
                heat_max: DegreeCelsius(30.0),
                cool_target: DegreeCelsius(24.0),
                cool_min: DegreeCelsius(18.0),
                cool_max: DegreeCelsius(28.0),
            }],
            tank: Some(TankStatus {
                operation_status: OperationStatus::On,
                temperature: DegreeCelsius(48.0),
                target_temperature: DegreeCelsius(52.0),
                heat_min: DegreeCelsius(40.0),
                heat_max: DegreeCelsius(65.0),
            }),
        }
    }

    pub(super) fn test_device() -> DeviceInfo {
        DeviceInfo {
            device_id: "ABC123".to_string(),
            name: "Heat Pump".to_string(),
            manufacturer: "Panasonic".to_string(),
            firmware_version: "2.11".to_string(),
            has_tank: true,
            zones: vec![ZoneInfo {
                zone_id: 1,
                name: "House".to_string(),
                cool_mode: true,
                supports_set_temperature: true,
            }],
        }
    }

    #[test]
    fn entity_set_covers_all_platforms() {
        let info = test_device();
        let set = EntitySet::for_device(&info);
        let topics = DeviceTopics::new("aquarea", "homeassistant", &info.device_id);

        let configs = set.discovery_configs(&info, &topics);
        let topics: Vec<&str> = configs.iter().map(|(t, _)| t.as_str()).collect();

        //1 climate zone, tank, outdoor temp, 2 binary sensors, 2 switches,
        //2 selects, 1 button, 8 consumption sensors
        assert_eq!(configs.len(), 18);
        assert!(topics.contains(&"homeassistant/climate/ABC123/climate_1/config"));
        assert!(topics.contains(&"homeassistant/water_heater/ABC123/tank/config"));
        assert!(topics.contains(&"homeassistant/sensor/ABC123/heating_accumulated_energy_consumption/config"));
        assert!(topics.contains(&"homeassistant/button/ABC123/request_defrost/config"));
    }

    #[test]
    fn tankless_device_has_no_tank_entities() {
        let mut info = test_device();
        info.has_tank = false;
        info.zones[0].cool_mode = false;

        let set = EntitySet::for_device(&info);
        let topics = DeviceTopics::new("aquarea", "homeassistant", &info.device_id);

        let configs = set.discovery_configs(&info, &topics);
        let topics: Vec<&str> = configs.iter().map(|(t, _)| t.as_str()).collect();

        assert!(!topics.iter().any(|t| t.contains("/tank")));
        assert!(!topics.iter().any(|t| t.contains("force_dhw")));
        assert!(!topics.iter().any(|t| t.contains("cooling")));
    }

    #[test]
    fn parse_command_routes_by_object_id() {
        let info = test_device();

        assert_eq!(
            parse_command(&info, "climate_1", Some("mode"), "heat"),
            Some(Command::SetZoneMode {
                zone_id: 1,
                mode: UpdateOperationMode::Heat
            })
        );
        assert_eq!(
            parse_command(&info, "quiet_mode", None, "level2"),
            Some(Command::SetQuietMode {
                mode: QuietMode::Level2
            })
        );
        assert_eq!(
            parse_command(&info, "force_dhw", None, "ON"),
            Some(Command::SetForceDhw { on: true })
        );
        assert_eq!(parse_command(&info, "request_defrost", None, "PRESS"), Some(Command::RequestDefrost));

        //unknown zone and unknown object ids are rejected
        assert_eq!(parse_command(&info, "climate_9", Some("mode"), "heat"), None);
        assert_eq!(parse_command(&info, "unknown", None, "x"), None);
    }

    #[test]
    fn parse_command_rejects_tank_commands_without_tank() {
        let mut info = test_device();
        info.has_tank = false;

        assert_eq!(parse_command(&info, "tank", Some("mode"), "heat_pump"), None);
        assert_eq!(parse_command(&info, "force_dhw", None, "ON"), None);
    }
}
