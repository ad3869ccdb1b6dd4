use serde_json::json;

use crate::command::Command;
use crate::device::{
    DeviceAction, DeviceInfo, DeviceStatus, ExtendedOperationMode, OperationStatus, QuietMode, UpdateOperationMode,
    ZoneInfo,
};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Climate entity controlling one zone of the heat pump. Quiet mode is a
/// device-wide setting surfaced as presets, so all zones show the same
/// preset.
pub struct ClimateEntity {
    zone: ZoneInfo,
}

impl ClimateEntity {
    pub fn new(zone: ZoneInfo) -> Self {
        Self { zone }
    }

    pub fn object_id(&self) -> String {
        format!("climate_{}", self.zone.zone_id)
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        let object_id = self.object_id();
        let state_topic = topics.state(&object_id);

        let mut modes = vec!["off", "heat"];
        if self.zone.cool_mode {
            modes.extend(["cool", "heat_cool"]);
        }

        json!({
            "name": self.zone.name,
            "unique_id": format!("{}_{}", info.device_id, object_id),
            "modes": modes,
            "mode_state_topic": state_topic,
            "mode_state_template": "{{ value_json.mode }}",
            "mode_command_topic": topics.command_field(&object_id, "mode"),
            "action_topic": state_topic,
            "action_template": "{{ value_json.action }}",
            "current_temperature_topic": state_topic,
            "current_temperature_template": "{{ value_json.current_temperature }}",
            "temperature_state_topic": state_topic,
            "temperature_state_template": "{{ value_json.target_temperature }}",
            "temperature_command_topic": topics.command_field(&object_id, "temperature"),
            "temp_step": 1,
            "temperature_unit": "C",
            "preset_modes": ["level1", "level2", "level3"],
            "preset_mode_state_topic": state_topic,
            "preset_mode_value_template": "{{ value_json.preset_mode }}",
            "preset_mode_command_topic": topics.command_field(&object_id, "preset_mode"),
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> Option<String> {
        let zone = status.zone(self.zone.zone_id)?;

        // Zones that cannot take a set-point report their own temperature as
        // both bound, which pins the thermostat card to the measured value.
        let (target, min, max) = if self.zone.supports_set_temperature && status.mode != ExtendedOperationMode::Off {
            if status.is_cooling_mode() {
                (Some(zone.cool_target.0), zone.cool_min.0, zone.cool_max.0)
            } else {
                (Some(zone.heat_target.0), zone.heat_min.0, zone.heat_max.0)
            }
        } else {
            (None, zone.temperature.0, zone.temperature.0)
        };

        Some(
            json!({
                "mode": hvac_mode(status.mode, zone.operation_status),
                "action": hvac_action(status.action),
                "preset_mode": preset_mode(status.quiet_mode),
                "current_temperature": zone.temperature.0,
                "target_temperature": target,
                "min_temp": min,
                "max_temp": max,
            })
            .to_string(),
        )
    }
}

fn hvac_mode(mode: ExtendedOperationMode, zone_status: OperationStatus) -> &'static str {
    if zone_status == OperationStatus::Off {
        return "off";
    }

    match mode {
        ExtendedOperationMode::Heat => "heat",
        ExtendedOperationMode::Cool => "cool",
        ExtendedOperationMode::AutoHeat | ExtendedOperationMode::AutoCool => "heat_cool",
        ExtendedOperationMode::Off => "off",
    }
}

fn hvac_action(action: DeviceAction) -> &'static str {
    match action {
        DeviceAction::Heating => "heating",
        DeviceAction::Cooling => "cooling",
        DeviceAction::Idle | DeviceAction::HeatingWater => "idle",
    }
}

fn preset_mode(quiet_mode: QuietMode) -> &'static str {
    match quiet_mode {
        QuietMode::Off => "none",
        QuietMode::Level1 => "level1",
        QuietMode::Level2 => "level2",
        QuietMode::Level3 => "level3",
    }
}

pub(super) fn parse_command(zone_id: u8, field: &str, payload: &str) -> Option<Command> {
    match field {
        "mode" => {
            let mode = match payload {
                "off" => UpdateOperationMode::Off,
                "heat" => UpdateOperationMode::Heat,
                "cool" => UpdateOperationMode::Cool,
                "heat_cool" => UpdateOperationMode::Auto,
                _ => return None,
            };
            Some(Command::SetZoneMode { zone_id, mode })
        }
        "temperature" => payload.parse::<f64>().ok().map(|temperature| Command::SetZoneTemperature {
            zone_id,
            temperature: temperature.into(),
        }),
        "preset_mode" => {
            let mode = match payload {
                "none" => QuietMode::Off,
                "level1" => QuietMode::Level1,
                "level2" => QuietMode::Level2,
                "level3" => QuietMode::Level3,
                _ => return None,
            };
            Some(Command::SetQuietMode { mode })
        }
        _ => None,
    }
}
