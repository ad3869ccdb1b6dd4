use serde_json::json;

use crate::command::Command;
use crate::device::{DeviceAction, DeviceInfo, DeviceStatus, OperationStatus};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Water heater entity for the domestic hot water tank.
pub struct WaterHeaterEntity;

impl WaterHeaterEntity {
    pub fn object_id(&self) -> String {
        "tank".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        let object_id = self.object_id();
        let state_topic = topics.state(&object_id);

        json!({
            "name": "Tank",
            "unique_id": format!("{}_tank", info.device_id),
            "modes": ["off", "heat_pump"],
            "mode_state_topic": state_topic,
            "mode_state_template": "{{ value_json.mode }}",
            "mode_command_topic": topics.command_field(&object_id, "mode"),
            "current_temperature_topic": state_topic,
            "current_temperature_template": "{{ value_json.current_temperature }}",
            "temperature_state_topic": state_topic,
            "temperature_state_template": "{{ value_json.target_temperature }}",
            "temperature_command_topic": topics.command_field(&object_id, "temperature"),
            "temperature_unit": "C",
            "precision": 1.0,
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> Option<String> {
        let tank = status.tank.as_ref()?;

        let (mode, current_operation) = if tank.operation_status == OperationStatus::Off {
            ("off", "off")
        } else if status.action == DeviceAction::HeatingWater {
            ("heat_pump", "heating")
        } else {
            ("heat_pump", "idle")
        };

        Some(
            json!({
                "mode": mode,
                "current_operation": current_operation,
                "current_temperature": tank.temperature.0,
                "target_temperature": tank.target_temperature.0,
                "min_temp": tank.heat_min.0,
                "max_temp": tank.heat_max.0,
            })
            .to_string(),
        )
    }
}

pub(super) fn parse_command(field: &str, payload: &str) -> Option<Command> {
    match field {
        "mode" => match payload {
            "heat_pump" => Some(Command::SetTankMode { on: true }),
            "off" => Some(Command::SetTankMode { on: false }),
            _ => None,
        },
        "temperature" => payload
            .parse::<f64>()
            .ok()
            .map(|temperature| Command::SetTankTemperature {
                temperature: temperature.into(),
            }),
        _ => None,
    }
}
