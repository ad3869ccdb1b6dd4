use serde_json::json;

use crate::device::{DeviceInfo, DeviceStatus};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Forces domestic hot water production.
pub struct ForceDhwSwitch;

impl ForceDhwSwitch {
    pub fn object_id(&self) -> String {
        "force_dhw".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Force DHW",
            "unique_id": format!("{}_force_dhw", info.device_id),
            "state_topic": topics.state("force_dhw"),
            "command_topic": topics.command("force_dhw"),
            "payload_on": "ON",
            "payload_off": "OFF",
            "entity_category": "config",
            "icon": "mdi:water-boiler",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        on_off(status.force_dhw)
    }
}

/// Forces the backup electric heater.
pub struct ForceHeaterSwitch;

impl ForceHeaterSwitch {
    pub fn object_id(&self) -> String {
        "force_heater".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Force Heater",
            "unique_id": format!("{}_force_heater", info.device_id),
            "state_topic": topics.state("force_heater"),
            "command_topic": topics.command("force_heater"),
            "payload_on": "ON",
            "payload_off": "OFF",
            "entity_category": "config",
            "icon": "mdi:hvac",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        on_off(status.force_heater)
    }
}

fn on_off(value: bool) -> String {
    if value { "ON" } else { "OFF" }.to_string()
}

pub(super) fn parse_on_off(payload: &str) -> Option<bool> {
    match payload {
        "ON" => Some(true),
        "OFF" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_status;
    use super::*;

    #[test]
    fn switch_states_follow_status_flags() {
        let mut status = test_status();
        status.force_dhw = true;

        assert_eq!(ForceDhwSwitch.state(&status), "ON");
        assert_eq!(ForceHeaterSwitch.state(&status), "OFF");
    }

    #[test]
    fn parses_only_known_payloads() {
        assert_eq!(parse_on_off("ON"), Some(true));
        assert_eq!(parse_on_off("OFF"), Some(false));
        assert_eq!(parse_on_off("on"), None);
    }
}
