use serde_json::json;

use crate::device::DeviceInfo;
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Asks the device to start a defrost cycle.
pub struct DefrostButton;

impl DefrostButton {
    pub fn object_id(&self) -> String {
        "request_defrost".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Request Defrost",
            "unique_id": format!("{}_request_defrost", info.device_id),
            "command_topic": topics.command("request_defrost"),
            "payload_press": "PRESS",
            "icon": "mdi:snowflake-melt",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }
}

pub(super) fn parse_press(payload: &str) -> bool {
    payload == "PRESS"
}
