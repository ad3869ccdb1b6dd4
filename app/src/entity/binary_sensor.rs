use serde_json::json;

use crate::device::{DeviceInfo, DeviceModeStatus, DeviceStatus};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Reports whether the device is in an error state.
pub struct StatusBinarySensor;

impl StatusBinarySensor {
    pub fn object_id(&self) -> String {
        "status".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Status",
            "unique_id": format!("{}_status", info.device_id),
            "state_topic": topics.state("status"),
            "device_class": "problem",
            "entity_category": "diagnostic",
            "payload_on": "ON",
            "payload_off": "OFF",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        on_off(status.is_on_error)
    }
}

/// Reports whether the device is currently defrosting.
pub struct DefrostBinarySensor;

impl DefrostBinarySensor {
    pub fn object_id(&self) -> String {
        "defrost".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Defrost",
            "unique_id": format!("{}_defrost", info.device_id),
            "state_topic": topics.state("defrost"),
            "device_class": "running",
            "icon": "mdi:snowflake-melt",
            "payload_on": "ON",
            "payload_off": "OFF",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        on_off(status.mode_status == DeviceModeStatus::Defrost)
    }
}

fn on_off(value: bool) -> String {
    if value { "ON" } else { "OFF" }.to_string()
}
