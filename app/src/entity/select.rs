use serde_json::json;

use crate::device::{DeviceInfo, DeviceStatus, PowerfulTime, QuietMode};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

/// Device-wide quiet mode with three levels.
pub struct QuietModeSelect;

impl QuietModeSelect {
    pub fn object_id(&self) -> String {
        "quiet_mode".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Quiet Mode",
            "unique_id": format!("{}_quiet_mode", info.device_id),
            "state_topic": topics.state("quiet_mode"),
            "command_topic": topics.command("quiet_mode"),
            "options": ["off", "level1", "level2", "level3"],
            "icon": "mdi:volume-off",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        status.quiet_mode.to_string()
    }
}

/// Boosted operation for a limited time window.
pub struct PowerfulTimeSelect;

impl PowerfulTimeSelect {
    pub fn object_id(&self) -> String {
        "powerful_time".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Powerful Time",
            "unique_id": format!("{}_powerful_time", info.device_id),
            "state_topic": topics.state("powerful_time"),
            "command_topic": topics.command("powerful_time"),
            "options": ["off", "on-30m", "on-60m", "on-90m"],
            "icon": "mdi:fire",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        status.powerful_time.to_string()
    }
}

pub(super) fn parse_quiet_mode(payload: &str) -> Option<QuietMode> {
    match payload {
        "off" => Some(QuietMode::Off),
        "level1" => Some(QuietMode::Level1),
        "level2" => Some(QuietMode::Level2),
        "level3" => Some(QuietMode::Level3),
        _ => None,
    }
}

pub(super) fn parse_powerful_time(payload: &str) -> Option<PowerfulTime> {
    match payload {
        "off" => Some(PowerfulTime::Off),
        "on-30m" => Some(PowerfulTime::On30Min),
        "on-60m" => Some(PowerfulTime::On60Min),
        "on-90m" => Some(PowerfulTime::On90Min),
        _ => None,
    }
}
