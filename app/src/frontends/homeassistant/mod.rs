mod runtime;

pub use runtime::HaCommandBridge;

use serde::Deserialize;

/// MQTT exposure of the heat pump entities, using Home Assistant's MQTT
/// discovery convention: retained config messages under the discovery
/// prefix, states and commands under the bridge's own base topic.
#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistant {
    pub base_topic: String,
    pub discovery_prefix: String,
}

impl HomeAssistant {
    pub fn device_topics(&self, device_id: &str) -> DeviceTopics {
        DeviceTopics::new(&self.base_topic, &self.discovery_prefix, device_id)
    }

    pub fn availability_topic(&self) -> String {
        format!("{}/bridge/availability", self.base_topic)
    }

    pub fn command_filters(&self) -> Vec<String> {
        vec![
            format!("{}/+/+/set", self.base_topic),
            format!("{}/+/+/set/+", self.base_topic),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct DeviceTopics {
    base_topic: String,
    discovery_prefix: String,
    device_id: String,
}

impl DeviceTopics {
    pub fn new(base_topic: &str, discovery_prefix: &str, device_id: &str) -> Self {
        Self {
            base_topic: base_topic.to_string(),
            discovery_prefix: discovery_prefix.to_string(),
            device_id: device_id.to_string(),
        }
    }

    pub fn discovery(&self, component: &str, object_id: &str) -> String {
        format!(
            "{}/{}/{}/{}/config",
            self.discovery_prefix, component, self.device_id, object_id
        )
    }

    pub fn state(&self, object_id: &str) -> String {
        format!("{}/{}/{}/state", self.base_topic, self.device_id, object_id)
    }

    pub fn command(&self, object_id: &str) -> String {
        format!("{}/{}/{}/set", self.base_topic, self.device_id, object_id)
    }

    pub fn command_field(&self, object_id: &str, field: &str) -> String {
        format!("{}/{}/{}/set/{}", self.base_topic, self.device_id, object_id, field)
    }

    pub fn availability(&self) -> String {
        format!("{}/bridge/availability", self.base_topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_layout() {
        let topics = DeviceTopics::new("aquarea", "homeassistant", "ABC123");

        assert_eq!(topics.discovery("climate", "climate_1"), "homeassistant/climate/ABC123/climate_1/config");
        assert_eq!(topics.state("status"), "aquarea/ABC123/status/state");
        assert_eq!(topics.command("quiet_mode"), "aquarea/ABC123/quiet_mode/set");
        assert_eq!(topics.command_field("climate_1", "mode"), "aquarea/ABC123/climate_1/set/mode");
        assert_eq!(topics.availability(), "aquarea/bridge/availability");
    }
}
