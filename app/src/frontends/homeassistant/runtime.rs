use std::collections::HashMap;

use infrastructure::{MqttInMessage, MqttSubscription};
use tokio::sync::mpsc;

use crate::command::Command;
use crate::device::DeviceInfo;
use crate::entity;

/// Receives command messages from MQTT and routes them to the coordinator
/// of the addressed device. The coordinator stays the only writer of device
/// state; this bridge only parses and forwards.
pub struct HaCommandBridge {
    base_topic: String,
    subscription: MqttSubscription,
    devices: HashMap<String, DeviceRoute>,
}

struct DeviceRoute {
    info: DeviceInfo,
    tx: mpsc::Sender<Command>,
}

impl HaCommandBridge {
    pub fn new(
        base_topic: &str,
        subscription: MqttSubscription,
        routes: Vec<(DeviceInfo, mpsc::Sender<Command>)>,
    ) -> Self {
        let devices = routes
            .into_iter()
            .map(|(info, tx)| (info.device_id.clone(), DeviceRoute { info, tx }))
            .collect();

        Self {
            base_topic: base_topic.to_string(),
            subscription,
            devices,
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.subscription.recv().await {
            self.handle_message(&msg).await;
        }
    }

    async fn handle_message(&self, msg: &MqttInMessage) {
        let Some((device_id, object_id, field)) = parse_command_topic(&self.base_topic, &msg.topic) else {
            tracing::warn!("Ignoring message on unexpected topic {}", msg.topic);
            return;
        };

        let Some(route) = self.devices.get(device_id) else {
            tracing::warn!("Received command for unknown device {}", device_id);
            return;
        };

        match entity::parse_command(&route.info, object_id, field, &msg.payload) {
            Some(command) => {
                tracing::info!("Received command for {}: {:?}", device_id, command);

                if let Err(e) = route.tx.send(command).await {
                    tracing::error!("Error forwarding command for {}: {}", device_id, e);
                }
            }
            None => {
                tracing::warn!(
                    "Unsupported command message on {} with payload {:?}",
                    msg.topic,
                    msg.payload
                );
            }
        }
    }
}

fn parse_command_topic<'a>(base_topic: &str, topic: &'a str) -> Option<(&'a str, &'a str, Option<&'a str>)> {
    let mut parts = topic.strip_prefix(base_topic)?.strip_prefix('/')?.split('/');

    let device_id = parts.next()?;
    let object_id = parts.next()?;

    if parts.next()? != "set" {
        return None;
    }

    let field = parts.next();
    if parts.next().is_some() {
        return None;
    }

    Some((device_id, object_id, field))
}
