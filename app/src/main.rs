use infrastructure::Mqtt;
use settings::Settings;
use tokio::sync::mpsc;

use crate::adapter::aquarea::AquareaCloudClient;
use crate::coordinator::DeviceCoordinator;
use crate::frontends::homeassistant::HaCommandBridge;
use crate::port::AquareaApi;
use crate::restore::SnapshotRepository;

mod adapter;
mod command;
mod consumption;
mod coordinator;
mod core;
mod device;
mod entity;
mod frontends;
mod port;
mod restore;
mod settings;

struct Infrastructure {
    db_pool: sqlx::PgPool,
    mqtt_client: Mqtt,
}

impl Infrastructure {
    async fn init(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = settings.database.new_pool().await?;
        let mqtt_client = settings.mqtt.new_client();

        Ok(Self { db_pool, mqtt_client })
    }

    async fn process(self) {
        self.mqtt_client.run().await
    }
}

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let mut infrastructure = Infrastructure::init(&settings)
        .await
        .expect("Error initializing infrastructure");

    let api = AquareaCloudClient::new(&settings.aquarea).expect("Error initializing Aquarea client");

    let devices = api.get_devices().await.expect("Error fetching devices");
    tracing::info!("Found {} device(s)", devices.len());

    let repo = SnapshotRepository::new(infrastructure.db_pool.clone());
    repo.ensure_schema().await.expect("Error preparing snapshot storage");

    let command_subscription = infrastructure
        .mqtt_client
        .subscribe_all(&settings.homeassistant.command_filters())
        .await
        .expect("Error subscribing to command topics");

    let mqtt_sender = infrastructure.mqtt_client.sender();
    let scan_interval = std::time::Duration::from_secs(settings.aquarea.scan_interval_seconds);

    let mut coordinators = Vec::new();
    let mut routes = Vec::new();

    for info in devices {
        let (command_tx, command_rx) = mpsc::channel(16);

        let coordinator = DeviceCoordinator::new(
            api.clone(),
            info.clone(),
            settings.homeassistant.device_topics(&info.device_id),
            mqtt_sender.clone(),
            repo.clone(),
            command_rx,
            scan_interval,
        )
        .await;

        routes.push((info, command_tx));
        coordinators.push(coordinator);
    }

    let command_bridge = HaCommandBridge::new(&settings.homeassistant.base_topic, command_subscription, routes);

    mqtt_sender
        .send_retained(settings.homeassistant.availability_topic(), "online")
        .await
        .expect("Error publishing availability");

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = infrastructure.process() => {},
        _ = futures::future::join_all(coordinators.into_iter().map(|c| c.run())) => {},
        _ = command_bridge.run() => {},
    );

    tracing::error!("A core component stopped unexpectedly, shutting down");
}
