mod api;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Timelike;
use infrastructure::HttpClientConfig;
use moka::future::Cache;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;

use crate::core::time::DateTime;
use crate::core::unit::{DegreeCelsius, KiloWattHours};
use crate::device::{ConsumptionType, DeviceInfo, DeviceStatus, PowerfulTime, QuietMode, UpdateOperationMode};
use crate::port::{AquareaApi, ConsumptionError};

#[derive(Debug, Deserialize, Clone)]
pub struct AquareaSettings {
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: u64,
    #[serde(default = "default_consumption_refresh")]
    pub consumption_refresh_seconds: u64,
}

fn default_scan_interval() -> u64 {
    10
}

fn default_consumption_refresh() -> u64 {
    60
}

/// REST adapter for the Aquarea cloud service. Expects an already-issued
/// access token; the login flow is handled outside of this process.
///
/// Consumption datasets arrive per day and are cached with a short TTL so
/// the hour still being reported keeps refreshing. A dataset that is not
/// cached yet is fetched in the background while the caller gets
/// `NotYetAvailable` and retries on its next tick.
#[derive(Clone)]
pub struct AquareaCloudClient {
    client: ClientWithMiddleware,
    base_url: String,
    days: Cache<String, Arc<api::DailyConsumptionDto>>,
    pending: Arc<Mutex<HashSet<String>>>,
}

impl AquareaCloudClient {
    pub fn new(settings: &AquareaSettings) -> Result<Self> {
        let client = HttpClientConfig::new(Some(settings.access_token.clone())).new_tracing_client()?;

        let days = Cache::builder()
            .time_to_live(std::time::Duration::from_secs(settings.consumption_refresh_seconds))
            .build();

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            days,
            pending: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?.error_for_status()?;

        response.json::<T>().await.with_context(|| format!("Error decoding response of {}", url))
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("Calling Aquarea service {}: {}", url, body);

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Error calling {}", url))?;

        Ok(())
    }

    async fn fetch_daily(&self, device_id: &str, date: &str) -> Result<api::DailyConsumptionDto> {
        self.get_json(&format!("/devices/{}/consumption?date={}", device_id, date))
            .await
    }

    fn schedule_fetch(&self, device_id: &str, date: &str, key: String) {
        {
            let Ok(mut pending) = self.pending.lock() else {
                return;
            };

            if !pending.insert(key.clone()) {
                //fetch already in flight
                return;
            }
        }

        let this = self.clone();
        let device_id = device_id.to_string();
        let date = date.to_string();

        tokio::spawn(async move {
            match this.fetch_daily(&device_id, &date).await {
                Ok(day) => {
                    this.days.insert(key.clone(), Arc::new(day)).await;
                }
                Err(e) => {
                    tracing::warn!("Error fetching consumption of {} for {}: {:?}", device_id, date, e);
                }
            }

            if let Ok(mut pending) = this.pending.lock() {
                pending.remove(&key);
            }
        });
    }
}

impl AquareaApi for AquareaCloudClient {
    async fn get_devices(&self) -> Result<Vec<DeviceInfo>> {
        let devices: Vec<api::DeviceDto> = self.get_json("/devices").await?;
        Ok(devices.into_iter().map(DeviceInfo::from).collect())
    }

    async fn refresh_status(&self, device_id: &str) -> Result<DeviceStatus> {
        let status: api::StatusDto = self.get_json(&format!("/devices/{}/status", device_id)).await?;
        status.try_into()
    }

    async fn consumption(
        &self,
        device_id: &str,
        hour: DateTime,
        category: ConsumptionType,
    ) -> Result<Option<KiloWattHours>, ConsumptionError> {
        let local = hour.into_db();
        let date = local.format("%Y-%m-%d").to_string();
        let key = format!("{}:{}", device_id, date);

        if let Some(day) = self.days.get(&key) {
            return Ok(day.value_at(local.hour() as usize, category).map(KiloWattHours));
        }

        self.schedule_fetch(device_id, &date, key);
        Err(ConsumptionError::NotYetAvailable)
    }

    async fn set_zone_mode(&self, device_id: &str, zone_id: u8, mode: UpdateOperationMode) -> Result<()> {
        self.post(&format!("/devices/{}/zones/{}/mode", device_id, zone_id), json!({ "mode": mode }))
            .await
    }

    async fn set_zone_temperature(&self, device_id: &str, zone_id: u8, temperature: DegreeCelsius) -> Result<()> {
        self.post(
            &format!("/devices/{}/zones/{}/temperature", device_id, zone_id),
            json!({ "temperature": temperature }),
        )
        .await
    }

    async fn set_tank_mode(&self, device_id: &str, on: bool) -> Result<()> {
        self.post(&format!("/devices/{}/tank/mode", device_id), json!({ "on": on })).await
    }

    async fn set_tank_temperature(&self, device_id: &str, temperature: DegreeCelsius) -> Result<()> {
        self.post(
            &format!("/devices/{}/tank/temperature", device_id),
            json!({ "temperature": temperature }),
        )
        .await
    }

    async fn set_quiet_mode(&self, device_id: &str, mode: QuietMode) -> Result<()> {
        self.post(&format!("/devices/{}/quiet-mode", device_id), json!({ "mode": mode })).await
    }

    async fn set_powerful_time(&self, device_id: &str, duration: PowerfulTime) -> Result<()> {
        self.post(
            &format!("/devices/{}/powerful-time", device_id),
            json!({ "duration": duration }),
        )
        .await
    }

    async fn set_force_dhw(&self, device_id: &str, on: bool) -> Result<()> {
        self.post(&format!("/devices/{}/force-dhw", device_id), json!({ "on": on })).await
    }

    async fn set_force_heater(&self, device_id: &str, on: bool) -> Result<()> {
        self.post(&format!("/devices/{}/force-heater", device_id), json!({ "on": on })).await
    }

    async fn request_defrost(&self, device_id: &str) -> Result<()> {
        self.post(&format!("/devices/{}/request-defrost", device_id), json!({})).await
    }
}
