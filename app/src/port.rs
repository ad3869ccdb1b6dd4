#![allow(async_fn_in_trait)]

use anyhow::Result;

use crate::core::time::DateTime;
use crate::core::unit::{DegreeCelsius, KiloWattHours};
use crate::device::{ConsumptionType, DeviceInfo, DeviceStatus, PowerfulTime, QuietMode, UpdateOperationMode};

/// The cloud-side surface of the heat pump. Authentication and wire protocol
/// live behind this trait; the rest of the app only sees domain types.
pub trait AquareaApi {
    async fn get_devices(&self) -> Result<Vec<DeviceInfo>>;

    async fn refresh_status(&self, device_id: &str) -> Result<DeviceStatus>;

    /// Consumption reported for the hour starting at `hour` (must be
    /// truncated to the top of the hour). `Ok(None)` means the hour is loaded
    /// but the device has not reported a value for it yet.
    async fn consumption(
        &self,
        device_id: &str,
        hour: DateTime,
        category: ConsumptionType,
    ) -> Result<Option<KiloWattHours>, ConsumptionError>;

    async fn set_zone_mode(&self, device_id: &str, zone_id: u8, mode: UpdateOperationMode) -> Result<()>;
    async fn set_zone_temperature(&self, device_id: &str, zone_id: u8, temperature: DegreeCelsius) -> Result<()>;
    async fn set_tank_mode(&self, device_id: &str, on: bool) -> Result<()>;
    async fn set_tank_temperature(&self, device_id: &str, temperature: DegreeCelsius) -> Result<()>;
    async fn set_quiet_mode(&self, device_id: &str, mode: QuietMode) -> Result<()>;
    async fn set_powerful_time(&self, device_id: &str, duration: PowerfulTime) -> Result<()>;
    async fn set_force_dhw(&self, device_id: &str, on: bool) -> Result<()>;
    async fn set_force_heater(&self, device_id: &str, on: bool) -> Result<()>;
    async fn request_defrost(&self, device_id: &str) -> Result<()>;
}

#[derive(Debug, derive_more::Display)]
pub enum ConsumptionError {
    //expected while the sample fetch is still in flight, retried on the next tick
    #[display("consumption sample not yet available")]
    NotYetAvailable,

    #[display("consumption lookup failed: {_0}")]
    Upstream(anyhow::Error),
}
