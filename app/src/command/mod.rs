#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};

use crate::core::unit::DegreeCelsius;
use crate::device::{DeviceModeStatus, DeviceStatus, PowerfulTime, QuietMode, UpdateOperationMode};
use crate::port::AquareaApi;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetZoneMode { zone_id: u8, mode: UpdateOperationMode },
    SetZoneTemperature { zone_id: u8, temperature: DegreeCelsius },
    SetTankMode { on: bool },
    SetTankTemperature { temperature: DegreeCelsius },
    SetQuietMode { mode: QuietMode },
    SetPowerfulTime { duration: PowerfulTime },
    SetForceDhw { on: bool },
    SetForceHeater { on: bool },
    RequestDefrost,
}

pub enum CommandExecutionResult {
    Triggered,
    Skipped,
}

pub trait CommandExecutor {
    async fn execute_command(
        &self,
        device_id: &str,
        command: &Command,
        status: Option<&DeviceStatus>,
    ) -> anyhow::Result<CommandExecutionResult>;
}

/// Dispatches commands to the cloud API, skipping the ones that would not
/// change anything on the device.
pub struct AquareaCommandExecutor<A> {
    api: A,
}

impl<A: AquareaApi> AquareaCommandExecutor<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

impl<A: AquareaApi> CommandExecutor for AquareaCommandExecutor<A> {
    #[tracing::instrument(skip(self, status))]
    async fn execute_command(
        &self,
        device_id: &str,
        command: &Command,
        status: Option<&DeviceStatus>,
    ) -> anyhow::Result<CommandExecutionResult> {
        use CommandExecutionResult::{Skipped, Triggered};

        match command {
            Command::SetZoneMode { zone_id, mode } => {
                self.api.set_zone_mode(device_id, *zone_id, *mode).await?;
            }
            Command::SetZoneTemperature { zone_id, temperature } => {
                self.api.set_zone_temperature(device_id, *zone_id, *temperature).await?;
            }
            Command::SetTankMode { on } => {
                self.api.set_tank_mode(device_id, *on).await?;
            }
            Command::SetTankTemperature { temperature } => {
                self.api.set_tank_temperature(device_id, *temperature).await?;
            }
            Command::SetQuietMode { mode } => {
                if status.is_some_and(|s| s.quiet_mode == *mode) {
                    return Ok(Skipped);
                }
                self.api.set_quiet_mode(device_id, *mode).await?;
            }
            Command::SetPowerfulTime { duration } => {
                if status.is_some_and(|s| s.powerful_time == *duration) {
                    return Ok(Skipped);
                }
                self.api.set_powerful_time(device_id, *duration).await?;
            }
            Command::SetForceDhw { on } => {
                self.api.set_force_dhw(device_id, *on).await?;
            }
            Command::SetForceHeater { on } => {
                self.api.set_force_heater(device_id, *on).await?;
            }
            Command::RequestDefrost => {
                //no point asking while the device is already defrosting
                if status.is_some_and(|s| s.mode_status == DeviceModeStatus::Defrost) {
                    return Ok(Skipped);
                }
                self.api.request_defrost(device_id).await?;
            }
        }

        Ok(Triggered)
    }
}
