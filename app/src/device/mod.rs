mod modes;

pub use modes::*;

use crate::core::unit::DegreeCelsius;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device_id: String,
    pub name: String,
    pub manufacturer: String,
    pub firmware_version: String,
    pub has_tank: bool,
    pub zones: Vec<ZoneInfo>,
}

#[derive(Debug, Clone)]
pub struct ZoneInfo {
    pub zone_id: u8,
    pub name: String,
    pub cool_mode: bool,
    pub supports_set_temperature: bool,
}

impl DeviceInfo {
    pub fn supports_cooling(&self) -> bool {
        self.zones.iter().any(|z| z.cool_mode)
    }

    pub fn zone(&self, zone_id: u8) -> Option<&ZoneInfo> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub mode: ExtendedOperationMode,
    pub action: DeviceAction,
    pub mode_status: DeviceModeStatus,
    pub quiet_mode: QuietMode,
    pub powerful_time: PowerfulTime,
    pub force_dhw: bool,
    pub force_heater: bool,
    pub is_on_error: bool,
    pub outdoor_temperature: DegreeCelsius,
    pub zones: Vec<ZoneStatus>,
    pub tank: Option<TankStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStatus {
    pub zone_id: u8,
    pub operation_status: OperationStatus,
    pub temperature: DegreeCelsius,
    pub heat_target: DegreeCelsius,
    pub heat_min: DegreeCelsius,
    pub heat_max: DegreeCelsius,
    pub cool_target: DegreeCelsius,
    pub cool_min: DegreeCelsius,
    pub cool_max: DegreeCelsius,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TankStatus {
    pub operation_status: OperationStatus,
    pub temperature: DegreeCelsius,
    pub target_temperature: DegreeCelsius,
    pub heat_min: DegreeCelsius,
    pub heat_max: DegreeCelsius,
}

impl DeviceStatus {
    pub fn zone(&self, zone_id: u8) -> Option<&ZoneStatus> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    pub fn is_cooling_mode(&self) -> bool {
        matches!(
            self.mode,
            ExtendedOperationMode::Cool | ExtendedOperationMode::AutoCool
        )
    }
}
