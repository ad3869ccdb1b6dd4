use anyhow::bail;
use serde::Deserialize;

use crate::core::unit::DegreeCelsius;
use crate::device::{
    ConsumptionType, DeviceAction, DeviceInfo, DeviceModeStatus, DeviceStatus, ExtendedOperationMode, OperationStatus,
    QuietMode, PowerfulTime, TankStatus, ZoneInfo, ZoneStatus,
};

#[derive(Debug, Deserialize)]
pub(super) struct DeviceDto {
    pub device_id: String,
    pub name: String,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    pub firmware_version: String,
    pub has_tank: bool,
    pub zones: Vec<ZoneDto>,
}

fn default_manufacturer() -> String {
    "Panasonic".to_string()
}

#[derive(Debug, Deserialize)]
pub(super) struct ZoneDto {
    pub zone_id: u8,
    pub name: String,
    pub cool_mode: bool,
    pub supports_set_temperature: bool,
}

impl From<DeviceDto> for DeviceInfo {
    fn from(dto: DeviceDto) -> Self {
        DeviceInfo {
            device_id: dto.device_id,
            name: dto.name,
            manufacturer: dto.manufacturer,
            firmware_version: dto.firmware_version,
            has_tank: dto.has_tank,
            zones: dto
                .zones
                .into_iter()
                .map(|z| ZoneInfo {
                    zone_id: z.zone_id,
                    name: z.name,
                    cool_mode: z.cool_mode,
                    supports_set_temperature: z.supports_set_temperature,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusDto {
    pub operation_mode: String,
    pub device_action: String,
    pub device_mode_status: String,
    pub quiet_mode: String,
    pub powerful_time: String,
    pub force_dhw: bool,
    pub force_heater: bool,
    pub is_on_error: bool,
    pub outdoor_temperature: f64,
    pub zones: Vec<ZoneStatusDto>,
    pub tank: Option<TankStatusDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ZoneStatusDto {
    pub zone_id: u8,
    pub operation_status: String,
    pub temperature: f64,
    pub heat_target: f64,
    pub heat_min: f64,
    pub heat_max: f64,
    pub cool_target: f64,
    pub cool_min: f64,
    pub cool_max: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct TankStatusDto {
    pub operation_status: String,
    pub temperature: f64,
    pub target_temperature: f64,
    pub heat_min: f64,
    pub heat_max: f64,
}

impl TryFrom<StatusDto> for DeviceStatus {
    type Error = anyhow::Error;

    fn try_from(dto: StatusDto) -> Result<Self, Self::Error> {
        Ok(DeviceStatus {
            mode: parse_operation_mode(&dto.operation_mode)?,
            action: parse_device_action(&dto.device_action)?,
            mode_status: parse_mode_status(&dto.device_mode_status)?,
            quiet_mode: parse_quiet_mode(&dto.quiet_mode)?,
            powerful_time: parse_powerful_time(&dto.powerful_time)?,
            force_dhw: dto.force_dhw,
            force_heater: dto.force_heater,
            is_on_error: dto.is_on_error,
            outdoor_temperature: DegreeCelsius(dto.outdoor_temperature),
            zones: dto.zones.into_iter().map(ZoneStatus::try_from).collect::<Result<_, _>>()?,
            tank: dto.tank.map(TankStatus::try_from).transpose()?,
        })
    }
}

impl TryFrom<ZoneStatusDto> for ZoneStatus {
    type Error = anyhow::Error;

    fn try_from(dto: ZoneStatusDto) -> Result<Self, Self::Error> {
        Ok(ZoneStatus {
            zone_id: dto.zone_id,
            operation_status: parse_operation_status(&dto.operation_status)?,
            temperature: DegreeCelsius(dto.temperature),
            heat_target: DegreeCelsius(dto.heat_target),
            heat_min: DegreeCelsius(dto.heat_min),
            heat_max: DegreeCelsius(dto.heat_max),
            cool_target: DegreeCelsius(dto.cool_target),
            cool_min: DegreeCelsius(dto.cool_min),
            cool_max: DegreeCelsius(dto.cool_max),
        })
    }
}

impl TryFrom<TankStatusDto> for TankStatus {
    type Error = anyhow::Error;

    fn try_from(dto: TankStatusDto) -> Result<Self, Self::Error> {
        Ok(TankStatus {
            operation_status: parse_operation_status(&dto.operation_status)?,
            temperature: DegreeCelsius(dto.temperature),
            target_temperature: DegreeCelsius(dto.target_temperature),
            heat_min: DegreeCelsius(dto.heat_min),
            heat_max: DegreeCelsius(dto.heat_max),
        })
    }
}

fn parse_operation_mode(value: &str) -> anyhow::Result<ExtendedOperationMode> {
    Ok(match value {
        "off" => ExtendedOperationMode::Off,
        "heat" => ExtendedOperationMode::Heat,
        "cool" => ExtendedOperationMode::Cool,
        "auto_heat" => ExtendedOperationMode::AutoHeat,
        "auto_cool" => ExtendedOperationMode::AutoCool,
        other => bail!("Unknown operation mode {:?}", other),
    })
}

fn parse_device_action(value: &str) -> anyhow::Result<DeviceAction> {
    Ok(match value {
        "idle" => DeviceAction::Idle,
        "heating" => DeviceAction::Heating,
        "cooling" => DeviceAction::Cooling,
        "heating_water" => DeviceAction::HeatingWater,
        other => bail!("Unknown device action {:?}", other),
    })
}

fn parse_mode_status(value: &str) -> anyhow::Result<DeviceModeStatus> {
    Ok(match value {
        "normal" => DeviceModeStatus::Normal,
        "defrost" => DeviceModeStatus::Defrost,
        other => bail!("Unknown device mode status {:?}", other),
    })
}

fn parse_quiet_mode(value: &str) -> anyhow::Result<QuietMode> {
    Ok(match value {
        "off" => QuietMode::Off,
        "level1" => QuietMode::Level1,
        "level2" => QuietMode::Level2,
        "level3" => QuietMode::Level3,
        other => bail!("Unknown quiet mode {:?}", other),
    })
}

fn parse_powerful_time(value: &str) -> anyhow::Result<PowerfulTime> {
    Ok(match value {
        "off" => PowerfulTime::Off,
        "on-30m" => PowerfulTime::On30Min,
        "on-60m" => PowerfulTime::On60Min,
        "on-90m" => PowerfulTime::On90Min,
        other => bail!("Unknown powerful time {:?}", other),
    })
}

fn parse_operation_status(value: &str) -> anyhow::Result<OperationStatus> {
    Ok(match value {
        "on" => OperationStatus::On,
        "off" => OperationStatus::Off,
        other => bail!("Unknown operation status {:?}", other),
    })
}

/// One day of per-hour consumption samples per category. Hours with no
/// reported value yet are `null` in the API response.
#[derive(Debug, Deserialize)]
pub(super) struct DailyConsumptionDto {
    pub heat: Vec<Option<f64>>,
    pub cool: Vec<Option<f64>>,
    pub water_tank: Vec<Option<f64>>,
    pub total: Vec<Option<f64>>,
}

impl DailyConsumptionDto {
    pub fn value_at(&self, hour_index: usize, category: ConsumptionType) -> Option<f64> {
        let series = match category {
            ConsumptionType::Heat => &self.heat,
            ConsumptionType::Cool => &self.cool,
            ConsumptionType::WaterTank => &self.water_tank,
            ConsumptionType::Total => &self.total,
        };

        series.get(hour_index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping_from_json() {
        let dto: StatusDto = serde_json::from_value(json!({
            "operation_mode": "heat",
            "device_action": "heating",
            "device_mode_status": "normal",
            "quiet_mode": "level1",
            "powerful_time": "off",
            "force_dhw": false,
            "force_heater": false,
            "is_on_error": false,
            "outdoor_temperature": 4.5,
            "zones": [{
                "zone_id": 1,
                "operation_status": "on",
                "temperature": 21.0,
                "heat_target": 22.0,
                "heat_min": 16.0,
                "heat_max": 30.0,
                "cool_target": 24.0,
                "cool_min": 18.0,
                "cool_max": 28.0
            }],
            "tank": null
        }))
        .unwrap();

        let status = DeviceStatus::try_from(dto).unwrap();

        assert_eq!(status.mode, ExtendedOperationMode::Heat);
        assert_eq!(status.quiet_mode, QuietMode::Level1);
        assert_eq!(status.zones[0].operation_status, OperationStatus::On);
        assert!(status.tank.is_none());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = parse_operation_mode("turbo");
        assert!(result.is_err());
    }

    #[test]
    fn daily_consumption_lookup() {
        let dto: DailyConsumptionDto = serde_json::from_value(json!({
            "heat": [0.5, 0.7, null],
            "cool": [null, null, null],
            "water_tank": [0.1, 0.2, 0.3],
            "total": [0.6, 0.9, null]
        }))
        .unwrap();

        assert_eq!(dto.value_at(0, ConsumptionType::Heat), Some(0.5));
        assert_eq!(dto.value_at(2, ConsumptionType::Heat), None);
        assert_eq!(dto.value_at(1, ConsumptionType::Cool), None);
        assert_eq!(dto.value_at(2, ConsumptionType::WaterTank), Some(0.3));
        assert_eq!(dto.value_at(5, ConsumptionType::Total), None);
    }
}
