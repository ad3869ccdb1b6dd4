use serde_json::json;

use crate::consumption::{AccumulatedConsumption, ConsumptionSnapshot, ENERGY_UNIT, HourlyConsumption};
use crate::core::time::DateTime;
use crate::core::unit::KiloWattHours;
use crate::device::{ConsumptionType, DeviceInfo, DeviceStatus};
use crate::frontends::homeassistant::DeviceTopics;

use super::device_block;

pub struct OutdoorTemperatureSensor;

impl OutdoorTemperatureSensor {
    pub fn object_id(&self) -> String {
        "outdoor_temperature".to_string()
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": "Outdoor Temperature",
            "unique_id": format!("{}_outdoor_temperature", info.device_id),
            "state_topic": topics.state("outdoor_temperature"),
            "device_class": "temperature",
            "state_class": "measurement",
            "unit_of_measurement": "°C",
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }

    pub fn state(&self, status: &DeviceStatus) -> String {
        status.outdoor_temperature.0.to_string()
    }
}

enum Accumulator {
    Accumulated(AccumulatedConsumption),
    Hourly(HourlyConsumption),
}

/// Energy consumption sensor for one category. The accumulated flavor keeps
/// a running total across restarts, the hourly flavor reports the current
/// hour and pulses to zero at each hour boundary.
pub struct ConsumptionSensor {
    object_id: &'static str,
    name: &'static str,
    category: ConsumptionType,
    enabled_default: bool,
    accumulator: Accumulator,
}

impl ConsumptionSensor {
    fn accumulated(object_id: &'static str, name: &'static str, category: ConsumptionType) -> Self {
        Self {
            object_id,
            name,
            category,
            enabled_default: true,
            accumulator: Accumulator::Accumulated(AccumulatedConsumption::new()),
        }
    }

    fn hourly(object_id: &'static str, name: &'static str, category: ConsumptionType) -> Self {
        Self {
            object_id,
            name,
            category,
            enabled_default: false,
            accumulator: Accumulator::Hourly(HourlyConsumption::new()),
        }
    }

    pub fn object_id(&self) -> &str {
        self.object_id
    }

    pub fn category(&self) -> ConsumptionType {
        self.category
    }

    /// Runs one accumulator step, returning every value to publish for this
    /// tick in order.
    pub fn update(
        &mut self,
        now: DateTime,
        current: Option<KiloWattHours>,
        previous: Option<KiloWattHours>,
    ) -> Vec<KiloWattHours> {
        match &mut self.accumulator {
            Accumulator::Accumulated(accumulator) => {
                accumulator.update(now, current, previous).into_iter().collect()
            }
            Accumulator::Hourly(sensor) => sensor.update(now, current, previous),
        }
    }

    pub fn snapshot(&self) -> ConsumptionSnapshot {
        match &self.accumulator {
            Accumulator::Accumulated(accumulator) => accumulator.snapshot(),
            Accumulator::Hourly(sensor) => sensor.snapshot(),
        }
    }

    pub fn restore(&mut self, snapshot: &ConsumptionSnapshot) {
        self.accumulator = match &self.accumulator {
            Accumulator::Accumulated(_) => Accumulator::Accumulated(AccumulatedConsumption::restore(snapshot)),
            Accumulator::Hourly(_) => Accumulator::Hourly(HourlyConsumption::restore(snapshot)),
        };
    }

    pub fn discovery(&self, info: &DeviceInfo, topics: &DeviceTopics) -> serde_json::Value {
        json!({
            "name": self.name,
            "unique_id": format!("{}_{}", info.device_id, self.object_id),
            "state_topic": topics.state(self.object_id),
            "device_class": "energy",
            "state_class": "total_increasing",
            "unit_of_measurement": ENERGY_UNIT,
            "suggested_display_precision": 2,
            "enabled_by_default": self.enabled_default,
            "availability_topic": topics.availability(),
            "device": device_block(info),
        })
    }
}

pub(super) fn consumption_sensors(info: &DeviceInfo) -> Vec<ConsumptionSensor> {
    let mut sensors = vec![
        ConsumptionSensor::accumulated(
            "heating_accumulated_energy_consumption",
            "Heating Accumulated Consumption",
            ConsumptionType::Heat,
        ),
        ConsumptionSensor::hourly("heating_energy_consumption", "Heating Consumption", ConsumptionType::Heat),
    ];

    if info.supports_cooling() {
        sensors.push(ConsumptionSensor::accumulated(
            "cooling_accumulated_energy_consumption",
            "Cooling Accumulated Consumption",
            ConsumptionType::Cool,
        ));
        sensors.push(ConsumptionSensor::hourly(
            "cooling_energy_consumption",
            "Cooling Consumption",
            ConsumptionType::Cool,
        ));
    }

    if info.has_tank {
        sensors.push(ConsumptionSensor::accumulated(
            "tank_accumulated_energy_consumption",
            "Tank Accumulated Consumption",
            ConsumptionType::WaterTank,
        ));
        sensors.push(ConsumptionSensor::hourly(
            "tank_energy_consumption",
            "Tank Consumption",
            ConsumptionType::WaterTank,
        ));
    }

    sensors.push(ConsumptionSensor::accumulated(
        "accumulated_energy_consumption",
        "Accumulated Consumption",
        ConsumptionType::Total,
    ));
    sensors.push(ConsumptionSensor::hourly(
        "energy_consumption",
        "Consumption",
        ConsumptionType::Total,
    ));

    sensors
}
