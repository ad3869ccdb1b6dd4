use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedOperationMode {
    Off,
    Heat,
    Cool,
    AutoHeat,
    AutoCool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Idle,
    Heating,
    Cooling,
    HeatingWater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceModeStatus {
    Normal,
    Defrost,
}

//Requested mode change, device decides between auto-heat and auto-cool itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOperationMode {
    Off,
    Heat,
    Cool,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum QuietMode {
    #[display("off")]
    Off,
    #[display("level1")]
    Level1,
    #[display("level2")]
    Level2,
    #[display("level3")]
    Level3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum PowerfulTime {
    #[display("off")]
    Off,
    #[display("on-30m")]
    On30Min,
    #[display("on-60m")]
    On60Min,
    #[display("on-90m")]
    On90Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumptionType {
    Heat,
    Cool,
    WaterTank,
    Total,
}
