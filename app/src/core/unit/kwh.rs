use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use derive_more::derive::AsRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, AsRef)]
pub struct KiloWattHours(pub f64);

impl KiloWattHours {
    pub fn abs(self) -> Self {
        KiloWattHours(self.0.abs())
    }
}

impl Display for KiloWattHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kWh", self.0)
    }
}

impl From<&KiloWattHours> for f64 {
    fn from(value: &KiloWattHours) -> Self {
        value.0
    }
}

impl From<KiloWattHours> for f64 {
    fn from(value: KiloWattHours) -> Self {
        value.0
    }
}

impl From<f64> for KiloWattHours {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Add for KiloWattHours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        KiloWattHours(self.0 + rhs.0)
    }
}

impl Sub for KiloWattHours {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        KiloWattHours(self.0 - rhs.0)
    }
}
