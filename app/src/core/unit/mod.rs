mod degree_celsius;
mod kwh;

pub use degree_celsius::DegreeCelsius;
pub use kwh::KiloWattHours;
