//! Temperature conversion utilities.
//!
//! LeafSpy logs battery pack temperatures in both scales but the ambient
//! sensor only in Fahrenheit, so callers regularly need to hop between them.

use serde::{Deserialize, Serialize};

/// Convert degrees Celsius to degrees Fahrenheit
#[inline]
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert degrees Fahrenheit to degrees Celsius
#[inline]
pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Temperature unit preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Convert from Celsius to the selected unit
    pub fn convert_from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => c_to_f(celsius),
        }
    }

    /// Convert from Fahrenheit to the selected unit
    pub fn convert_from_fahrenheit(&self, fahrenheit: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => f_to_c(fahrenheit),
            TemperatureUnit::Fahrenheit => fahrenheit,
        }
    }
}
