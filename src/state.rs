//! Vehicle state codes reported by the BMS and VCM.
//!
//! The log stores these as raw integers. Records keep the raw code so that
//! firmware revisions introducing new codes still decode; the enums here are
//! an interpretation layer on top.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, FromRepr};

// ============================================================================
// Constants
// ============================================================================

/// Number of columns in a LeafSpy row
pub const COLUMN_COUNT: usize = 159;

/// Number of individually monitored cell pairs in the battery pack
pub const CELL_PAIR_COUNT: usize = 96;

/// Token LeafSpy writes when a pack temperature sensor is unavailable
pub const UNAVAILABLE: &str = "none";

/// Offset applied to motor and inverter temperature encodings (raw = °C + 40)
pub const TEMPERATURE_OFFSET: i64 = 40;

/// Speed sensor encodings are km/h × 100
pub const SPEED_SENSOR_DIVISOR: f64 = 100.0;

/// Raw auxiliary power unit in watts
pub const AUX_POWER_STEP_W: i64 = 100;

/// Raw A/C power unit in watts
pub const AC_POWER_STEP_W: i64 = 250;

/// Raw estimated A/C power unit in watts
pub const EST_AC_POWER_STEP_W: i64 = 50;

/// Raw estimated heater power unit in watts
pub const EST_HEATER_POWER_STEP_W: i64 = 250;

// ============================================================================
// State Codes
// ============================================================================

/// Charge port plug state
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, FromRepr, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum PlugState {
    #[strum(serialize = "Not plugged")]
    NotPlugged = 0,
    #[strum(serialize = "Partially plugged")]
    PartiallyPlugged = 1,
    #[strum(serialize = "Plugged")]
    Plugged = 2,
}

/// Active charging mode
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, FromRepr, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ChargeMode {
    #[strum(serialize = "Not charging")]
    NotCharging = 0,
    #[strum(serialize = "L1 charging")]
    Level1 = 1,
    #[strum(serialize = "L2 charging")]
    Level2 = 2,
    #[strum(serialize = "Quick charging")]
    Level3 = 3,
}

/// Shifter position
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, FromRepr, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Gear {
    #[strum(serialize = "Not ready")]
    NotReady = 0,
    #[strum(serialize = "P")]
    Park = 1,
    #[strum(serialize = "R")]
    Reverse = 2,
    #[strum(serialize = "N")]
    Neutral = 3,
    #[strum(serialize = "D")]
    Drive = 4,
    #[strum(serialize = "B/Eco")]
    EcoDrive = 7,
}

impl PlugState {
    /// Interpret a raw log code; unknown codes yield None
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

impl ChargeMode {
    /// Interpret a raw log code; unknown codes yield None
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn is_charging(self) -> bool {
        self != ChargeMode::NotCharging
    }
}

impl Gear {
    /// Interpret a raw log code; unknown codes yield None
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}
