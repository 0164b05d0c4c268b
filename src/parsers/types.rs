use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::{DecodeError, Result};
use crate::location::Location;
use crate::state::{ChargeMode, Gear, PlugState, CELL_PAIR_COUNT};
use crate::units::f_to_c;

/// Cell pair voltages in millivolts, indexed 1..=96
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellPairs([i64; CELL_PAIR_COUNT]);

impl CellPairs {
    pub fn new(millivolts: [i64; CELL_PAIR_COUNT]) -> Self {
        Self(millivolts)
    }

    /// Voltage of a cell pair by its 1-based index
    pub fn get(&self, index: usize) -> Option<i64> {
        index.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    /// Always [`CELL_PAIR_COUNT`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(index, millivolts)` pairs in cell order
    pub fn iter(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.0.iter().enumerate().map(|(i, mv)| (i + 1, *mv))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

// serde only derives arrays up to 32 elements
impl Serialize for CellPairs {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

/// One decoded LeafSpy sample.
///
/// All scaled columns are stored in physical units: powers in watts,
/// motor/inverter temperatures in °C, speed sensors in km/h.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub date_time: NaiveDateTime,
    pub location: Location,
    pub speed: i64,
    pub gids: i64,
    pub soc: i64,
    pub amp_hours: i64,
    pub pack_volts: f64,
    pub pack_amps: f64,
    pub max_cp_mv: i64,
    pub min_cp_mv: i64,
    pub avg_cp_mv: i64,
    pub cp_mv_diff: i64,
    pub judgment: i64,
    /// Pack temperatures are 0.0 when the logger reported the sensor as `none`
    pub pack_t1_f: f64,
    pub pack_t1_c: f64,
    pub pack_t2_f: f64,
    pub pack_t2_c: f64,
    pub pack_t3_f: f64,
    pub pack_t3_c: f64,
    pub pack_t4_f: f64,
    pub pack_t4_c: f64,
    pub cell_pairs: CellPairs,
    pub bat_12v_amps: f64,
    pub vin: String,
    pub hx: f64,
    pub bat_12v_volts: f64,
    pub odo_km: f64,
    pub quick_charges: i64,
    pub l1_l2_charges: i64,
    pub tire_pressure_fl: f64,
    pub tire_pressure_fr: f64,
    pub tire_pressure_rr: f64,
    pub tire_pressure_rl: f64,
    pub ambient_f: f64,
    pub soh: f64,
    pub regen_wh: i64,
    pub b_level: i64,
    pub epoch_time: f64,
    pub motor_power_w: i64,
    pub aux_power_w: i64,
    pub ac_power_w: i64,
    pub ac_comp: i64,
    pub est_ac_power_w: i64,
    pub est_heater_power_w: i64,
    /// Raw code, see [`PlugState`]
    pub plug_state: i64,
    /// Raw code, see [`ChargeMode`]
    pub charge_mode: i64,
    pub obc_out_power: i64,
    /// Raw code, see [`Gear`]
    pub gear: i64,
    pub hvolt1: f64,
    pub hvolt2: f64,
    pub gps_status: String,
    pub power_switch: bool,
    pub bms: bool,
    pub obc: bool,
    pub debug: String,
    pub motor_temp: i64,
    pub inverter_2_temp: i64,
    pub inverter_4_temp: i64,
    pub speed1: f64,
    pub speed2: f64,
    pub wiper_status: String,
    pub torque_nm: f64,
}

impl Record {
    /// Voltage of a cell pair by its 1-based index
    pub fn cell_pair(&self, index: usize) -> Option<i64> {
        self.cell_pairs.get(index)
    }

    pub fn plug_state(&self) -> Option<PlugState> {
        PlugState::from_code(self.plug_state)
    }

    pub fn charge_mode(&self) -> Option<ChargeMode> {
        ChargeMode::from_code(self.charge_mode)
    }

    pub fn gear(&self) -> Option<Gear> {
        Gear::from_code(self.gear)
    }

    /// Ambient temperature in Celsius
    pub fn ambient_c(&self) -> f64 {
        f_to_c(self.ambient_f)
    }

    /// Sample time as seconds since the Unix epoch, treating the logged
    /// wall-clock time as UTC
    pub fn timestamp(&self) -> i64 {
        self.date_time.and_utc().timestamp()
    }
}

/// A row that failed to decode
#[derive(Clone, Debug, Serialize)]
pub struct RowError {
    /// 1-based line number in the source file
    pub line: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

fn serialize_display<S>(error: &DecodeError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(error)
}

/// Row-level statistics for one parsed file
#[derive(Clone, Debug, Default, Serialize)]
pub struct ParseStats {
    /// Data rows encountered (header and blank lines excluded)
    pub total_rows: usize,
    pub decoded: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

impl ParseStats {
    /// Percentage of rows that decoded successfully
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.decoded as f64 / self.total_rows as f64) * 100.0
        }
    }
}

/// Parsed log file
#[derive(Clone, Debug, Default)]
pub struct LeafLog {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Trait for log file parsers
pub trait Parseable {
    fn parse(&self, contents: &str) -> Result<LeafLog>;
}
