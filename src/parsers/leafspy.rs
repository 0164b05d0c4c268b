//! LeafSpy CSV log parser
//!
//! LeafSpy logs are plain comma-separated files with a single header line
//! followed by one row per sample. Every row has exactly 159 positional
//! columns:
//! - 0: date/time (`YYYY/MM/DD HH:MM:SS`)
//! - 1-3: latitude, longitude, elevation
//! - 4-22: drive and pack summary, including four optional pack temperature
//!   pairs that read `none` when the sensor is absent
//! - 23-118: the 96 cell pair voltages (CP1..CP96)
//! - 119-158: 12V system, tires, power figures and VCM state
//!
//! Several integer columns are logged in coarse raw units (100 W, 250 W, °C+40,
//! km/h×100) and are converted to physical units while decoding.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::types::{CellPairs, LeafLog, ParseStats, Parseable, Record, RowError};
use crate::error::{DecodeError, Error, Result, ValueKind};
use crate::files::list_files;
use crate::location::{parse_location, Location};
use crate::settings::{RowErrorPolicy, Settings};
use crate::state::{
    AC_POWER_STEP_W, AUX_POWER_STEP_W, CELL_PAIR_COUNT, COLUMN_COUNT, EST_AC_POWER_STEP_W,
    EST_HEATER_POWER_STEP_W, SPEED_SENSOR_DIVISOR, TEMPERATURE_OFFSET, UNAVAILABLE,
};

/// chrono accepts single-digit fields, so the exact shape is checked first
static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}/[0-9]{2}/[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
        .expect("Invalid regex pattern")
});

const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Sequential reader over the columns of one row.
///
/// The column count is validated before a cursor is created, so every
/// `next` call is in bounds.
struct Columns<'a, S> {
    fields: &'a [S],
    index: usize,
}

impl<'a, S: AsRef<str>> Columns<'a, S> {
    fn new(fields: &'a [S]) -> Self {
        Self { fields, index: 0 }
    }

    fn next(&mut self) -> (usize, &'a str) {
        let index = self.index;
        self.index += 1;
        (index, self.fields[index].as_ref())
    }

    fn is_exhausted(&self) -> bool {
        self.index == self.fields.len()
    }

    fn text(&mut self) -> String {
        self.next().1.to_string()
    }

    fn int(&mut self, column: &str) -> std::result::Result<i64, DecodeError> {
        let (index, value) = self.next();
        value
            .parse()
            .map_err(|_| invalid(index, column, value, ValueKind::Integer))
    }

    fn float(&mut self, column: &str) -> std::result::Result<f64, DecodeError> {
        let (index, value) = self.next();
        value
            .parse()
            .map_err(|_| invalid(index, column, value, ValueKind::Float))
    }

    /// Float column that may hold the `none` token; absent values read as 0.0
    fn optional_float(&mut self, column: &str) -> std::result::Result<f64, DecodeError> {
        let (index, value) = self.next();
        if value == UNAVAILABLE {
            return Ok(0.0);
        }
        value
            .parse()
            .map_err(|_| invalid(index, column, value, ValueKind::Float))
    }

    /// Integer column logged in multiples of `step`
    fn scaled_int(&mut self, column: &str, step: i64) -> std::result::Result<i64, DecodeError> {
        let (index, value) = self.next();
        value
            .parse::<i64>()
            .ok()
            .and_then(|raw| raw.checked_mul(step))
            .ok_or_else(|| invalid(index, column, value, ValueKind::Integer))
    }

    /// Temperature column logged as °C + 40
    fn offset_temperature(&mut self, column: &str) -> std::result::Result<i64, DecodeError> {
        let (index, value) = self.next();
        value
            .parse::<i64>()
            .ok()
            .and_then(|raw| raw.checked_sub(TEMPERATURE_OFFSET))
            .ok_or_else(|| invalid(index, column, value, ValueKind::Integer))
    }

    /// Wheel speed column logged as km/h × 100
    fn speed_sensor(&mut self, column: &str) -> std::result::Result<f64, DecodeError> {
        Ok(self.float(column)? / SPEED_SENSOR_DIVISOR)
    }

    fn boolean(&mut self, column: &str, strict: bool) -> std::result::Result<bool, DecodeError> {
        let (index, value) = self.next();
        match parse_bool(value) {
            Some(flag) => Ok(flag),
            None if strict => Err(invalid(index, column, value, ValueKind::Boolean)),
            None => Ok(false),
        }
    }

    fn date_time(&mut self, column: &str) -> std::result::Result<NaiveDateTime, DecodeError> {
        let (index, value) = self.next();
        if !DATE_TIME_REGEX.is_match(value) {
            return Err(invalid(index, column, value, ValueKind::DateTime));
        }
        NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .map_err(|_| invalid(index, column, value, ValueKind::DateTime))
    }

    fn location(&mut self) -> std::result::Result<Location, DecodeError> {
        let (_, lat) = self.next();
        let (_, long) = self.next();
        let (_, elv) = self.next();
        Ok(parse_location(lat, long, elv)?)
    }

    /// CP1..CP96; any bad cell fails the whole row
    fn cell_pairs(&mut self) -> std::result::Result<CellPairs, DecodeError> {
        let mut millivolts = [0i64; CELL_PAIR_COUNT];
        for (i, slot) in millivolts.iter_mut().enumerate() {
            let (index, value) = self.next();
            *slot = value.parse().map_err(|_| {
                invalid(index, &format!("CP{}", i + 1), value, ValueKind::Integer)
            })?;
        }
        Ok(CellPairs::new(millivolts))
    }
}

fn invalid(index: usize, column: &str, value: &str, kind: ValueKind) -> DecodeError {
    DecodeError::InvalidField {
        index,
        column: column.to_string(),
        value: value.to_string(),
        kind,
    }
}

/// Decodes a single LeafSpy row into a [`Record`].
///
/// The decoder holds no per-row state and can be shared freely across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowDecoder {
    strict_booleans: bool,
}

impl RowDecoder {
    /// Decoder that tolerates unparseable Power SW/BMS/OBC tokens (read as false)
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that rejects rows with unparseable boolean columns
    pub fn strict() -> Self {
        Self {
            strict_booleans: true,
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            strict_booleans: settings.strict_booleans,
        }
    }

    pub fn strict_booleans(&self) -> bool {
        self.strict_booleans
    }

    /// Decode one row of positional fields.
    ///
    /// Fails with [`DecodeError::ColumnCount`] before touching any field when
    /// the row is not exactly 159 columns wide, otherwise with the first field
    /// that does not parse.
    pub fn decode<S: AsRef<str>>(&self, fields: &[S]) -> std::result::Result<Record, DecodeError> {
        if fields.len() != COLUMN_COUNT {
            return Err(DecodeError::ColumnCount {
                expected: COLUMN_COUNT,
                found: fields.len(),
            });
        }

        let strict = self.strict_booleans;
        let mut cols = Columns::new(fields);

        // Struct fields are evaluated in the order written, which is column order
        let record = Record {
            date_time: cols.date_time("Date/Time")?,
            location: cols.location()?,
            speed: cols.int("Speed")?,
            gids: cols.int("Gids")?,
            soc: cols.int("SOC")?,
            amp_hours: cols.int("AHr")?,
            pack_volts: cols.float("Pack Volts")?,
            pack_amps: cols.float("Pack Amps")?,
            max_cp_mv: cols.int("Max CP mV")?,
            min_cp_mv: cols.int("Min CP mV")?,
            avg_cp_mv: cols.int("Avg CP mV")?,
            cp_mv_diff: cols.int("CP mV Diff")?,
            judgment: cols.int("Judgment Value")?,
            pack_t1_f: cols.optional_float("Pack T1 F")?,
            pack_t1_c: cols.optional_float("Pack T1 C")?,
            pack_t2_f: cols.optional_float("Pack T2 F")?,
            pack_t2_c: cols.optional_float("Pack T2 C")?,
            pack_t3_f: cols.optional_float("Pack T3 F")?,
            pack_t3_c: cols.optional_float("Pack T3 C")?,
            pack_t4_f: cols.optional_float("Pack T4 F")?,
            pack_t4_c: cols.optional_float("Pack T4 C")?,
            cell_pairs: cols.cell_pairs()?,
            bat_12v_amps: cols.float("12v Bat Amps")?,
            vin: cols.text(),
            hx: cols.float("Hx")?,
            bat_12v_volts: cols.float("12v Bat Volts")?,
            odo_km: cols.float("Odo(km)")?,
            quick_charges: cols.int("QC")?,
            l1_l2_charges: cols.int("L1/L2")?,
            tire_pressure_fl: cols.float("TP-FL")?,
            tire_pressure_fr: cols.float("TP-FR")?,
            tire_pressure_rr: cols.float("TP-RR")?,
            tire_pressure_rl: cols.float("TP-RL")?,
            ambient_f: cols.float("Ambient")?,
            soh: cols.float("SOH")?,
            regen_wh: cols.int("RegenWh")?,
            b_level: cols.int("BLevel")?,
            epoch_time: cols.float("epoch time")?,
            motor_power_w: cols.int("Motor Pwr(w)")?,
            aux_power_w: cols.scaled_int("Aux Pwr(100w)", AUX_POWER_STEP_W)?,
            ac_power_w: cols.scaled_int("A/C Pwr(250w)", AC_POWER_STEP_W)?,
            ac_comp: cols.int("A/C Comp(0.1MPa)")?,
            est_ac_power_w: cols.scaled_int("Est Pwr A/C(50w)", EST_AC_POWER_STEP_W)?,
            est_heater_power_w: cols.scaled_int("Est Pwr Htr(250w)", EST_HEATER_POWER_STEP_W)?,
            plug_state: cols.int("Plug State")?,
            charge_mode: cols.int("Charge Mode")?,
            obc_out_power: cols.int("OBC Out Pwr")?,
            gear: cols.int("Gear")?,
            hvolt1: cols.float("HVolt1")?,
            hvolt2: cols.float("HVolt2")?,
            gps_status: cols.text(),
            power_switch: cols.boolean("Power SW", strict)?,
            bms: cols.boolean("BMS", strict)?,
            obc: cols.boolean("OBC", strict)?,
            debug: cols.text(),
            motor_temp: cols.offset_temperature("Motor Temp")?,
            inverter_2_temp: cols.offset_temperature("Inverter 2 Temp")?,
            inverter_4_temp: cols.offset_temperature("Inverter 4 Temp")?,
            speed1: cols.speed_sensor("Speed1")?,
            speed2: cols.speed_sensor("Speed2")?,
            wiper_status: cols.text(),
            torque_nm: cols.float("Torque Nm")?,
        };
        debug_assert!(cols.is_exhausted());

        Ok(record)
    }
}

/// Decode one row with the default (lenient boolean) decoder
pub fn decode_row<S: AsRef<str>>(fields: &[S]) -> std::result::Result<Record, DecodeError> {
    RowDecoder::new().decode(fields)
}

/// A LeafSpy log loaded from disk
#[derive(Clone, Debug)]
pub struct LoadedLog {
    pub path: PathBuf,
    pub log: LeafLog,
}

/// LeafSpy log file parser
#[derive(Clone, Debug, Default)]
pub struct LeafSpy {
    settings: Settings,
}

impl LeafSpy {
    /// Leading columns of the header line
    const HEADER_PREFIX: &'static str = "Date/Time,Lat,Long";

    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Detect if content is a LeafSpy CSV log
    pub fn detect(contents: &str) -> bool {
        contents
            .lines()
            .find(|line| !line.trim().is_empty())
            .is_some_and(Self::is_header)
    }

    fn is_header(line: &str) -> bool {
        line.trim_start_matches('\u{feff}')
            .trim_start()
            .starts_with(Self::HEADER_PREFIX)
    }

    /// Read and parse a log file
    pub fn parse_file(&self, path: &Path) -> Result<LeafLog> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let log = self.parse(&contents)?;

        tracing::info!(
            "Parsed {}: {} records, {} rows skipped",
            path.display(),
            log.stats.decoded,
            log.stats.skipped
        );

        Ok(log)
    }

    /// Parse every LeafSpy log directly under `root`.
    ///
    /// Directories, non-UTF-8 files and files without a LeafSpy header are
    /// skipped. Other I/O failures abort the load.
    pub fn load_directory(&self, root: &Path) -> Result<Vec<LoadedLog>> {
        let mut logs = Vec::new();

        for path in list_files(root)? {
            if !path.is_file() {
                continue;
            }

            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::debug!("Skipping non-text file {}", path.display());
                    continue;
                }
                Err(e) => return Err(Error::io(path, e)),
            };

            if !Self::detect(&contents) {
                tracing::debug!("Skipping {}: not a LeafSpy log", path.display());
                continue;
            }

            let log = self.parse(&contents)?;
            tracing::info!(
                "Parsed {}: {} records, {} rows skipped",
                path.display(),
                log.stats.decoded,
                log.stats.skipped
            );
            logs.push(LoadedLog { path, log });
        }

        Ok(logs)
    }
}

impl Parseable for LeafSpy {
    fn parse(&self, file_contents: &str) -> Result<LeafLog> {
        let decoder = RowDecoder::with_settings(&self.settings);

        // Phase 1: locate the header and collect data lines with their line numbers
        let mut lines = file_contents
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        match lines.next() {
            Some((_, header)) if Self::is_header(header) => {}
            _ => return Err(Error::MissingHeader),
        }

        let data_lines: Vec<(usize, &str)> = lines.collect();
        if data_lines.is_empty() {
            tracing::warn!("No data rows found in LeafSpy log");
        }

        // Phase 2: decode rows, in parallel when enabled (order is preserved)
        let decode = |&(line_no, line): &(usize, &str)| {
            let fields: Vec<&str> = line.split(',').collect();
            (line_no, decoder.decode(&fields))
        };
        let decoded: Vec<(usize, std::result::Result<Record, DecodeError>)> =
            if self.settings.parallel {
                data_lines.par_iter().map(decode).collect()
            } else {
                data_lines.iter().map(decode).collect()
            };

        // Phase 3: apply the row error policy in file order
        let mut stats = ParseStats {
            total_rows: decoded.len(),
            ..ParseStats::default()
        };
        let mut records = Vec::with_capacity(decoded.len());

        for (line, result) in decoded {
            match result {
                Ok(record) => {
                    records.push(record);
                    stats.decoded += 1;
                }
                Err(error) => match self.settings.row_errors {
                    RowErrorPolicy::Abort => return Err(Error::Row { line, source: error }),
                    RowErrorPolicy::Skip => {
                        tracing::debug!("Skipped line {}: {}", line, error);
                        stats.skipped += 1;
                        stats.errors.push(RowError { line, error });
                    }
                },
            }
        }

        Ok(LeafLog { records, stats })
    }
}
