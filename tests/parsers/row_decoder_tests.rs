//! Tests for the LeafSpy row decoder
//!
//! Tests cover:
//! - Column count gate
//! - Raw-unit scaling and offsets
//! - `none` handling for pack temperatures
//! - The 96 cell pair columns
//! - Fail-fast error reporting
//! - Boolean leniency vs strict mode

use crate::common::columns::*;
use crate::common::float_cmp::*;
use crate::common::{row_with, sample_row};
use leaflog::state::{ChargeMode, Gear, PlugState};
use leaflog::{decode_row, DecodeError, LocationError, RowDecoder, ValueKind};

// ============================================
// Column Count Tests
// ============================================

#[test]
fn test_one_column_short_is_structural_error() {
    let mut row = sample_row();
    row.pop();

    let err = decode_row(&row).expect_err("158 columns must be rejected");
    assert_eq!(
        err,
        DecodeError::ColumnCount {
            expected: 159,
            found: 158
        }
    );
}

#[test]
fn test_extra_column_is_structural_error() {
    let mut row = sample_row();
    row.push("extra".to_string());

    assert!(matches!(
        decode_row(&row),
        Err(DecodeError::ColumnCount { found: 160, .. })
    ));
}

#[test]
fn test_structural_error_before_field_parsing() {
    // Garbage in every column still reports the count, not a field error
    let row: Vec<&str> = vec!["garbage"; 158];
    assert!(matches!(
        decode_row(&row),
        Err(DecodeError::ColumnCount { found: 158, .. })
    ));

    let empty: Vec<&str> = Vec::new();
    assert!(matches!(
        decode_row(&empty),
        Err(DecodeError::ColumnCount { found: 0, .. })
    ));
}

// ============================================
// Basic Decoding Tests
// ============================================

#[test]
fn test_decode_sample_row() {
    let record = decode_row(&sample_row()).expect("Should decode sample row");

    assert_eq!(record.date_time.to_string(), "2016-03-12 08:15:00");
    assert_eq!(record.speed, 64);
    assert_eq!(record.gids, 198);
    assert_eq!(record.soc, 745210);
    assert_eq!(record.amp_hours, 5890);
    assert_approx_eq(record.pack_volts, 372.4, DEFAULT_TOLERANCE);
    assert_approx_eq(record.pack_amps, 25.75, DEFAULT_TOLERANCE);
    assert_eq!(record.max_cp_mv, 3885);
    assert_eq!(record.min_cp_mv, 3861);
    assert_eq!(record.avg_cp_mv, 3874);
    assert_eq!(record.cp_mv_diff, 24);
    assert_eq!(record.judgment, 1);
    assert_approx_eq(record.bat_12v_amps, -1.25, DEFAULT_TOLERANCE);
    assert_approx_eq(record.hx, 80.12, DEFAULT_TOLERANCE);
    assert_approx_eq(record.bat_12v_volts, 13.1, DEFAULT_TOLERANCE);
    assert_approx_eq(record.odo_km, 41234.6, DEFAULT_TOLERANCE);
    assert_eq!(record.quick_charges, 17);
    assert_eq!(record.l1_l2_charges, 388);
    assert_approx_eq(record.tire_pressure_fl, 37.0, DEFAULT_TOLERANCE);
    assert_approx_eq(record.tire_pressure_rl, 36.0, DEFAULT_TOLERANCE);
    assert_approx_eq(record.ambient_f, 50.0, DEFAULT_TOLERANCE);
    assert_approx_eq(record.soh, 84.75, DEFAULT_TOLERANCE);
    assert_eq!(record.regen_wh, 2201);
    assert_eq!(record.b_level, 9);
    assert_approx_eq(record.epoch_time, 1457770500.0, DEFAULT_TOLERANCE);
    assert_eq!(record.motor_power_w, 21000);
    assert_eq!(record.ac_comp, 6);
    assert_eq!(record.obc_out_power, 0);
    assert_approx_eq(record.hvolt1, 373.0, DEFAULT_TOLERANCE);
    assert_approx_eq(record.hvolt2, 371.8, DEFAULT_TOLERANCE);
    assert_approx_eq(record.torque_nm, 85.25, DEFAULT_TOLERANCE);
}

#[test]
fn test_location_columns() {
    let record = decode_row(&sample_row()).unwrap();
    assert_approx_eq(record.location.latitude, 47.605, DEFAULT_TOLERANCE);
    assert_approx_eq(record.location.longitude, -122.333, DEFAULT_TOLERANCE);
    assert_approx_eq(record.location.elevation, 56.0, DEFAULT_TOLERANCE);
}

#[test]
fn test_text_columns_verbatim() {
    let record = decode_row(&sample_row()).unwrap();
    assert_eq!(record.vin, "1N4AZ0CP5DC400001");
    assert_eq!(record.gps_status, "GPS fix");
    assert_eq!(record.debug, "");
    assert_eq!(record.wiper_status, "Int");

    let record = decode_row(&row_with(VIN, "  padded vin ")).unwrap();
    assert_eq!(record.vin, "  padded vin ");
}

#[test]
fn test_decode_accepts_str_slices() {
    let owned = sample_row();
    let borrowed: Vec<&str> = owned.iter().map(String::as_str).collect();
    assert_eq!(decode_row(&borrowed).unwrap(), decode_row(&owned).unwrap());
}

// ============================================
// Scaling Tests
// ============================================

#[test]
fn test_aux_power_scaled_by_100() {
    let record = decode_row(&row_with(AUX_PWR, "5")).unwrap();
    assert_eq!(record.aux_power_w, 500);
}

#[test]
fn test_power_columns_scaled() {
    let record = decode_row(&sample_row()).unwrap();
    assert_eq!(record.ac_power_w, 3 * 250);
    assert_eq!(record.est_ac_power_w, 4 * 50);
    assert_eq!(record.est_heater_power_w, 2 * 250);
}

#[test]
fn test_motor_temp_offset() {
    let record = decode_row(&row_with(MOTOR_TEMP, "30")).unwrap();
    assert_eq!(record.motor_temp, -10);
}

#[test]
fn test_inverter_temp_offsets() {
    let record = decode_row(&sample_row()).unwrap();
    assert_eq!(record.inverter_2_temp, 58 - 40);
    assert_eq!(record.inverter_4_temp, 61 - 40);
}

#[test]
fn test_speed_sensors_divided_by_100() {
    let record = decode_row(&sample_row()).unwrap();
    assert_approx_eq(record.speed1, 64.03, DEFAULT_TOLERANCE);
    assert_approx_eq(record.speed2, 63.98, DEFAULT_TOLERANCE);

    let record = decode_row(&row_with(SPEED1, "2495")).unwrap();
    assert_approx_eq(record.speed1, 24.95, DEFAULT_TOLERANCE);
}

#[test]
fn test_negative_raw_values_scale() {
    let record = decode_row(&row_with(EST_PWR_HTR, "-2")).unwrap();
    assert_eq!(record.est_heater_power_w, -500);

    let record = decode_row(&row_with(INVERTER_4_TEMP, "0")).unwrap();
    assert_eq!(record.inverter_4_temp, -40);
}

#[test]
fn test_scaled_column_rejects_non_integer() {
    let err = decode_row(&row_with(AC_PWR, "2.5")).unwrap_err();
    assert_eq!(err.column_index(), Some(AC_PWR));
}

// ============================================
// Optional Pack Temperature Tests
// ============================================

#[test]
fn test_none_pack_temperatures_read_as_zero() {
    for index in PACK_T1_F..=PACK_T4_C {
        let record = decode_row(&row_with(index, "none"))
            .unwrap_or_else(|e| panic!("column {} with 'none' failed: {}", index, e));
        let temps = [
            record.pack_t1_f,
            record.pack_t1_c,
            record.pack_t2_f,
            record.pack_t2_c,
            record.pack_t3_f,
            record.pack_t3_c,
            record.pack_t4_f,
            record.pack_t4_c,
        ];
        assert_eq!(temps[index - PACK_T1_F], 0.0);
        // Rest of the row still decoded
        assert_eq!(record.motor_temp, -10);
    }
}

#[test]
fn test_pack_temperature_values() {
    let record = decode_row(&sample_row()).unwrap();
    assert_approx_eq(record.pack_t1_f, 68.2, DEFAULT_TOLERANCE);
    assert_approx_eq(record.pack_t1_c, 20.1, DEFAULT_TOLERANCE);
    assert_approx_eq(record.pack_t2_f, 69.0, DEFAULT_TOLERANCE);
    assert_approx_eq(record.pack_t2_c, 20.6, DEFAULT_TOLERANCE);
    assert_eq!(record.pack_t3_f, 0.0);
    assert_eq!(record.pack_t3_c, 0.0);
    assert_approx_eq(record.pack_t4_f, 67.5, DEFAULT_TOLERANCE);
    assert_approx_eq(record.pack_t4_c, 19.7, DEFAULT_TOLERANCE);
}

#[test]
fn test_sentinel_is_case_sensitive() {
    for token in ["None", "NONE", "n/a", ""] {
        let err = decode_row(&row_with(PACK_T1_F, token)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                index: PACK_T1_F,
                column: "Pack T1 F".to_string(),
                value: token.to_string(),
                kind: ValueKind::Float,
            }
        );
    }
}

#[test]
fn test_sentinel_not_accepted_elsewhere() {
    let err = decode_row(&row_with(PACK_VOLTS, "none")).unwrap_err();
    assert_eq!(err.column_index(), Some(PACK_VOLTS));
}

// ============================================
// Cell Pair Tests
// ============================================

#[test]
fn test_cell_pairs_dense_one_based() {
    let record = decode_row(&sample_row()).unwrap();
    assert_eq!(record.cell_pairs.len(), 96);
    for (index, mv) in record.cell_pairs.iter() {
        assert_eq!(mv, 3840 + index as i64);
    }
    assert_eq!(record.cell_pair(0), None);
    assert_eq!(record.cell_pair(1), Some(3841));
    assert_eq!(record.cell_pair(96), Some(3936));
    assert_eq!(record.cell_pair(97), None);
}

#[test]
fn test_bad_cell_mid_table_fails_row() {
    // A later valid cell must not mask an earlier failure
    let err = decode_row(&row_with(CP1 + 9, "3.9v")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidField {
            index: CP1 + 9,
            column: "CP10".to_string(),
            value: "3.9v".to_string(),
            kind: ValueKind::Integer,
        }
    );
}

#[test]
fn test_bad_last_cell_fails_row() {
    let err = decode_row(&row_with(CP96, "")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidField { index: CP96, ref column, .. } if column == "CP96"
    ));
}

// ============================================
// Error Reporting Tests
// ============================================

#[test]
fn test_error_names_failing_column() {
    let cases = [
        (SPEED, "Speed", ValueKind::Integer),
        (GIDS, "Gids", ValueKind::Integer),
        (JUDGMENT, "Judgment Value", ValueKind::Integer),
        (BAT_12V_AMPS, "12v Bat Amps", ValueKind::Float),
        (AMBIENT, "Ambient", ValueKind::Float),
        (PLUG_STATE, "Plug State", ValueKind::Integer),
        (GEAR, "Gear", ValueKind::Integer),
        (MOTOR_TEMP, "Motor Temp", ValueKind::Integer),
        (SPEED2, "Speed2", ValueKind::Float),
        (TORQUE, "Torque Nm", ValueKind::Float),
    ];

    for (index, column, kind) in cases {
        let err = decode_row(&row_with(index, "bogus")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                index,
                column: column.to_string(),
                value: "bogus".to_string(),
                kind,
            }
        );
    }
}

#[test]
fn test_first_failing_column_wins() {
    let mut row = sample_row();
    row[TORQUE] = "x".to_string();
    row[CP1 + 50] = "x".to_string();
    row[SPEED] = "x".to_string();

    let err = decode_row(&row).unwrap_err();
    assert_eq!(err.column_index(), Some(SPEED));
}

#[test]
fn test_bad_date_time() {
    for bad in ["", "2016/03/12", "2016/03/12T08:15:00", "2016/13/01 00:00:00"] {
        let err = decode_row(&row_with(DATE_TIME, bad)).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::InvalidField {
                    index: DATE_TIME,
                    kind: ValueKind::DateTime,
                    ..
                }
            ),
            "accepted {:?}",
            bad
        );
    }
}

#[test]
fn test_location_error_propagates() {
    let err = decode_row(&row_with(LAT, "somewhere")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::Location(LocationError::InvalidCoordinate {
            axis: "latitude",
            value: "somewhere".to_string(),
        })
    );

    let err = decode_row(&row_with(ELV, "")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Location(LocationError::InvalidElevation(_))
    ));

    let err = decode_row(&row_with(LONG, "200.0")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Location(LocationError::OutOfRange { .. })
    ));
}

#[test]
fn test_integers_allow_sign_but_not_whitespace() {
    let record = decode_row(&row_with(SPEED, "+12")).unwrap();
    assert_eq!(record.speed, 12);

    assert!(decode_row(&row_with(SPEED, " 12")).is_err());
    assert!(decode_row(&row_with(SPEED, "12.0")).is_err());
}

// ============================================
// Boolean Column Tests
// ============================================

#[test]
fn test_boolean_tokens() {
    let record = decode_row(&sample_row()).unwrap();
    assert!(record.power_switch);
    assert!(record.bms);
    assert!(!record.obc);

    let record = decode_row(&row_with(OBC, "T")).unwrap();
    assert!(record.obc);
}

#[test]
fn test_lenient_booleans_continue_decoding() {
    let mut row = sample_row();
    row[POWER_SW] = "on".to_string();
    row[BMS] = "".to_string();

    let record = RowDecoder::new().decode(&row).unwrap();
    assert!(!record.power_switch);
    assert!(!record.bms);
    assert!(!record.obc);
    // Columns after the booleans are fully decoded
    assert_eq!(record.motor_temp, -10);
    assert_eq!(record.wiper_status, "Int");
    assert_approx_eq(record.torque_nm, 85.25, DEFAULT_TOLERANCE);
}

#[test]
fn test_strict_booleans_fail_row() {
    let err = RowDecoder::strict()
        .decode(&row_with(BMS, "on"))
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidField {
            index: BMS,
            column: "BMS".to_string(),
            value: "on".to_string(),
            kind: ValueKind::Boolean,
        }
    );
    assert!(RowDecoder::strict().decode(&sample_row()).is_ok());
}

// ============================================
// State Code Tests
// ============================================

#[test]
fn test_known_state_codes() {
    let record = decode_row(&sample_row()).unwrap();
    assert_eq!(record.plug_state(), Some(PlugState::Plugged));
    assert_eq!(record.charge_mode(), Some(ChargeMode::Level1));
    assert_eq!(record.gear(), Some(Gear::Drive));
}

#[test]
fn test_unknown_state_codes_are_kept() {
    let mut row = sample_row();
    row[PLUG_STATE] = "9".to_string();
    row[CHARGE_MODE] = "-1".to_string();
    row[GEAR] = "5".to_string();

    let record = decode_row(&row).expect("unknown codes must not fail decoding");
    assert_eq!(record.plug_state, 9);
    assert_eq!(record.charge_mode, -1);
    assert_eq!(record.gear, 5);
    assert_eq!(record.plug_state(), None);
    assert_eq!(record.charge_mode(), None);
    assert_eq!(record.gear(), None);
}

// ============================================
// Record Helper Tests
// ============================================

#[test]
fn test_ambient_celsius() {
    let record = decode_row(&row_with(AMBIENT, "212")).unwrap();
    assert_approx_eq(record.ambient_c(), 100.0, DEFAULT_TOLERANCE);
}

#[test]
fn test_timestamp_seconds() {
    let record = decode_row(&sample_row()).unwrap();
    // 2016-03-12 08:15:00 UTC
    assert_eq!(record.timestamp(), 1457770500);
}

#[test]
fn test_record_serializes() {
    let record = decode_row(&sample_row()).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["aux_power_w"], 500);
    assert_eq!(json["cell_pairs"].as_array().map(Vec::len), Some(96));
    assert_eq!(json["vin"], "1N4AZ0CP5DC400001");
}

#[test]
fn test_decoder_is_shareable_across_threads() {
    let decoder = RowDecoder::new();
    let rows: Vec<Vec<String>> = (0..8)
        .map(|i| row_with(SPEED, &i.to_string()))
        .collect();

    let speeds: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = rows
            .iter()
            .map(|row| scope.spawn(move || decoder.decode(row).unwrap().speed))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(speeds, (0..8).collect::<Vec<i64>>());
}
