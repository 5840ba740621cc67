//! Field-test table parsing (OPM readings, ATP acceptance results).
//!
//! Exports come from different meters and spreadsheets, so each logical
//! field accepts several header spellings. The aliases are resolved against
//! the header row once per table; per row, the first resolved column with a
//! non-empty value wins.

use std::collections::HashMap;
use std::str::FromStr;

use fibernet_core::{AtpMeasurement, AtpResult, OpmMeasurement, OpmStatus};

use crate::error::{ParseError, RowDecodeError};
use crate::text::sniff_delimiter;

// ---------------------------------------------------------------------------
// Header aliases
// ---------------------------------------------------------------------------

/// Canonical field → accepted header spellings, in preference order.
pub type AliasTable = &'static [(&'static str, &'static [&'static str])];

pub const OPM_ALIASES: AliasTable = &[
    ("cable_id", &["Cable ID", "CableID", "Cable_ID", "cable_id"]),
    ("segment", &["Segment", "Segment Name", "segment"]),
    ("date", &["Date", "Measurement Date", "date"]),
    ("tx_power", &["Tx Power (dBm)", "Tx Power", "tx_power"]),
    ("rx_power", &["Rx Power (dBm)", "Rx Power", "rx_power"]),
    ("loss", &["Loss (dB)", "Loss", "loss"]),
    ("length", &["Length (km)", "Length", "length"]),
    ("wavelength", &["Wavelength (nm)", "Wavelength", "wavelength"]),
    ("status", &["Status", "Test Status", "status"]),
    ("remarks", &["Remarks", "Notes", "remarks"]),
    ("measured_by", &["Measured By", "Technician", "measured_by"]),
];

pub const ATP_ALIASES: AliasTable = &[
    ("odp_id", &["ODP ID", "ODP_ID", "odp_id"]),
    ("test_date", &["Test Date", "Date", "test_date"]),
    ("optical_loss", &["Optical Loss (dB)", "Loss", "optical_loss"]),
    ("reflectance", &["Reflectance (dB)", "Reflectance", "reflectance"]),
    ("test_result", &["Test Result", "Result", "test_result"]),
    ("fiber_core", &["Fiber Core", "Core", "fiber_core"]),
    ("remarks", &["Remarks", "Notes", "remarks"]),
];

/// Header positions per canonical field, resolved once per table.
#[derive(Debug)]
pub struct ColumnMap {
    columns: HashMap<&'static str, Vec<usize>>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String], aliases: AliasTable) -> Self {
        let columns = aliases
            .iter()
            .map(|(field, spellings)| {
                let positions = spellings
                    .iter()
                    .filter_map(|s| headers.iter().position(|h| h == s))
                    .collect();
                (*field, positions)
            })
            .collect();
        Self { columns }
    }

    /// First non-empty value for `field` in this record.
    pub fn get<'r>(&self, record: &'r csv::StringRecord, field: &str) -> Option<&'r str> {
        self.columns
            .get(field)?
            .iter()
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    pub fn has(&self, field: &str) -> bool {
        self.columns.get(field).is_some_and(|c| !c.is_empty())
    }

    fn text(&self, record: &csv::StringRecord, field: &str) -> Option<String> {
        self.get(record, field).map(str::to_string)
    }

    fn number<T: FromStr>(
        &self,
        record: &csv::StringRecord,
        field: &'static str,
        default: T,
        row: usize,
    ) -> Result<T, RowDecodeError> {
        match self.get(record, field) {
            None => Ok(default),
            Some(v) => v.parse().map_err(|_| RowDecodeError {
                row,
                field,
                value: v.to_string(),
            }),
        }
    }

    /// Like `number`, but `NaN` and infinities are decode errors.
    fn float(
        &self,
        record: &csv::StringRecord,
        field: &'static str,
        default: f64,
        row: usize,
    ) -> Result<f64, RowDecodeError> {
        match self.get(record, field) {
            None => Ok(default),
            Some(v) => finite(v).ok_or_else(|| RowDecodeError {
                row,
                field,
                value: v.to_string(),
            }),
        }
    }
}

fn finite(v: &str) -> Option<f64> {
    v.parse::<f64>().ok().filter(|x| x.is_finite())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Parsed OPM rows in input order, plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct OpmTable {
    pub measurements: Vec<OpmMeasurement>,
    pub skipped: Vec<RowDecodeError>,
}

#[derive(Debug, Clone, Default)]
pub struct AtpTable {
    pub measurements: Vec<AtpMeasurement>,
    pub skipped: Vec<RowDecodeError>,
}

pub fn parse_opm(table: &str) -> Result<OpmTable, ParseError> {
    let mut out = OpmTable::default();
    for_each_row(table, OPM_ALIASES, |cols, record, row| {
        match decode_opm(cols, record, row) {
            Ok(m) => out.measurements.push(m),
            Err(e) => skip(&mut out.skipped, e),
        }
    })?;
    log::info!(
        "parsed {} OPM measurements ({} rows skipped)",
        out.measurements.len(),
        out.skipped.len()
    );
    Ok(out)
}

pub fn parse_atp(table: &str) -> Result<AtpTable, ParseError> {
    let mut out = AtpTable::default();
    for_each_row(table, ATP_ALIASES, |cols, record, row| {
        match decode_atp(cols, record, row) {
            Ok(m) => out.measurements.push(m),
            Err(e) => skip(&mut out.skipped, e),
        }
    })?;
    log::info!(
        "parsed {} ATP measurements ({} rows skipped)",
        out.measurements.len(),
        out.skipped.len()
    );
    Ok(out)
}

fn skip(skipped: &mut Vec<RowDecodeError>, e: RowDecodeError) {
    log::warn!("skipping measurement {e}");
    skipped.push(e);
}

/// Drive `visit` over every data row with a column map resolved from the header.
fn for_each_row<F>(table: &str, aliases: AliasTable, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(&ColumnMap, &csv::StringRecord, usize),
{
    let table = table.strip_prefix('\u{feff}').unwrap_or(table);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(table))
        .has_headers(true)
        .flexible(true)
        .from_reader(table.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::Table(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let cols = ColumnMap::resolve(&headers, aliases);

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        match result {
            Ok(record) => visit(&cols, &record, row),
            Err(e) => log::warn!("skipping unreadable row {row}: {e}"),
        }
    }
    Ok(())
}

fn decode_opm(
    cols: &ColumnMap,
    record: &csv::StringRecord,
    row: usize,
) -> Result<OpmMeasurement, RowDecodeError> {
    Ok(OpmMeasurement {
        cable_id: cols.text(record, "cable_id").unwrap_or_default(),
        segment_name: cols.text(record, "segment").unwrap_or_default(),
        date: cols.text(record, "date"),
        tx_power_dbm: cols.float(record, "tx_power", 0.0, row)?,
        rx_power_dbm: cols.float(record, "rx_power", 0.0, row)?,
        loss_db: cols.float(record, "loss", 0.0, row)?,
        length_km: cols.float(record, "length", 0.0, row)?,
        wavelength_nm: cols.number(record, "wavelength", 1550u32, row)?,
        status: cols.get(record, "status").map(OpmStatus::parse).unwrap_or(OpmStatus::Unknown),
        remarks: cols.text(record, "remarks"),
        measured_by: cols.text(record, "measured_by"),
    })
}

fn decode_atp(
    cols: &ColumnMap,
    record: &csv::StringRecord,
    row: usize,
) -> Result<AtpMeasurement, RowDecodeError> {
    let fiber_core: u32 = cols.number(record, "fiber_core", 1, row)?;
    if fiber_core == 0 {
        return Err(RowDecodeError { row, field: "fiber_core", value: "0".into() });
    }

    Ok(AtpMeasurement {
        odp_id: cols.text(record, "odp_id").unwrap_or_default(),
        test_date: cols.text(record, "test_date"),
        optical_loss_db: cols.float(record, "optical_loss", 0.0, row)?,
        reflectance_db: cols.get(record, "reflectance").and_then(finite),
        test_result: cols
            .get(record, "test_result")
            .map(AtpResult::parse)
            .unwrap_or(AtpResult::Unknown),
        fiber_core,
        remarks: cols.text(record, "remarks"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opm_canonical_headers() {
        let csv = "\
Cable ID,Segment,Date,Tx Power (dBm),Rx Power (dBm),Loss (dB),Length (km),Wavelength (nm),Status,Remarks,Measured By
FO-01,OLT-ODC,2024-03-01,3.0,-4.2,7.2,10.5,1310,Pass,ok,Budi
FO-02,ODC-ODP,2024-03-02,3.0,-20.0,23.0,40,1550,FAIL,,Sari
";
        let out = parse_opm(csv).unwrap();
        assert!(out.skipped.is_empty());
        assert_eq!(out.measurements.len(), 2);

        let m = &out.measurements[0];
        assert_eq!(m.cable_id, "FO-01");
        assert_eq!(m.segment_name, "OLT-ODC");
        assert_eq!(m.date.as_deref(), Some("2024-03-01"));
        assert_eq!(m.loss_db, 7.2);
        assert_eq!(m.length_km, 10.5);
        assert_eq!(m.wavelength_nm, 1310);
        assert_eq!(m.status, OpmStatus::Pass);
        assert_eq!(m.measured_by.as_deref(), Some("Budi"));

        assert_eq!(out.measurements[1].status, OpmStatus::Fail);
        assert_eq!(out.measurements[1].remarks, None);
    }

    #[test]
    fn opm_alias_headers_and_defaults() {
        let csv = "\
CableID;Loss;Technician
FO-07;4,5;Andi
";
        // Semicolon export; "4,5" is a single field and not a valid number.
        let out = parse_opm(csv).unwrap();
        assert_eq!(out.measurements.len(), 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].field, "loss");
        assert_eq!(out.skipped[0].value, "4,5");

        let csv = "CableID;Loss;Technician\nFO-07;4.5;Andi\n";
        let out = parse_opm(csv).unwrap();
        let m = &out.measurements[0];
        assert_eq!(m.cable_id, "FO-07");
        assert_eq!(m.loss_db, 4.5);
        assert_eq!(m.wavelength_nm, 1550);
        assert_eq!(m.status, OpmStatus::Unknown);
        assert_eq!(m.tx_power_dbm, 0.0);
        assert_eq!(m.measured_by.as_deref(), Some("Andi"));
    }

    #[test]
    fn first_non_empty_alias_wins() {
        let csv = "\
Loss (dB),Loss,cable_id
,6.1,FO-1
5.0,6.1,FO-2
";
        let out = parse_opm(csv).unwrap();
        assert_eq!(out.measurements[0].loss_db, 6.1);
        assert_eq!(out.measurements[1].loss_db, 5.0);
    }

    #[test]
    fn bad_rows_are_skipped_in_order() {
        let csv = "\
Cable ID,Loss,Wavelength
A,1.0,1550
B,abc,1550
C,2.0,1550nm
D,3.0,1310
";
        let out = parse_opm(csv).unwrap();
        let ids: Vec<_> = out.measurements.iter().map(|m| m.cable_id.as_str()).collect();
        assert_eq!(ids, ["A", "D"]);
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(out.skipped[0].row, 2);
        assert_eq!(out.skipped[1].row, 3);
        assert_eq!(out.skipped[1].field, "wavelength");
    }

    #[test]
    fn non_finite_readings_are_skipped() {
        let csv = "Cable ID,Loss (dB),Length (km)\nC1,NaN,2.0\nC2,1.0,inf\nC3,1.0,2.0\n";
        let out = parse_opm(csv).unwrap();
        assert_eq!(out.measurements.len(), 1);
        assert_eq!(out.measurements[0].cable_id, "C3");

        assert_eq!(out.skipped.len(), 2);
        assert_eq!((out.skipped[0].row, out.skipped[0].field), (1, "loss"));
        assert_eq!(out.skipped[0].value, "NaN");
        assert_eq!((out.skipped[1].row, out.skipped[1].field), (2, "length"));
        assert_eq!(out.skipped[1].value, "inf");
    }

    #[test]
    fn atp_non_finite_loss_skips_and_reflectance_drops() {
        let csv = "ODP ID,Optical Loss (dB),Reflectance (dB)\nODP-1,infinity,-40\nODP-2,0.5,-inf\n";
        let out = parse_atp(csv).unwrap();
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].field, "optical_loss");
        assert_eq!(out.measurements.len(), 1);
        assert_eq!(out.measurements[0].odp_id, "ODP-2");
        assert_eq!(out.measurements[0].reflectance_db, None);
    }

    #[test]
    fn bom_and_padded_headers() {
        let csv = "\u{feff} Cable ID , Loss (dB)\nFO-9, 3.25 \n";
        let out = parse_opm(csv).unwrap();
        assert_eq!(out.measurements[0].cable_id, "FO-9");
        assert_eq!(out.measurements[0].loss_db, 3.25);
    }

    #[test]
    fn atp_rows() {
        let csv = "\
ODP ID,Test Date,Optical Loss (dB),Reflectance (dB),Test Result,Fiber Core,Remarks
ODP-01,2024-04-01,0.8,-45.2,Pass,1,
ODP-01,2024-04-01,1.9,n/a,fail,2,dirty connector
ODP-02,2024-04-02,0.7,,Pass,0,
ODP-03,2024-04-02,0.6,,,,
";
        let out = parse_atp(csv).unwrap();
        assert_eq!(out.measurements.len(), 3);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].field, "fiber_core");

        let a = &out.measurements[0];
        assert_eq!(a.reflectance_db, Some(-45.2));
        assert_eq!(a.test_result, AtpResult::Pass);

        let b = &out.measurements[1];
        assert_eq!(b.reflectance_db, None);
        assert_eq!(b.test_result, AtpResult::Fail);
        assert_eq!(b.fiber_core, 2);
        assert_eq!(b.remarks.as_deref(), Some("dirty connector"));

        let c = &out.measurements[2];
        assert_eq!(c.odp_id, "ODP-03");
        assert_eq!(c.fiber_core, 1);
        assert_eq!(c.test_result, AtpResult::Unknown);
    }

    #[test]
    fn column_map_resolution() {
        let headers: Vec<String> = ["Notes", "Cable_ID"].iter().map(|s| s.to_string()).collect();
        let cols = ColumnMap::resolve(&headers, OPM_ALIASES);
        assert!(cols.has("cable_id"));
        assert!(cols.has("remarks"));
        assert!(!cols.has("loss"));
        assert!(!cols.has("no_such_field"));
    }

    #[test]
    fn header_only_table_is_empty() {
        let out = parse_opm("Cable ID,Loss\n").unwrap();
        assert!(out.measurements.is_empty());
        assert!(out.skipped.is_empty());
    }
}
