//! `fnet measurements` — OPM and ATP table summaries.

use std::path::PathBuf;

use clap::ValueEnum;
use fibernet_core::{AtpMeasurement, AtpSummary, MeasurementSummary, OpmMeasurement};
use fibernet_io::RowDecodeError;
use serde::Serialize;

use crate::util::{fmt_num, generated_at, print_json, read_text};
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Optical power meter readings per cable
    Opm,
    /// Acceptance-test results per distribution point core
    Atp,
}

#[derive(Serialize)]
struct OpmReport {
    generated_at: String,
    source: String,
    kind: MeasurementKind,
    summary: MeasurementSummary,
    measurements: Vec<OpmMeasurement>,
    skipped: Vec<RowDecodeError>,
}

#[derive(Serialize)]
struct AtpReport {
    generated_at: String,
    source: String,
    kind: MeasurementKind,
    summary: AtpSummary,
    measurements: Vec<AtpMeasurement>,
    skipped: Vec<RowDecodeError>,
}

pub fn cmd_measurements(file: PathBuf, kind: MeasurementKind, json: bool) -> Result<(), CliError> {
    let text = read_text(&file)?;
    let table_err = |e: fibernet_io::ParseError| CliError::parse(format!("{}: {e}", file.display()));

    match kind {
        MeasurementKind::Opm => {
            let table = fibernet_io::parse_opm(&text).map_err(table_err)?;
            let report = OpmReport {
                generated_at: generated_at(),
                source: file.display().to_string(),
                kind,
                summary: MeasurementSummary::from_opm(&table.measurements),
                measurements: table.measurements,
                skipped: table.skipped,
            };
            if json {
                return print_json(&report);
            }

            let s = &report.summary;
            println!("OPM measurements: {}", report.source);
            println!(
                "  {} readings: {} pass, {} warning, {} fail ({}% pass)",
                s.total_measurements,
                s.passed,
                s.warning,
                s.failed,
                fmt_num(s.pass_rate, 1)
            );
            println!(
                "  average loss {} dB, average length {} km, total length {} km",
                fmt_num(s.average_loss_db, 2),
                fmt_num(s.average_length_km, 2),
                fmt_num(s.total_length_km, 2)
            );
            print_skipped(&report.skipped);
        }
        MeasurementKind::Atp => {
            let table = fibernet_io::parse_atp(&text).map_err(table_err)?;
            let report = AtpReport {
                generated_at: generated_at(),
                source: file.display().to_string(),
                kind,
                summary: AtpSummary::from_atp(&table.measurements),
                measurements: table.measurements,
                skipped: table.skipped,
            };
            if json {
                return print_json(&report);
            }

            let s = &report.summary;
            println!("ATP results: {}", report.source);
            println!(
                "  {} tests: {} pass, {} fail ({}% pass), average loss {} dB",
                s.total_tests,
                s.passed,
                s.failed,
                fmt_num(s.pass_rate, 1),
                fmt_num(s.average_loss_db, 2)
            );
            print_skipped(&report.skipped);
        }
    }
    Ok(())
}

fn print_skipped(skipped: &[RowDecodeError]) {
    if skipped.is_empty() {
        return;
    }
    println!("  {} row(s) skipped:", skipped.len());
    for e in skipped {
        println!("    {e}");
    }
}
