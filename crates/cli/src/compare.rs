//! `fnet compare` — as-planned vs as-built reconciliation.

use std::path::{Path, PathBuf};

use fibernet_config::Settings;
use fibernet_core::{NetworkSnapshot, OpmMeasurement};
use fibernet_recon::{NetworkComparison, ReconError, ToleranceConfig};
use serde::Serialize;

use crate::util::{fmt_num, generated_at, print_json, read_text, to_json, write_output};
use crate::CliError;

#[derive(Serialize)]
struct CompareReport {
    generated_at: String,
    planned_source: String,
    built_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    opm_source: Option<String>,
    /// OPM rows that could not be decoded and were left out of the comparison.
    skipped_measurements: usize,
    #[serde(flatten)]
    comparison: NetworkComparison,
}

pub fn cmd_compare(
    planned_path: PathBuf,
    built_path: PathBuf,
    opm_path: Option<PathBuf>,
    tolerance_path: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    if let Some(out) = &output {
        let inputs = [Some(&planned_path), Some(&built_path), opm_path.as_ref(), tolerance_path.as_ref()];
        if inputs.into_iter().flatten().any(|input| input == out) {
            return Err(CliError::args(format!("--output {} would overwrite an input file", out.display())));
        }
    }

    let tolerance = load_tolerance(tolerance_path.as_deref(), settings)?;
    log::debug!(
        "tolerance: length {}%, major {}%, loss {} dB",
        tolerance.length_pct,
        tolerance.major_pct,
        tolerance.loss_db
    );
    let planned = load_document(&planned_path)?;
    let built = load_document(&built_path)?;

    let (measurements, skipped_measurements) = match &opm_path {
        Some(path) => {
            let (m, skipped) = load_opm(path)?;
            (Some(m), skipped)
        }
        None => (None, 0),
    };

    // Planned cables carry the attenuation the design implies, so measured
    // readings have something to be checked against.
    let estimator = settings.estimator();
    let loss = settings.ingest_loss();
    let comparison = fibernet_recon::compare_snapshots(
        &planned,
        &built,
        measurements.as_deref(),
        &tolerance,
        |cable| Some(estimator.estimated_loss_db(cable, &loss)),
    );

    let report = CompareReport {
        generated_at: generated_at(),
        planned_source: planned_path.display().to_string(),
        built_source: built_path.display().to_string(),
        opm_source: opm_path.as_ref().map(|p| p.display().to_string()),
        skipped_measurements,
        comparison,
    };

    if let Some(path) = &output {
        write_output(path, &to_json(&report)?)?;
    }

    if json {
        return print_json(&report);
    }

    print_summary(&report);
    Ok(())
}

fn load_tolerance(path: Option<&Path>, settings: &Settings) -> Result<ToleranceConfig, CliError> {
    let recon_err = |e: ReconError| match e {
        ReconError::ConfigParse(_) => CliError::parse(e.to_string()),
        ReconError::ConfigValidation(_) => CliError::invalid(e.to_string()),
    };

    match path {
        Some(path) => {
            let text = read_text(path)?;
            ToleranceConfig::from_toml(&text).map_err(|e| {
                recon_err(e).with_hint(format!("check the [tolerance] table in {}", path.display()))
            })
        }
        None => {
            let tolerance = settings.tolerance();
            tolerance.validate().map_err(|e| {
                recon_err(e).with_hint("check compare.* in the settings file (`fnet config --path`)")
            })?;
            Ok(tolerance)
        }
    }
}

fn load_document(path: &Path) -> Result<NetworkSnapshot, CliError> {
    let text = read_text(path)?;
    fibernet_io::parse_kml(&text).map_err(|e| CliError::parse(format!("{}: {e}", path.display())))
}

fn load_opm(path: &Path) -> Result<(Vec<OpmMeasurement>, usize), CliError> {
    let text = read_text(path)?;
    let table =
        fibernet_io::parse_opm(&text).map_err(|e| CliError::parse(format!("{}: {e}", path.display())))?;
    Ok((table.measurements, table.skipped.len()))
}

fn print_summary(report: &CompareReport) {
    let c = &report.comparison;
    let s = &c.summary;

    println!("Plan: {}", report.planned_source);
    println!("Built: {}", report.built_source);
    println!();
    println!(
        "{} cable(s): {} compliant, {} minor, {} major ({}% compliant)",
        s.total_cables,
        s.compliant,
        s.minor_deviations,
        s.major_deviations,
        fmt_num(s.compliance_rate, 1)
    );
    println!(
        "Length: planned {} km, built {} km ({:+.2} km, {}%)",
        fmt_num(s.total_planned_length_km, 2),
        fmt_num(s.total_built_length_km, 2),
        s.overall_length_variance_km,
        fmt_num(s.overall_length_variance_pct, 1)
    );
    if s.not_built > 0 || s.unplanned > 0 {
        println!("Not built: {}, unplanned: {}", s.not_built, s.unplanned);
    }

    if !c.discrepancies.is_empty() {
        println!();
        println!("Discrepancies:");
        for d in &c.discrepancies {
            println!(
                "  [{}] {:<16} {:>8}%  {}",
                d.severity,
                d.cable_id,
                fmt_num(d.length_variance_pct, 1),
                d.remarks.join("; ")
            );
        }
    }

    println!();
    println!("Recommendations:");
    for line in &c.recommendations {
        println!("  - {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_INVALID_PARAMS, EXIT_PARSE};

    #[test]
    fn tolerance_file_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tight.toml");
        std::fs::write(&path, "[tolerance]\nlength_pct = 2.0\nmajor_pct = 4.0\n").unwrap();

        let t = load_tolerance(Some(&path), &Settings::default()).unwrap();
        assert_eq!(t.length_pct, 2.0);
        assert_eq!(t.major_pct, 4.0);
        assert_eq!(t.loss_db, 0.5);
    }

    #[test]
    fn tolerance_errors_map_to_exit_codes() {
        let dir = tempfile::tempdir().unwrap();

        let malformed = dir.path().join("malformed.toml");
        std::fs::write(&malformed, "[tolerance\n").unwrap();
        assert_eq!(load_tolerance(Some(&malformed), &Settings::default()).unwrap_err().code, EXIT_PARSE);

        let inverted = dir.path().join("inverted.toml");
        std::fs::write(&inverted, "[tolerance]\nlength_pct = 12.0\nmajor_pct = 4.0\n").unwrap();
        assert_eq!(
            load_tolerance(Some(&inverted), &Settings::default()).unwrap_err().code,
            EXIT_INVALID_PARAMS
        );

        let settings = Settings { loss_tolerance_db: -1.0, ..Settings::default() };
        assert_eq!(load_tolerance(None, &settings).unwrap_err().code, EXIT_INVALID_PARAMS);
    }
}
