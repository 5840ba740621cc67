//! `fnet network` — inventory, statistics and per-cable budgets for one document.

use std::path::PathBuf;

use fibernet_config::Settings;
use fibernet_core::{NetworkSnapshot, NetworkStatistics};
use fibernet_engine::{analyze_network, LinkStatus, NetworkBudgetReport};
use serde::Serialize;

use crate::budget::ParamArgs;
use crate::util::{fmt_num, generated_at, print_json, read_text};
use crate::CliError;

#[derive(Serialize)]
struct NetworkReport {
    generated_at: String,
    source: String,
    statistics: NetworkStatistics,
    network: NetworkSnapshot,
    budget: NetworkBudgetReport,
}

pub fn cmd_network(file: PathBuf, params: &ParamArgs, json: bool, settings: &Settings) -> Result<(), CliError> {
    let text = read_text(&file)?;
    let network = fibernet_io::parse_kml(&text)
        .map_err(|e| CliError::parse(format!("{}: {e}", file.display())))?;

    let (optical, loss) = params.resolve(settings.optical(), settings.ingest_loss())?;
    let budget = analyze_network(&network, &optical, &loss, &settings.estimator());

    let report = NetworkReport {
        generated_at: generated_at(),
        source: file.display().to_string(),
        statistics: network.statistics(),
        network,
        budget,
    };

    if json {
        return print_json(&report);
    }

    let s = &report.statistics;
    println!("Network: {}", report.source);
    println!(
        "  {} poles ({} in service, {} planned), {} distribution points, {} cables",
        s.total_poles, s.poles_in_service, s.poles_planned, s.total_distribution_points, s.total_cables
    );
    println!("  total cable length {} km", fmt_num(s.total_cable_length_km, 2));
    if s.unclassified_placemarks > 0 {
        println!("  {} of {} placemarks unclassified", s.unclassified_placemarks, s.raw_placemarks);
    }

    let b = &report.budget;
    if b.results.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:<20} {:>9} {:>7} {:>10} {:>10} {:>8}  Status",
        "Cable", "Length km", "Splices", "Loss dB", "Margin dB", "Quality"
    );
    for c in &b.results {
        println!(
            "{:<20} {:>9} {:>7} {:>10} {:>10} {:>8}  {}",
            c.cable_name,
            fmt_num(c.segment.fiber_length_km, 2),
            c.segment.splice_count,
            fmt_num(c.result.total_loss, 2),
            fmt_num(c.result.available_margin, 2),
            fmt_num(c.result.quality_score, 1),
            c.result.status,
        );
    }

    let count = |status: LinkStatus| b.results.iter().filter(|c| c.result.status == status).count();
    println!();
    println!(
        "{} cable(s): {} OK, {} warning, {} critical; average quality {}, total loss {} dB",
        b.total_segments,
        count(LinkStatus::Ok),
        count(LinkStatus::Warning),
        count(LinkStatus::Critical),
        fmt_num(b.average_quality_score, 1),
        fmt_num(b.total_network_loss_db, 2)
    );
    Ok(())
}
