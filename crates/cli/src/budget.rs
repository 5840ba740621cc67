//! `fnet budget` — single-segment and batch link-budget calculations.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use fibernet_config::Settings;
use fibernet_engine::{
    compute, max_distance, recommend, required_tx_power, CalculationResult, FiberType, LinkStatus,
    LossParameters, NetworkSegment, OpticalParameters, Wavelength,
};
use serde::{Deserialize, Serialize};

use crate::util::{fmt_num, print_json, read_text};
use crate::CliError;

/// Per-invocation overrides of the optical and loss settings.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Transmit power in dBm, -10..10
    #[arg(long = "tx", allow_negative_numbers = true)]
    pub tx_power: Option<f64>,

    /// Receiver sensitivity in dBm, -40..-10
    #[arg(long = "rx", allow_negative_numbers = true)]
    pub rx_sensitivity: Option<f64>,

    /// 1310nm or 1550nm; also selects the standard fiber loss unless --fiber-loss is given
    #[arg(long)]
    pub wavelength: Option<Wavelength>,

    /// single_mode or multi_mode
    #[arg(long)]
    pub fiber_type: Option<FiberType>,

    /// Fiber attenuation, dB/km
    #[arg(long, allow_negative_numbers = true)]
    pub fiber_loss: Option<f64>,

    /// Loss per splice, dB
    #[arg(long, allow_negative_numbers = true)]
    pub splice_loss: Option<f64>,

    /// Loss per connector, dB
    #[arg(long, allow_negative_numbers = true)]
    pub connector_loss: Option<f64>,

    /// Margin reserved for aging and repairs, dB
    #[arg(long, allow_negative_numbers = true)]
    pub safety_margin: Option<f64>,
}

impl ParamArgs {
    /// Apply the overrides on top of `optical` / `loss` and validate the result.
    pub fn resolve(
        &self,
        optical: OpticalParameters,
        loss: LossParameters,
    ) -> Result<(OpticalParameters, LossParameters), CliError> {
        let optical = OpticalParameters {
            tx_power: self.tx_power.unwrap_or(optical.tx_power),
            rx_sensitivity: self.rx_sensitivity.unwrap_or(optical.rx_sensitivity),
            wavelength: self.wavelength.unwrap_or(optical.wavelength),
            fiber_type: self.fiber_type.unwrap_or(optical.fiber_type),
        };

        let fiber_loss_per_km = match (self.fiber_loss, self.wavelength) {
            (Some(v), _) => v,
            (None, Some(w)) => w.standard_fiber_loss(),
            (None, None) => loss.fiber_loss_per_km,
        };
        let loss = LossParameters {
            fiber_loss_per_km,
            splice_loss: self.splice_loss.unwrap_or(loss.splice_loss),
            connector_loss: self.connector_loss.unwrap_or(loss.connector_loss),
            safety_margin: self.safety_margin.unwrap_or(loss.safety_margin),
        };

        optical.validate().map_err(invalid)?;
        loss.validate().map_err(invalid)?;
        Ok((optical, loss))
    }
}

fn invalid(e: fibernet_engine::BudgetError) -> CliError {
    CliError::invalid(e.to_string()).with_hint("see `fnet budget calc --help` for accepted ranges")
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Link budget for one segment
    #[command(after_help = "\
Examples:
  fnet budget calc --length-km 10 --splices 5 --connectors 2
  fnet budget calc --length-km 25 --tx 5 --rx=-30 --wavelength 1310nm --json")]
    Calc {
        /// Fiber length in km
        #[arg(long)]
        length_km: f64,

        /// Number of fusion splices
        #[arg(long, default_value_t = 0)]
        splices: u32,

        /// Number of mated connector pairs
        #[arg(long, default_value_t = 2)]
        connectors: u32,

        /// Label carried into the result
        #[arg(long, default_value = "segment")]
        name: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Link budget for every segment in a CSV (name,length_km,splices,connectors)
    #[command(after_help = "\
Examples:
  fnet budget segments feeders.csv
  fnet budget segments feeders.csv --wavelength 1310nm --json")]
    Segments {
        /// CSV with a header row: name,length_km,splices,connectors
        file: PathBuf,

        #[command(flatten)]
        params: ParamArgs,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Longest fiber run the budget supports
    #[command(after_help = "\
Examples:
  fnet budget max-distance --splices 10 --connectors 2
  fnet budget max-distance --tx 0 --rx=-25 --json")]
    MaxDistance {
        /// Number of fusion splices
        #[arg(long, default_value_t = 0)]
        splices: u32,

        /// Number of mated connector pairs
        #[arg(long, default_value_t = 2)]
        connectors: u32,

        #[command(flatten)]
        params: ParamArgs,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Transmit power that leaves exactly the safety margin
    #[command(after_help = "\
Examples:
  fnet budget required-tx --length-km 40 --splices 20
  fnet budget required-tx --length-km 40 --rx=-30 --json")]
    RequiredTx {
        /// Fiber length in km
        #[arg(long)]
        length_km: f64,

        /// Number of fusion splices
        #[arg(long, default_value_t = 0)]
        splices: u32,

        /// Number of mated connector pairs
        #[arg(long, default_value_t = 2)]
        connectors: u32,

        #[command(flatten)]
        params: ParamArgs,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_budget(cmd: BudgetCommands, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        BudgetCommands::Calc { length_km, splices, connectors, name, params, json } => {
            let segment = NetworkSegment::new(name, length_km, splices, connectors);
            cmd_calc(segment, &params, json, settings)
        }
        BudgetCommands::Segments { file, params, json } => cmd_segments(file, &params, json, settings),
        BudgetCommands::MaxDistance { splices, connectors, params, json } => {
            cmd_max_distance(splices, connectors, &params, json, settings)
        }
        BudgetCommands::RequiredTx { length_km, splices, connectors, params, json } => {
            let segment = NetworkSegment::new("segment", length_km, splices, connectors);
            cmd_required_tx(segment, &params, json, settings)
        }
    }
}

// ============================================================================
// calc / segments
// ============================================================================

#[derive(Serialize)]
struct SegmentReport {
    result: CalculationResult,
    recommendations: Vec<String>,
}

impl SegmentReport {
    fn new(result: CalculationResult) -> Self {
        let recommendations = recommend(&result);
        Self { result, recommendations }
    }
}

#[derive(Serialize)]
struct BatchReport {
    optical: OpticalParameters,
    loss: LossParameters,
    segments: Vec<SegmentReport>,
    total_segments: usize,
    ok_count: usize,
    warning_count: usize,
    critical_count: usize,
    /// 0 when the file has no segments.
    average_quality_score: f64,
    total_loss_db: f64,
}

#[derive(Deserialize)]
struct SegmentRow {
    name: String,
    length_km: f64,
    splices: Option<u32>,
    connectors: Option<u32>,
}

fn validate_segment(segment: &NetworkSegment) -> Result<(), CliError> {
    segment
        .validate()
        .map_err(|e| CliError::invalid(format!("segment '{}': {e}", segment.name)))
}

fn cmd_calc(segment: NetworkSegment, params: &ParamArgs, json: bool, settings: &Settings) -> Result<(), CliError> {
    let (optical, loss) = params.resolve(settings.optical(), settings.loss())?;
    validate_segment(&segment)?;

    let report = SegmentReport::new(compute(&optical, &loss, &segment));
    if json {
        return print_json(&report);
    }

    print_segment(&report);
    Ok(())
}

fn cmd_segments(file: PathBuf, params: &ParamArgs, json: bool, settings: &Settings) -> Result<(), CliError> {
    let (optical, loss) = params.resolve(settings.optical(), settings.loss())?;
    let segments = read_segments(&file)?;

    let reports: Vec<SegmentReport> = segments
        .iter()
        .map(|s| SegmentReport::new(compute(&optical, &loss, s)))
        .collect();

    let total_segments = reports.len();
    let average_quality_score = if total_segments == 0 {
        0.0
    } else {
        reports.iter().map(|r| r.result.quality_score).sum::<f64>() / total_segments as f64
    };
    let total_loss_db = reports.iter().map(|r| r.result.total_loss).sum();
    let count = |status: LinkStatus| reports.iter().filter(|r| r.result.status == status).count();

    let batch = BatchReport {
        optical,
        loss,
        total_segments,
        ok_count: count(LinkStatus::Ok),
        warning_count: count(LinkStatus::Warning),
        critical_count: count(LinkStatus::Critical),
        average_quality_score,
        total_loss_db,
        segments: reports,
    };

    if json {
        return print_json(&batch);
    }

    println!(
        "{:<20} {:>9} {:>7} {:>10} {:>10} {:>8}  Status",
        "Segment", "Length km", "Splices", "Loss dB", "Margin dB", "Quality"
    );
    for r in &batch.segments {
        let d = &r.result.details;
        println!(
            "{:<20} {:>9} {:>7} {:>10} {:>10} {:>8}  {}",
            d.segment_name,
            fmt_num(d.fiber_length_km, 2),
            d.splice_count,
            fmt_num(r.result.total_loss, 2),
            fmt_num(r.result.available_margin, 2),
            fmt_num(r.result.quality_score, 1),
            r.result.status,
        );
    }
    println!();
    println!(
        "{} segment(s): {} OK, {} warning, {} critical; average quality {}, total loss {} dB",
        batch.total_segments,
        batch.ok_count,
        batch.warning_count,
        batch.critical_count,
        fmt_num(batch.average_quality_score, 1),
        fmt_num(batch.total_loss_db, 2)
    );
    Ok(())
}

fn read_segments(file: &std::path::Path) -> Result<Vec<NetworkSegment>, CliError> {
    let text = read_text(file)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut segments = Vec::new();
    for (i, row) in reader.deserialize::<SegmentRow>().enumerate() {
        // Header is line 1.
        let row = row.map_err(|e| CliError::parse(format!("{} line {}: {e}", file.display(), i + 2)))?;
        let segment = NetworkSegment::new(
            row.name,
            row.length_km,
            row.splices.unwrap_or(0),
            row.connectors.unwrap_or(0),
        );
        validate_segment(&segment)?;
        segments.push(segment);
    }
    Ok(segments)
}

fn print_segment(report: &SegmentReport) {
    let r = &report.result;
    let d = &r.details;
    let b = &d.loss_breakdown;

    println!("Segment:          {}", d.segment_name);
    println!(
        "Optical:          tx {} dBm, rx {} dBm, {} {}",
        fmt_num(d.tx_power_dbm, 1),
        fmt_num(d.rx_sensitivity_dbm, 1),
        d.wavelength,
        d.fiber_type
    );
    println!("Power budget:     {} dB", fmt_num(r.power_budget, 2));
    println!(
        "Loss:             {} dB (fiber {} + splices {} + connectors {})",
        fmt_num(r.total_loss, 2),
        fmt_num(b.fiber_loss_db, 2),
        fmt_num(b.splice_loss_db, 2),
        fmt_num(b.connector_loss_db, 2)
    );
    println!(
        "Margin:           {} dB after {} dB safety margin",
        fmt_num(r.available_margin, 2),
        fmt_num(d.safety_margin_db, 1)
    );
    println!(
        "Expected rx:      {} dBm ({} mW)",
        fmt_num(d.expected_rx_power_dbm, 2),
        fmt_num(d.expected_rx_power_mw, 4)
    );
    println!("Status:           {}", r.status);
    println!("Quality score:    {}", fmt_num(r.quality_score, 1));
    println!();
    for line in &report.recommendations {
        println!("  - {line}");
    }
}

// ============================================================================
// max-distance / required-tx
// ============================================================================

#[derive(Serialize)]
struct MaxDistanceReport {
    /// `null` when the fiber is lossless and headroom remains.
    max_distance_km: f64,
    max_distance_m: f64,
    splice_count: u32,
    connector_count: u32,
    power_budget: f64,
    fiber_loss_per_km: f64,
}

fn cmd_max_distance(
    splices: u32,
    connectors: u32,
    params: &ParamArgs,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let (optical, loss) = params.resolve(settings.optical(), settings.loss())?;
    let km = max_distance(&optical, &loss, splices, connectors);
    let report = MaxDistanceReport {
        max_distance_km: km,
        max_distance_m: km * 1000.0,
        splice_count: splices,
        connector_count: connectors,
        power_budget: optical.power_budget(),
        fiber_loss_per_km: loss.fiber_loss_per_km,
    };

    if json {
        return print_json(&report);
    }

    let distance = if report.max_distance_km.is_infinite() {
        "unbounded".to_string()
    } else {
        format!("{} km", fmt_num(report.max_distance_km, 2))
    };
    println!(
        "Max distance: {distance} ({} splices, {} connectors, {} dB budget, {} dB/km)",
        splices,
        connectors,
        fmt_num(report.power_budget, 2),
        fmt_num(report.fiber_loss_per_km, 3)
    );
    Ok(())
}

#[derive(Serialize)]
struct RequiredTxReport {
    required_tx_power_dbm: f64,
    rx_sensitivity_dbm: f64,
    fiber_length_km: f64,
    splice_count: u32,
    connector_count: u32,
    safety_margin_db: f64,
    /// Whether the answer is inside the transmitter range.
    achievable: bool,
}

fn cmd_required_tx(
    segment: NetworkSegment,
    params: &ParamArgs,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let (optical, loss) = params.resolve(settings.optical(), settings.loss())?;
    validate_segment(&segment)?;

    let required = required_tx_power(optical.rx_sensitivity, &segment, &loss);
    let (min, max) = OpticalParameters::TX_POWER_RANGE;
    let report = RequiredTxReport {
        required_tx_power_dbm: required,
        rx_sensitivity_dbm: optical.rx_sensitivity,
        fiber_length_km: segment.fiber_length_km,
        splice_count: segment.splice_count,
        connector_count: segment.connector_count,
        safety_margin_db: loss.safety_margin,
        achievable: required <= max,
    };

    if json {
        return print_json(&report);
    }

    println!(
        "Required tx power: {} dBm (rx {} dBm, {} km, {} splices, {} connectors)",
        fmt_num(report.required_tx_power_dbm, 2),
        fmt_num(report.rx_sensitivity_dbm, 1),
        fmt_num(report.fiber_length_km, 2),
        report.splice_count,
        report.connector_count
    );
    if !report.achievable {
        println!("  - exceeds the {min}..{max} dBm transmitter range");
    }
    Ok(())
}
