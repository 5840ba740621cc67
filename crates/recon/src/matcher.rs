use std::collections::{HashMap, HashSet};

use fibernet_core::OpmMeasurement;

use crate::model::CableRecord;

/// One cable name and where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CableMatch<'a> {
    Matched {
        planned: &'a CableRecord,
        built: &'a CableRecord,
    },
    PlannedOnly(&'a CableRecord),
    BuiltOnly(&'a CableRecord),
}

impl CableMatch<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Matched { planned, .. } => &planned.name,
            Self::PlannedOnly(r) | Self::BuiltOnly(r) => &r.name,
        }
    }
}

/// Collapse duplicate names: the last record wins, at the position of the first.
pub fn dedupe<'a>(side: &str, records: &'a [CableRecord]) -> Vec<&'a CableRecord> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<&CableRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(record.name.as_str()) {
            Some(&pos) => {
                log::warn!("{side}: duplicate cable '{}', keeping the last occurrence", record.name);
                out[pos] = record;
            }
            None => {
                index.insert(record.name.as_str(), out.len());
                out.push(record);
            }
        }
    }

    out
}

/// Match planned and built cables by exact name.
///
/// Output order: planned cables in their order (matched or not), then
/// built-only cables in built order. Every distinct name appears once.
pub fn match_by_name<'a>(planned: &'a [CableRecord], built: &'a [CableRecord]) -> Vec<CableMatch<'a>> {
    let planned = dedupe("planned", planned);
    let built = dedupe("built", built);

    let built_map: HashMap<&str, &CableRecord> =
        built.iter().map(|r| (r.name.as_str(), *r)).collect();

    let mut out = Vec::with_capacity(planned.len() + built.len());

    for &p in &planned {
        match built_map.get(p.name.as_str()) {
            Some(&b) => out.push(CableMatch::Matched { planned: p, built: b }),
            None => out.push(CableMatch::PlannedOnly(p)),
        }
    }

    let planned_names: HashSet<&str> = planned.iter().map(|r| r.name.as_str()).collect();
    for &b in &built {
        if !planned_names.contains(b.name.as_str()) {
            out.push(CableMatch::BuiltOnly(b));
        }
    }

    out
}

/// Measurements keyed by cable id; a later record for the same cable replaces an earlier one.
pub fn index_measurements(measurements: &[OpmMeasurement]) -> HashMap<&str, &OpmMeasurement> {
    measurements.iter().map(|m| (m.cable_id.as_str(), m)).collect()
}
