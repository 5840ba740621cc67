//! Geo-markup (KML) network export parsing.
//!
//! Every `<Placemark>` is read in document order, classified by keyword into
//! a pole, a distribution point or a cable, and turned into a typed entity
//! when it carries usable geometry. All placemarks, typed or not, are kept
//! in the snapshot's raw trail.
//!
//! Element matching uses local names, so `kml:Placemark` and a default-
//! namespace `Placemark` are the same thing.

use fibernet_core::{
    Cable, Coordinate, DistributionPoint, EntityKind, GeometryError, NetworkSnapshot, Pole,
    RawPlacemark,
};

use crate::error::ParseError;
use crate::fields;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Keyword sets, checked top to bottom against lowercase `name + description`.
/// A placemark matching several sets takes the first.
pub const CLASSIFICATION_RULES: [(EntityKind, &[&str]); 3] = [
    (EntityKind::Pole, &["tiang", "pole", "pu-", "designator:pu"]),
    (EntityKind::DistributionPoint, &["odp", "optical distribution", "splice"]),
    (EntityKind::Cable, &["cable", "kabel", "fiber length", "number of core", "adss"]),
];

pub fn classify(name: &str, description: &str) -> Option<EntityKind> {
    let haystack = format!("{name}\n{description}").to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(kind, _)| *kind)
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Whitespace-separated `lon,lat[,alt]` tuples. Malformed tuples are skipped.
pub fn parse_coordinates(text: &str) -> Vec<Coordinate> {
    text.split_whitespace().filter_map(parse_tuple).collect()
}

fn parse_tuple(tuple: &str) -> Option<Coordinate> {
    let mut parts = tuple.split(',');
    let longitude = parse_finite(parts.next()?)?;
    let latitude = parse_finite(parts.next()?)?;
    let altitude = match parts.next() {
        Some(alt) => parse_finite(alt)?,
        None => 0.0,
    };
    Some(Coordinate::new(longitude, latitude, altitude))
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fiber length text to meters. Accepts a bare number, `m`/`meter(s)` or
/// `km`/`kilometer(s)`; anything else (or a negative value) is 0.
pub fn parse_length_m(text: &str) -> f64 {
    let lower = text.trim().to_lowercase();

    let (number, scale) = ["kilometers", "kilometer", "km"]
        .iter()
        .find_map(|unit| lower.strip_suffix(unit).map(|n| (n, 1000.0)))
        .or_else(|| {
            ["meters", "meter", "m"]
                .iter()
                .find_map(|unit| lower.strip_suffix(unit).map(|n| (n, 1.0)))
        })
        .unwrap_or((lower.as_str(), 1.0));

    match parse_finite(number).map(|v| v * scale) {
        Some(m) if m >= 0.0 && m.is_finite() => m,
        _ => 0.0,
    }
}

/// Core count text; non-numeric is 0.
pub fn parse_count(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Document walk
// ---------------------------------------------------------------------------

/// Raw text pulled out of one `<Placemark>` subtree.
#[derive(Debug, Default)]
struct PlacemarkNode {
    name: Option<String>,
    description: Option<String>,
    point: Option<String>,
    line: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Capture {
    Name,
    Description,
    Point,
    Line,
}

/// Parse one document into a snapshot.
///
/// Only a malformed document fails. A placemark without usable geometry is
/// left out of the typed collections and its raw-trail entry records why.
pub fn parse(document: &str) -> Result<NetworkSnapshot, ParseError> {
    let nodes = collect_placemarks(document)?;
    log::info!("found {} placemarks", nodes.len());

    let mut snapshot = NetworkSnapshot::default();
    for node in nodes {
        let raw = ingest_placemark(node, &mut snapshot);
        snapshot.raw_placemarks.push(raw);
    }

    log::info!(
        "parsed {} poles, {} distribution points, {} cables",
        snapshot.poles.len(),
        snapshot.distribution_points.len(),
        snapshot.cables.len()
    );
    Ok(snapshot)
}

fn collect_placemarks(document: &str) -> Result<Vec<PlacemarkNode>, ParseError> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(document);
    let mut buf = Vec::new();

    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut nodes = Vec::new();

    // Depth of the open <Placemark>, if any.
    let mut placemark_depth: Option<usize> = None;
    let mut current = PlacemarkNode::default();
    let mut capture: Option<(Capture, usize)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                saw_root = true;

                if local == "Placemark" && placemark_depth.is_none() {
                    placemark_depth = Some(stack.len());
                    current = PlacemarkNode::default();
                } else if let (Some(depth), None) = (placemark_depth, capture) {
                    let parent = stack.last().map(String::as_str);
                    let target = match (local.as_str(), parent) {
                        ("name", _) if stack.len() == depth + 1 && current.name.is_none() => {
                            Some(Capture::Name)
                        }
                        ("description", _)
                            if stack.len() == depth + 1 && current.description.is_none() =>
                        {
                            Some(Capture::Description)
                        }
                        ("coordinates", Some("Point")) if current.point.is_none() => {
                            Some(Capture::Point)
                        }
                        ("coordinates", Some("LineString")) if current.line.is_none() => {
                            Some(Capture::Line)
                        }
                        _ => None,
                    };
                    if let Some(target) = target {
                        capture = Some((target, stack.len()));
                        text.clear();
                    }
                }

                stack.push(local);
            }
            Ok(Event::Empty(ref e)) => {
                saw_root = true;
                if placemark_depth.is_none() && e.local_name().as_ref() == b"Placemark" {
                    // <Placemark/>: no name, no description, no geometry.
                    nodes.push(PlacemarkNode::default());
                }
            }
            Ok(Event::Text(ref e)) if capture.is_some() => match e.decode() {
                Ok(t) => text.push_str(&t),
                Err(_) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            },
            Ok(Event::CData(ref e)) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::GeneralRef(ref e)) if capture.is_some() => {
                text.push_str(&resolve_reference(e));
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if stack.pop().as_deref() != Some(local.as_str()) {
                    return Err(ParseError::DocumentFormat {
                        position: reader.buffer_position() as u64,
                        message: format!("unexpected closing tag </{local}>"),
                    });
                }

                if let Some((target, depth)) = capture {
                    if depth == stack.len() {
                        let value = std::mem::take(&mut text);
                        match target {
                            Capture::Name => current.name = Some(value),
                            Capture::Description => current.description = Some(value),
                            Capture::Point => current.point = Some(value),
                            Capture::Line => current.line = Some(value),
                        }
                        capture = None;
                    }
                }

                if placemark_depth == Some(stack.len()) && local == "Placemark" {
                    nodes.push(std::mem::take(&mut current));
                    placemark_depth = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::DocumentFormat {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::DocumentFormat {
            position: reader.buffer_position() as u64,
            message: format!("unclosed element <{open}>"),
        });
    }
    if !saw_root {
        return Err(ParseError::DocumentFormat {
            position: 0,
            message: "document has no root element".into(),
        });
    }

    Ok(nodes)
}

fn resolve_reference(e: &quick_xml::events::BytesRef<'_>) -> String {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        return ch.to_string();
    }
    let name = String::from_utf8_lossy(e);
    match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(resolved) => resolved.to_string(),
        None => format!("&{name};"),
    }
}

// ---------------------------------------------------------------------------
// Entity construction
// ---------------------------------------------------------------------------

fn ingest_placemark(node: PlacemarkNode, snapshot: &mut NetworkSnapshot) -> RawPlacemark {
    let name = node
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown")
        .to_string();
    let description = node.description.as_deref().map(str::trim).unwrap_or("").to_string();
    let kind = classify(&name, &description);

    let outcome = match kind {
        Some(EntityKind::Pole) => single_point(node.point.as_deref()).map(|coordinate| {
            snapshot.poles.push(build_pole(&name, &description, coordinate));
        }),
        Some(EntityKind::DistributionPoint) => {
            single_point(node.point.as_deref()).map(|coordinate| {
                snapshot
                    .distribution_points
                    .push(build_distribution_point(&name, &description, coordinate));
            })
        }
        Some(EntityKind::Cable) => path(node.line.as_deref()).map(|path| {
            snapshot.cables.push(build_cable(&name, &description, path));
        }),
        None => Ok(()),
    };

    let geometry_error = match outcome {
        Ok(()) => None,
        Err(e) => {
            // kind is always set here; unclassified placemarks never fail.
            log::warn!(
                "dropping {} '{}': {}",
                kind.map(|k| k.to_string()).unwrap_or_default(),
                name,
                e
            );
            Some(e)
        }
    };

    RawPlacemark { name, description, kind, geometry_error }
}

fn single_point(text: Option<&str>) -> Result<Coordinate, GeometryError> {
    let text = text.ok_or(GeometryError::Missing { expected: "Point" })?;
    parse_coordinates(text)
        .into_iter()
        .next()
        .ok_or(GeometryError::NoValidCoordinates { expected: "Point" })
}

fn path(text: Option<&str>) -> Result<Vec<Coordinate>, GeometryError> {
    let text = text.ok_or(GeometryError::Missing { expected: "LineString" })?;
    let coords = parse_coordinates(text);
    if coords.is_empty() {
        return Err(GeometryError::NoValidCoordinates { expected: "LineString" });
    }
    Ok(coords)
}

fn build_pole(name: &str, description: &str, coordinate: Coordinate) -> Pole {
    Pole {
        name: name.to_string(),
        designator: fields::extract_or(description, "Designator", name),
        construction_status: fields::extract_or(description, "Construction Status", "Unknown"),
        material_type: fields::extract_or(description, "Material Type", "Unknown"),
        usage: fields::extract_or(description, "Usage", "Telco"),
        coordinate,
    }
}

fn build_distribution_point(
    name: &str,
    description: &str,
    coordinate: Coordinate,
) -> DistributionPoint {
    DistributionPoint {
        name: name.to_string(),
        specification: fields::extract_or(description, "Specification ID", "Unknown"),
        splice_type: fields::extract_or(description, "Splice Type", "Unknown"),
        construction_status: fields::extract_or(description, "Construction Status", "Unknown"),
        coordinate,
    }
}

fn build_cable(name: &str, description: &str, path: Vec<Coordinate>) -> Cable {
    Cable {
        name: name.to_string(),
        specification: fields::extract_or(description, "Specification", "Unknown"),
        number_of_cores: fields::extract(description, "Number of Core")
            .map(|v| parse_count(&v))
            .unwrap_or(0),
        fiber_length: fields::extract(description, "Fiber Length")
            .map(|v| parse_length_m(&v))
            .unwrap_or(0.0),
        construction_status: fields::extract_or(description, "Construction Status", "Unknown"),
        path,
    }
}
