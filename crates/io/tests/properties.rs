// Property-based tests for the document and table parsers.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use fibernet_core::EntityKind;
use fibernet_io::kml::parse_length_m;
use fibernet_io::{parse_kml, parse_opm};
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// (kind, has geometry)
type PlacemarkSpec = (Option<EntityKind>, bool);

fn arb_placemark() -> impl Strategy<Value = PlacemarkSpec> {
    (
        prop_oneof![
            Just(Some(EntityKind::Pole)),
            Just(Some(EntityKind::DistributionPoint)),
            Just(Some(EntityKind::Cable)),
            Just(None),
        ],
        any::<bool>(),
    )
}

fn render(specs: &[PlacemarkSpec]) -> String {
    let mut doc = String::from("<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Document>\n");
    for (i, (kind, has_geometry)) in specs.iter().enumerate() {
        let (name, geometry) = match kind {
            Some(EntityKind::Pole) => (format!("PU-{i}"), "<Point><coordinates>106.8,-6.1,0</coordinates></Point>"),
            Some(EntityKind::DistributionPoint) => {
                (format!("ODP-{i}"), "<Point><coordinates>106.8,-6.1</coordinates></Point>")
            }
            Some(EntityKind::Cable) => (
                format!("CABLE-{i}"),
                "<LineString><coordinates>106.8,-6.1,0 106.9,-6.2,0</coordinates></LineString>",
            ),
            None => (format!("SITE-{i}"), "<Point><coordinates>106.8,-6.1,0</coordinates></Point>"),
        };
        doc.push_str("<Placemark><name>");
        doc.push_str(&name);
        doc.push_str("</name>");
        if *has_geometry {
            doc.push_str(geometry);
        }
        doc.push_str("</Placemark>\n");
    }
    doc.push_str("</Document></kml>\n");
    doc
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_placemark_lands_in_raw_trail_in_order(specs in prop::collection::vec(arb_placemark(), 0..30)) {
        let snapshot = parse_kml(&render(&specs)).unwrap();

        prop_assert_eq!(snapshot.raw_placemarks.len(), specs.len());
        for (raw, (kind, _)) in snapshot.raw_placemarks.iter().zip(&specs) {
            prop_assert_eq!(raw.kind, *kind);
        }

        let accepted = |k: EntityKind| specs.iter().filter(|(kind, g)| *kind == Some(k) && *g).count();
        prop_assert_eq!(snapshot.poles.len(), accepted(EntityKind::Pole));
        prop_assert_eq!(snapshot.distribution_points.len(), accepted(EntityKind::DistributionPoint));
        prop_assert_eq!(snapshot.cables.len(), accepted(EntityKind::Cable));

        // Typed collections keep document order.
        let cable_names: Vec<String> = specs
            .iter()
            .enumerate()
            .filter(|(_, (kind, g))| *kind == Some(EntityKind::Cable) && *g)
            .map(|(i, _)| format!("CABLE-{i}"))
            .collect();
        let parsed: Vec<String> = snapshot.cables.iter().map(|c| c.name.clone()).collect();
        prop_assert_eq!(parsed, cable_names);
    }

    #[test]
    fn arbitrary_documents_never_panic(doc in ".{0,400}") {
        let _ = parse_kml(&doc);
    }

    #[test]
    fn arbitrary_tables_never_panic(table in "[A-Za-z0-9 ,;.\\-\n]{0,400}") {
        if let Ok(parsed) = parse_opm(&table) {
            let data_rows = table.lines().count().saturating_sub(1);
            prop_assert!(parsed.measurements.len() + parsed.skipped.len() <= data_rows);
        }
    }

    #[test]
    fn lengths_are_never_negative(text in ".{0,24}") {
        let m = parse_length_m(&text);
        prop_assert!(m >= 0.0 && m.is_finite());
    }

    #[test]
    fn km_suffix_scales_by_thousand(v in 0.0f64..500.0) {
        let km = parse_length_m(&format!("{v} km"));
        let m = parse_length_m(&format!("{v}"));
        prop_assert!((km - m * 1000.0).abs() < 1e-6);
    }
}
