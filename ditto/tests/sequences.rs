use ditto::{CopyErrorKind, Copier, copy};
use facet::Facet;
use pretty_assertions::assert_eq;

#[derive(Facet, Debug, Default, Clone, PartialEq)]
pub struct Reading {
    pub sensor: String,
    pub value: f32,
}

#[derive(Facet, Debug, Default, Clone, PartialEq)]
pub struct Sample {
    pub sensor: String,
    pub value: f32,
    pub flagged: bool,
}

fn readings(count: usize) -> Vec<Reading> {
    (0..count)
        .map(|i| Reading {
            sensor: format!("s{i}"),
            value: i as f32 * 0.5,
        })
        .collect()
}

// =============================================================================
// Top-level sequences
// =============================================================================

#[test]
fn copy_sequence_into_empty_sequence() {
    let source = readings(3);
    let mut destination: Vec<Sample> = Vec::new();

    copy(&mut destination, &source).unwrap();

    assert_eq!(destination.len(), 3);
    for (sample, reading) in destination.iter().zip(&source) {
        assert_eq!(sample.sensor, reading.sensor);
        assert_eq!(sample.value, reading.value);
        assert!(!sample.flagged);
    }
}

#[test]
fn copied_elements_are_independent() {
    let mut source = readings(2);
    let mut destination: Vec<Sample> = Vec::new();

    copy(&mut destination, &source).unwrap();
    source[0].sensor.push_str("-changed");
    source.push(Reading::default());

    assert_eq!(destination.len(), 2);
    assert_eq!(destination[0].sensor, "s0");
}

#[test]
fn repeated_copies_append() {
    let first = readings(2);
    let second = vec![Reading {
        sensor: "late".into(),
        value: 9.0,
    }];
    let mut destination: Vec<Sample> = Vec::new();

    copy(&mut destination, &first).unwrap();
    copy(&mut destination, &second).unwrap();

    let sensors: Vec<&str> = destination.iter().map(|s| s.sensor.as_str()).collect();
    assert_eq!(sensors, vec!["s0", "s1", "late"]);
}

#[test]
fn existing_elements_are_kept() {
    let mut destination = vec![Sample {
        sensor: "kept".into(),
        value: 1.0,
        flagged: true,
    }];

    copy(&mut destination, &readings(1)).unwrap();

    assert_eq!(destination.len(), 2);
    assert!(destination[0].flagged);
    assert_eq!(destination[1].sensor, "s0");
}

#[test]
fn scalar_sequences() {
    let source = vec![1u32, 2, 3];
    let mut destination = vec![0u32];
    copy(&mut destination, &source).unwrap();
    assert_eq!(destination, vec![0, 1, 2, 3]);
}

#[test]
fn broadcast_composite_appends_one_element() {
    let source = Reading {
        sensor: "solo".into(),
        value: 2.5,
    };
    let mut destination: Vec<Sample> = Vec::new();

    copy(&mut destination, &source).unwrap();
    copy(&mut destination, &source).unwrap();

    assert_eq!(destination.len(), 2);
    assert_eq!(destination[1].sensor, "solo");
}

#[test]
fn scalar_cannot_be_copied_into_sequence() {
    let mut destination: Vec<Sample> = Vec::new();
    let errors = copy(&mut destination, &7i32).unwrap_err();

    assert_eq!(errors.len(), 1);
    let error = &errors.as_slice()[0];
    assert!(!error.is_member_failure());
    assert!(matches!(
        error.kind,
        CopyErrorKind::UnsupportedSourceShape { .. }
    ));
    assert!(destination.is_empty());
}

#[test]
fn sequence_cannot_be_copied_into_composite() {
    let mut destination = Sample::default();
    let errors = copy(&mut destination, &readings(2)).unwrap_err();

    assert!(matches!(
        errors.as_slice()[0].kind,
        CopyErrorKind::ShapeMismatch { .. }
    ));
    assert_eq!(destination, Sample::default());
}

// =============================================================================
// Element failures
// =============================================================================

#[derive(Facet, Debug, Default)]
pub struct WideReading {
    pub sensor: String,
    pub value: f64,
}

#[test]
fn element_failures_are_collected_per_index() {
    let source = readings(3);
    let mut destination: Vec<WideReading> = Vec::new();

    let errors = copy(&mut destination, &source).unwrap_err();

    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["[0].value", "[1].value", "[2].value"]);

    // Every element is still appended with what did copy.
    assert_eq!(destination.len(), 3);
    assert_eq!(destination[2].sensor, "s2");
    assert_eq!(destination[2].value, 0.0);
}

#[test]
fn element_indices_continue_after_existing_elements() {
    let mut destination = vec![WideReading::default()];
    let errors = copy(&mut destination, &readings(1)).unwrap_err();
    assert_eq!(errors.as_slice()[0].path.to_string(), "[1].value");
}

// =============================================================================
// Sequence members
// =============================================================================

#[derive(Facet, Debug, Default, Clone)]
pub struct Batch {
    pub name: String,
    pub readings: Vec<Reading>,
    pub tags: Vec<String>,
}

#[derive(Facet, Debug, Default)]
pub struct Report {
    pub name: String,
    pub readings: Vec<Sample>,
    pub tags: Vec<String>,
}

#[derive(Facet, Debug, Default)]
pub struct Headline {
    pub name: String,
    pub readings: Reading,
}

#[test]
fn sequence_members_are_deep_copied() {
    let mut source = Batch {
        name: "night".into(),
        readings: readings(2),
        tags: vec!["cold".into()],
    };
    let mut destination = Report::default();

    copy(&mut destination, &source).unwrap();

    source.tags.push("windy".into());
    source.readings[1].value = 100.0;

    assert_eq!(destination.tags, vec!["cold".to_string()]);
    assert_eq!(destination.readings.len(), 2);
    assert_eq!(destination.readings[1].value, 0.5);
}

#[test]
fn composite_member_broadcasts_into_sequence_member() {
    let source = Headline {
        name: "peak".into(),
        readings: Reading {
            sensor: "roof".into(),
            value: 31.0,
        },
    };
    let mut destination = Report::default();

    copy(&mut destination, &source).unwrap();
    assert_eq!(destination.readings.len(), 1);
    assert_eq!(destination.readings[0].sensor, "roof");
}

#[test]
fn sequence_member_failures_name_the_member_and_index() {
    #[derive(Facet, Debug, Default)]
    pub struct WideReport {
        pub readings: Vec<WideReading>,
    }

    let source = Batch {
        readings: readings(2),
        ..Default::default()
    };
    let mut destination = WideReport::default();

    let errors = Copier::new().copy(&mut destination, &source).unwrap_err();
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["readings[0].value", "readings[1].value"]);
    assert_eq!(errors.as_slice()[1].member(), Some("value"));
}
