//! Unit tests for request loading and result output.

use super::helpers::{THREE_DRIVERS, workspace, write_utf8};
use crate::CliError;
use crate::request::{load_participants, require_existing, write_result};
use rendezvous_core::{GeoPoint, Participant, RoutesToPoint, TravelMode};
use rstest::rstest;

#[rstest]
fn load_participants_decodes_json() {
    let (_tmp, root) = workspace();
    let path = root.join("group.json");
    write_utf8(&path, THREE_DRIVERS.as_bytes());

    let participants = load_participants(&path).expect("request should decode");

    assert_eq!(participants.len(), 3);
    assert_eq!(
        participants.first(),
        Some(&Participant::new("a", 25.03, 121.56, TravelMode::Driving).expect("valid"))
    );
    let defaulted = participants.get(2).expect("third participant");
    assert_eq!(defaulted.travel_mode, TravelMode::Driving);
}

#[rstest]
fn load_participants_keeps_unlocated_members() {
    let (_tmp, root) = workspace();
    let path = root.join("group.json");
    write_utf8(
        &path,
        br#"{"participants": [{"id": "away", "travelMode": "transit"}]}"#,
    );

    let participants = load_participants(&path).expect("request should decode");

    assert_eq!(
        participants,
        [Participant::unlocated("away", TravelMode::Transit)]
    );
}

#[rstest]
#[case::invalid_json(b"{ not valid json".as_slice())]
#[case::out_of_range(br#"{"participants": [{"id": "a", "lat": 123.0, "lng": 0.0}]}"#.as_slice())]
#[case::half_located(br#"{"participants": [{"id": "a", "lat": 25.0}]}"#.as_slice())]
#[case::unknown_mode(br#"{"participants": [{"id": "a", "travelMode": "teleport"}]}"#.as_slice())]
fn load_participants_rejects_malformed_requests(#[case] payload: &[u8]) {
    let (_tmp, root) = workspace();
    let path = root.join("group.json");
    write_utf8(&path, payload);

    let err = load_participants(&path).expect_err("malformed request should error");

    match err {
        CliError::ParseRequest { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ParseRequest, found {other:?}"),
    }
}

#[rstest]
fn load_participants_reports_missing_files() {
    let (_tmp, root) = workspace();
    let path = root.join("absent.json");

    let err = load_participants(&path).expect_err("missing request should error");

    match err {
        CliError::OpenRequest { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenRequest, found {other:?}"),
    }
}

#[rstest]
fn require_existing_distinguishes_missing_and_directories() {
    let (_tmp, root) = workspace();

    let missing = require_existing(&root.join("absent.json"), "request")
        .expect_err("missing file should error");
    let directory = require_existing(&root, "request").expect_err("directory should error");

    assert!(matches!(missing, CliError::MissingSourceFile { field: "request", .. }));
    assert!(matches!(directory, CliError::SourcePathNotFile { field: "request", .. }));
}

fn sample_result() -> RoutesToPoint {
    RoutesToPoint {
        target: GeoPoint::new(25.03, 121.56).expect("valid"),
        routes: Vec::new(),
        unresolved_participants: vec!["a".to_owned()],
        cached: false,
    }
}

#[rstest]
fn write_result_prints_pretty_json() {
    let mut buffer = Vec::new();

    write_result(&sample_result(), None, &mut buffer).expect("write to buffer");

    let printed = String::from_utf8(buffer).expect("utf-8 output");
    assert!(printed.ends_with("}\n"));
    assert!(printed.contains("\"unresolvedParticipants\""));
    let decoded: RoutesToPoint = serde_json::from_str(&printed).expect("valid JSON");
    assert_eq!(decoded, sample_result());
}

#[rstest]
fn write_result_to_a_file_prints_nothing() {
    let (_tmp, root) = workspace();
    let output = root.join("out").join("routes.json");
    let mut buffer = Vec::new();

    write_result(&sample_result(), Some(&output), &mut buffer).expect("write to file");

    assert!(buffer.is_empty());
    let written = std::fs::read_to_string(output.as_std_path()).expect("read output");
    let decoded: RoutesToPoint = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(decoded, sample_result());
}
