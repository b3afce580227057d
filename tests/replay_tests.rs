// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Replay of the bundled demo scripts through the umbrella crate

use std::path::PathBuf;

use tempfile::tempdir;
use visionlink::config::load_config;
use visionlink::prelude::*;
use visionlink::recognition::CoordinatorError;
use visionlink::replay::load_script;

fn demo(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(path)
}

#[test]
fn test_demo_success_script() {
    let script = load_script(&demo("scripts/red_success.json")).unwrap();

    let outcome = replay_script(script, &ReplayOptions::default()).unwrap();

    assert!(outcome.succeeded());
    assert_eq!(outcome.alliance(), AllianceSelector::Red);
    assert_eq!(
        outcome.result(),
        Some(&RecognitionResult::Success {
            selected_sample_color: SampleColor::Red,
            angle_degrees: 37.5,
            center_x: 120,
            center_y: 80,
        })
    );
    assert_eq!(outcome.label(), Some("LRS_000000"));
    assert_eq!(outcome.counters().no_output, 1);
    assert_eq!(outcome.counters().idle_loop, 1);
    assert_eq!(outcome.counters().no_image, 1);
}

#[test]
fn test_demo_crash_script() {
    let script = load_script(&demo("scripts/crash.json")).unwrap();
    let options = ReplayOptions {
        alliance: AllianceSelector::Blue,
        ..ReplayOptions::default()
    };

    let outcome = replay_script(script, &options).unwrap();

    assert!(!outcome.succeeded());
    assert_eq!(outcome.termination(), &SessionTermination::Crashed);
    assert_eq!(
        outcome.result(),
        Some(&RecognitionResult::Crash {
            crash_line_number: 57
        })
    );
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["label"], "LRC_000000");
    assert_eq!(json["alliance"], "BLUE");
}

#[test]
fn test_demo_config_matches_defaults() {
    let config = load_config(Some(demo("visionlink.toml").as_path()), None).unwrap();
    assert_eq!(RecognitionSettings::from_config(&config), RecognitionSettings::default());
}

#[test]
fn test_replay_with_silent_device_fails_initialization() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("silent.json");
    std::fs::write(&path, r#"{ "steady_status": null }"#).unwrap();
    let script = load_script(&path).unwrap();

    let result = replay_script(script, &ReplayOptions::default());

    match result {
        Err(CoordinatorError::Initialization(e)) => {
            assert!(e.is_recoverable());
            assert!(e.counters().no_status > 0);
        }
        other => panic!("expected initialization failure, got {:?}", other.map(|o| o.succeeded())),
    }
}

#[test]
fn test_replay_respects_recognition_budget() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idle_forever.json");
    std::fs::write(
        &path,
        r#"{ "pipelines": { "1": { "steady": { "kind": "payload", "values": [400] } },
                            "0": { "steady": { "kind": "payload", "values": [400] } } } }"#,
    )
    .unwrap();
    let options = ReplayOptions {
        settings: RecognitionSettings {
            recognition_timeout_ms: 50,
            ..RecognitionSettings::default()
        },
        ..ReplayOptions::default()
    };

    let outcome = replay_script(load_script(&path).unwrap(), &options).unwrap();

    assert_eq!(outcome.termination(), &SessionTermination::RecognitionTimedOut);
    assert_eq!(outcome.counters().idle_loop, 50);
    assert!(outcome.label().is_none());
}

#[test]
fn test_load_script_reports_bad_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load_script(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse script"));
}
