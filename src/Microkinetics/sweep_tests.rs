use super::errors::{DeckError, ParseErrorKind};
use super::sweep::{SweepOrchestrator, SweepPoint};
use super::test_fixtures::{co2_tables, tables_with_reactions};
use super::value_source::{POTENTIAL_COLUMN, TableKind};
use crate::settings::RunSettings;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

fn settings(workers: usize) -> RunSettings {
    RunSettings {
        workers: Some(workers),
        ..RunSettings::default()
    }
}

fn run_line(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap();
    text.rsplit('\n').next().unwrap().to_string()
}

#[test]
fn four_points_four_decks() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("multiple_run");
    let sweep = SweepOrchestrator::new(co2_tables(), settings(2), &root);
    let report = sweep.run(&[0.0, 7.0], &[-0.5, 0.0]).unwrap();
    assert!(report.all_succeeded());
    assert_eq!(report.written.len(), 4);
    for (ph, v) in [("pH_0.0", "V_-0.5"), ("pH_0.0", "V_0.0"), ("pH_7.0", "V_-0.5"), ("pH_7.0", "V_0.0")] {
        let path = root.join(ph).join(v).join("input_file.mkm");
        assert!(path.is_file(), "missing {}", path.display());
    }
    // nothing else was created under the root
    assert_eq!(fs::read_dir(&root).unwrap().count(), 2);
}

#[test]
fn each_deck_carries_its_own_potential() {
    let dir = tempdir().unwrap();
    let sweep = SweepOrchestrator::new(co2_tables(), settings(4), dir.path());
    let report = sweep.run(&[0.0, 7.0], &[-0.5, 0.0]).unwrap();
    assert!(report.all_succeeded());
    for deck in &report.written {
        let expected = if deck.point.potential < 0.0 { "-0.5 " } else { "0.0  " };
        assert_eq!(
            run_line(&deck.path),
            format!("298.15;{};1.00e+08;1e-12;1e-12", expected)
        );
    }
    // the rest of the deck does not depend on the point
    let strip = |p: &Path| {
        let text = fs::read_to_string(p).unwrap();
        text[..text.rfind('\n').unwrap()].to_string()
    };
    let first = strip(&report.written[0].path);
    assert!(report.written.iter().all(|d| strip(&d.path) == first));
}

#[test]
fn grid_is_ph_major_and_plan_dedupes() {
    let grid = SweepOrchestrator::grid(&[1.0, 2.0], &[0.1, 0.2]);
    assert_eq!(
        grid,
        vec![
            SweepPoint::new(1.0, 0.1),
            SweepPoint::new(1.0, 0.2),
            SweepPoint::new(2.0, 0.1),
            SweepPoint::new(2.0, 0.2),
        ]
    );
    let sweep = SweepOrchestrator::new(co2_tables(), settings(1), "root");
    let plan = sweep.plan(&[7.0, 7.0], &[0.0, -0.5, 0.0]).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan[0].path,
        Path::new("root").join("pH_7.0").join("V_0.0").join("input_file.mkm")
    );
}

#[test]
fn non_finite_values_rejected() {
    let sweep = SweepOrchestrator::new(co2_tables(), settings(1), "root");
    assert!(matches!(
        sweep.plan(&[f64::NAN], &[0.0]),
        Err(DeckError::Config(_))
    ));
}

#[test]
fn blocked_point_fails_alone() {
    let dir = tempdir().unwrap();
    // a plain file where the pH_7.0 directory should go
    fs::write(dir.path().join("pH_7.0"), "not a directory").unwrap();
    let sweep = SweepOrchestrator::new(co2_tables(), settings(2), dir.path());
    let report = sweep.run(&[0.0, 7.0], &[-0.5, 0.0]).unwrap();
    assert_eq!(report.written.len(), 2);
    assert_eq!(report.failed.len(), 2);
    assert!(!report.all_succeeded());
    for failure in &report.failed {
        assert_eq!(failure.point.ph, 7.0);
        assert!(matches!(failure.error, DeckError::Io { .. }));
    }
    for deck in &report.written {
        assert_eq!(deck.point.ph, 0.0);
        assert!(deck.path.is_file());
    }
}

#[test]
fn malformed_reaction_reported_per_point() {
    let dir = tempdir().unwrap();
    let tables = tables_with_reactions(&["CO2 → CO2*", "CO2* CO* + O*"]);
    let sweep = SweepOrchestrator::new(tables, settings(2), dir.path());
    let report = sweep.run(&[7.0], &[-0.5, 0.0]).unwrap();
    assert!(report.written.is_empty());
    assert_eq!(report.failed.len(), 2);
    for failure in &report.failed {
        assert_eq!(failure.error.offending_equation(), Some("CO2* CO* + O*"));
        match &failure.error {
            DeckError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::MissingArrow),
            other => panic!("unexpected error {other}"),
        }
        assert!(failure.to_string().contains("pH=7.0"));
    }
    assert!(!dir.path().join("pH_7.0").join("V_0.0").join("input_file.mkm").exists());
}

#[test]
fn rerun_overwrites_in_place() {
    let dir = tempdir().unwrap();
    let sweep = SweepOrchestrator::new(co2_tables(), settings(2), dir.path());
    let first = sweep.run(&[7.0], &[0.0]).unwrap();
    let before = fs::read_to_string(&first.written[0].path).unwrap();
    let second = sweep.run(&[7.0], &[0.0]).unwrap();
    assert_eq!(fs::read_to_string(&second.written[0].path).unwrap(), before);
    let deck_dir = second.written[0].path.parent().unwrap();
    assert_eq!(fs::read_dir(deck_dir).unwrap().count(), 1);
}

#[test]
fn base_tables_potential_is_ignored() {
    let dir = tempdir().unwrap();
    let tables = co2_tables().with_column(
        TableKind::LocalEnvironment,
        POTENTIAL_COLUMN,
        vec![json!(-1.2)],
    );
    let sweep = SweepOrchestrator::new(tables, settings(1), dir.path());
    let report = sweep.run(&[3.0], &[0.25]).unwrap();
    assert_eq!(
        run_line(&report.written[0].path),
        "298.15;0.25 ;1.00e+08;1e-12;1e-12"
    );
}

#[test]
fn cancelled_sweep_writes_nothing() {
    let dir = tempdir().unwrap();
    let sweep = SweepOrchestrator::new(co2_tables(), settings(2), dir.path());
    sweep.cancel_handle().store(true, Ordering::SeqCst);
    let report = sweep.run(&[0.0, 7.0], &[-0.5, 0.0]).unwrap();
    assert_eq!(report.cancelled.len(), 4);
    assert_eq!(report.total(), 4);
    assert!(!report.all_succeeded());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
