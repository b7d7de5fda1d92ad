use std::sync::{Arc, Mutex};

use csv_anomaly::PipelineError;
use csv_anomaly::observability::{PipelineContext, PipelineObserver, PipelineStats, Severity};
use csv_anomaly::pipeline::{PipelineOptions, detect_from_path};

const FIXTURE: &str = "tests/fixtures/readings.csv";

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<PipelineStats>>,
    failures: Mutex<Vec<Severity>>,
    alerts: Mutex<Vec<Severity>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_success(&self, _ctx: &PipelineContext, stats: PipelineStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &PipelineContext, severity: Severity, _error: &PipelineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &PipelineContext, severity: Severity, _error: &PipelineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn temperature_options() -> PipelineOptions {
    PipelineOptions {
        column: Some("temperature".to_string()),
        threshold: 1.9,
        ..Default::default()
    }
}

#[test]
fn end_to_end_flags_the_spike() {
    let report = detect_from_path(FIXTURE, &temperature_options()).unwrap();

    assert_eq!(report.column, "temperature");
    assert_eq!(report.rows, 6);
    assert_eq!(report.result.anomalies, vec![95.0]);
    assert_eq!(
        report.result.mask,
        vec![false, false, false, false, true, false]
    );
    // The null row carries no score.
    assert_eq!(report.result.scores[2], None);
    assert_eq!(report.result.stats.non_null, 5);
}

#[test]
fn pipelined_run_matches_sequential() {
    let sequential = detect_from_path(FIXTURE, &temperature_options()).unwrap();

    let mut opts = temperature_options();
    opts.pipelined = true;
    let pipelined = detect_from_path(FIXTURE, &opts).unwrap();

    assert_eq!(sequential, pipelined);
}

#[test]
fn auto_selects_the_first_numeric_column() {
    let opts = PipelineOptions::default();
    let report = detect_from_path(FIXTURE, &opts).unwrap();
    assert_eq!(report.column, "timestamp");
    assert_eq!(report.rows, 6);
}

#[test]
fn report_serializes_to_json() {
    let report = detect_from_path(FIXTURE, &temperature_options()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["column"], "temperature");
    assert_eq!(json["rows"], 6);
    assert_eq!(json["result"]["anomalies"][0], 95.0);
    // Null rows serialize as JSON null in the score sequence.
    assert!(json["result"]["scores"][2].is_null());
}

#[test]
fn observer_receives_success_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = temperature_options();
    opts.observer = Some(obs.clone());

    detect_from_path(FIXTURE, &opts).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![PipelineStats {
            rows: 6,
            anomalies: 1
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = temperature_options();
    opts.observer = Some(obs.clone());
    opts.alert_at_or_above = Severity::Critical;

    let err = detect_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)), "{err}");

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![Severity::Critical]);
    assert_eq!(alerts, vec![Severity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = temperature_options();
    opts.column = Some("definitely_missing".to_string());
    opts.observer = Some(obs.clone());
    opts.alert_at_or_above = Severity::Critical;

    let err = detect_from_path(FIXTURE, &opts).unwrap_err();
    assert!(matches!(err, PipelineError::ColumnNotFound { .. }), "{err}");

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![Severity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn null_rows_stay_unflagged_end_to_end() {
    // humidity row 4 is the 'n/a' token.
    let report = detect_from_path(
        FIXTURE,
        &PipelineOptions {
            column: Some("humidity".to_string()),
            threshold: 0.5,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!report.result.mask[3]);
    assert_eq!(report.result.scores[3], None);
    assert_eq!(report.result.stats.non_null, 5);
}
