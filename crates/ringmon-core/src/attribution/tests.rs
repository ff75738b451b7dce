use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use super::*;
use crate::fakes::{Behavior, FakeProcesses, snapshot};
use crate::format::{local, log_stamp};
use crate::log::{Level, MemoryLog};

fn context() -> (Context, Arc<MemoryLog>) {
    let log = Arc::new(MemoryLog::new());
    (Context::new(log.clone()), log)
}

fn scanner(processes: FakeProcesses) -> (Arc<AttributionScanner>, Arc<FakeProcesses>, Arc<MemoryLog>) {
    let (ctx, log) = context();
    let processes = Arc::new(processes);
    let scanner = AttributionScanner::new(processes.clone(), ctx, ScanConfig::default());
    (Arc::new(scanner), processes, log)
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting");
        thread::sleep(Duration::from_millis(2));
    }
}

const BURN: Behavior = Behavior::Busy(Duration::from_secs(1));

#[test]
fn guard_releases_lock_on_drop() {
    // Arrange
    let lock = EvaluationLock::new();

    // Act
    let guard = lock.try_begin();
    let second = lock.try_begin();

    // Assert
    assert!(guard.is_some());
    assert!(second.is_none());
    assert!(lock.is_busy());
    drop(guard);
    assert!(!lock.is_busy());
    assert!(lock.try_begin().is_some());
}

#[test]
fn processes_below_three_seconds_are_never_measured() {
    // Arrange
    let fake = FakeProcesses::new(vec![
        snapshot(1, "fresh", 0.5),
        snapshot(2, "almost", 2.999),
        snapshot(3, "exact", 3.0),
        snapshot(4, "old", 120.0),
    ])
    .with(1, BURN)
    .with(2, BURN)
    .with(3, BURN)
    .with(4, BURN);
    let (scanner, fake, _log) = scanner(fake);

    // Act
    let mut names = Vec::new();
    let summary = scanner.scan(99, |r| names.push(r.name.clone()));

    // Assert
    assert_eq!(fake.measured(), [3, 4]);
    assert_eq!(names, ["exact", "old"]);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.examined, 2);
    assert_eq!(summary.offenders, 2);
}

#[test]
fn idle_processes_are_not_reported() {
    // Arrange
    let fake = FakeProcesses::new(vec![snapshot(7, "busy", 10.0), snapshot(8, "idle", 10.0)])
        .with(7, BURN)
        .with(8, Behavior::Idle);
    let (scanner, _fake, log) = scanner(fake);

    // Act
    let summary = scanner.scan(99, |_| {});

    // Assert
    assert_eq!(summary.offenders, 1);
    assert!(log.contains("  Process.: busy"));
    assert!(!log.contains("  Process.: idle"));
}

#[test]
fn reported_cpu_never_exceeds_the_whole_machine() {
    // Arrange
    let fake = FakeProcesses::new(vec![snapshot(7, "busy", 10.0)]).with(7, BURN);
    let (scanner, _fake, log) = scanner(fake);
    let mut reported = Vec::new();

    // Act
    scanner.scan(50, |r| reported.push(r.cpu_percent));

    // Assert
    assert_eq!(reported, [100.0]);
    assert!(log.contains("  CPU.....: 100.0%"));
}

#[test]
fn per_process_errors_are_logged_and_scan_continues() {
    // Arrange
    let fake = FakeProcesses::new(vec![
        snapshot(10, "locked", 10.0),
        snapshot(11, "gone", 10.0),
        snapshot(12, "hog", 10.0),
    ])
    .with(10, Behavior::Denied)
    .with(11, Behavior::Exits)
    .with(12, BURN);
    let (scanner, _fake, log) = scanner(fake);

    // Act
    let summary = scanner.scan(99, |_| {});

    // Assert
    assert_eq!(summary.errors, 2);
    assert_eq!(summary.offenders, 1);
    assert_eq!(log.count(Level::Error), 2);
    assert!(log.contains("access denied to process 10"));
    assert!(log.contains("process 11 exited"));
    assert!(log.contains("  Process.: hog"));
}

#[test]
fn enumeration_failure_ends_scan() {
    // Arrange
    let mut fake = FakeProcesses::new(vec![snapshot(1, "x", 10.0)]);
    fake.fail_enumeration = true;
    let (scanner, fake, log) = scanner(fake);

    // Act
    let summary = scanner.scan(99, |_| {});

    // Assert
    assert_eq!(summary, ScanSummary::default());
    assert!(fake.measured().is_empty());
    assert!(log.contains("process enumeration failed"));
}

#[test]
fn record_block_has_separator_and_aligned_fields() {
    // Arrange
    let mut p = snapshot(42, "hog.exe", 90.0);
    p.window_title = Some("Build output".into());
    let record = AttributionRecord::new(&p, 27.26);

    // Act
    let lines = record.log_lines();

    // Assert
    assert_eq!(lines[0], "-".repeat(42));
    assert_eq!(lines[1], "  Process.: hog.exe");
    assert_eq!(lines[2], "  PID.....: 42");
    assert_eq!(lines[3], "  Title...: Build output");
    assert_eq!(lines[4], "  CPU.....: 27.3%");
    assert_eq!(lines[5], "  Time....: 1.5 minutes");
    assert_eq!(lines[6], "  Memory..: 64.00 MB");
    assert_eq!(lines[7], "  Threads.: 12");
    let started = log_stamp(&local(SystemTime::UNIX_EPOCH));
    assert_eq!(lines[8], format!("  Started.: {started}"));
}

#[test]
fn empty_title_is_omitted() {
    // Arrange
    let mut p = snapshot(1, "svc", 5.0);
    p.window_title = Some(String::new());

    // Act
    let lines = AttributionRecord::new(&p, 1.0).log_lines();

    // Assert
    assert!(!lines.iter().any(|l| l.contains("Title")));
}

#[test]
fn concurrent_triggers_run_exactly_one_scan() {
    // Arrange
    let fake = FakeProcesses::new(vec![snapshot(1, "hog", 10.0)]).with(1, BURN).gated();
    let (scanner, fake, _log) = scanner(fake);

    // Act
    assert!(scanner.trigger(99));
    wait_until(|| fake.enumerations() == 1);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = Arc::clone(&scanner);
            thread::spawn(move || s.trigger(99))
        })
        .collect();
    let started: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    fake.open_gate();
    wait_until(|| !scanner.context.evaluation.is_busy());

    // Assert
    assert!(started.iter().all(|s| !s));
    assert_eq!(fake.enumerations(), 1);
}

#[test]
fn lock_is_released_after_background_scan_panics() {
    // Arrange
    let mut fake = FakeProcesses::new(vec![]);
    fake.panic_on_enumeration = true;
    let (scanner, fake, _log) = scanner(fake);

    // Act
    assert!(scanner.trigger(99));
    wait_until(|| fake.enumerations() == 1 && !scanner.context.evaluation.is_busy());

    // Assert
    assert!(scanner.context.evaluation.try_begin().is_some());
}

#[test]
fn lock_is_released_when_visitor_panics() {
    // Arrange
    let fake = FakeProcesses::new(vec![snapshot(1, "hog", 10.0)]).with(1, BURN);
    let (scanner, _fake, _log) = scanner(fake);

    // Act
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        scanner.run_exclusive(99, |_| panic!("visitor failed"));
    }));

    // Assert
    assert!(result.is_err());
    assert!(!scanner.context.evaluation.is_busy());
}

#[test]
fn run_exclusive_refuses_while_busy() {
    // Arrange
    let (scanner, _fake, _log) = scanner(FakeProcesses::new(vec![]));
    let _held = scanner.context.evaluation.try_begin();

    // Act / Assert
    assert!(scanner.run_exclusive(99, |_| {}).is_none());
}
