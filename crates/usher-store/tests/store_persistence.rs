//! Persistence round-trip tests: everything a session writes must survive
//! a process restart through `Store::open`.

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use usher_core::conflicts::{ConflictSet, EmailToName};
use usher_core::ops::{FailureReason, OperationKind, OperationResult};
use usher_core::rounds::RoundPhase;
use usher_store::trail::read_trail;
use usher_store::Store;

fn sample_conflicts() -> (ConflictSet, EmailToName) {
    let mut conflicts = ConflictSet::new();
    conflicts.insert("1", "alice@example.com");
    conflicts.insert("1", "bob@example.com");
    conflicts.insert("2", "carol@example.com");
    let mut names = EmailToName::new();
    names.insert("alice@example.com".into(), "Alice Cooper".into());
    (conflicts, names)
}

#[test]
fn full_state_survives_reopen() {
    let dir = tempdir().unwrap();
    let (conflicts, names) = sample_conflicts();

    {
        let mut store = Store::open(dir.path(), "ses-1").unwrap();
        store.replace_conflicts(conflicts.clone(), names.clone()).unwrap();
        store.select_round(Some("1".into())).unwrap();
        store.set_email_override("p7", "Seven@X.com").unwrap();
        store.start_round("1").unwrap();
        store
            .record_moved(
                "1",
                &[
                    OperationResult::succeeded("p1", 0),
                    OperationResult::succeeded("p2", 1),
                ],
            )
            .unwrap();
    }

    let reopened = Store::open(dir.path(), "ses-1").unwrap();
    assert_eq!(reopened.conflicts(), &conflicts);
    assert_eq!(reopened.names(), &names);
    assert_eq!(reopened.selected_round(), Some("1"));
    assert_eq!(
        reopened.moved_participants("1"),
        ["p1", "p2"].map(String::from).into()
    );
    let state = reopened.round_state("1").unwrap();
    assert_eq!(state.phase, RoundPhase::Active);
    assert_eq!(state.moved_count, 2);
    assert!(state.started_at.is_some());
}

#[test]
fn sessions_are_isolated() {
    let dir = tempdir().unwrap();
    let (conflicts, names) = sample_conflicts();

    let mut first = Store::open(dir.path(), "ses-a").unwrap();
    first.replace_conflicts(conflicts, names).unwrap();

    let second = Store::open(dir.path(), "ses-b").unwrap();
    assert!(second.conflicts().is_empty());
}

#[test]
fn double_start_survives_reopen_without_duplicates() {
    let dir = tempdir().unwrap();

    {
        let mut store = Store::open(dir.path(), "ses-1").unwrap();
        store.start_round("1").unwrap();
        store.record_moved("1", &[OperationResult::succeeded("p1", 0)]).unwrap();
        // Operator clicks start again mid-round.
        store.start_round("1").unwrap();
    }

    let reopened = Store::open(dir.path(), "ses-1").unwrap();
    assert_eq!(reopened.rounds().count(), 1);
    assert_eq!(
        reopened.moved_participants("1"),
        ["p1"].map(String::from).into()
    );
    assert_eq!(reopened.round_state("1").unwrap().moved_count, 1);
}

#[test]
fn partial_admit_failure_keeps_moved_set_across_restart() {
    let dir = tempdir().unwrap();

    {
        let mut store = Store::open(dir.path(), "ses-1").unwrap();
        store.start_round("1").unwrap();
        store
            .record_moved(
                "1",
                &[
                    OperationResult::succeeded("p1", 0),
                    OperationResult::succeeded("p2", 0),
                ],
            )
            .unwrap();
        // p2's admit failed permanently when ending the round.
        let summary = store
            .end_round(
                "1",
                &[
                    OperationResult::succeeded("p1", 0),
                    OperationResult::failed(
                        "p2",
                        FailureReason::Transient {
                            message: "admit failed".into(),
                        },
                        3,
                    ),
                ],
            )
            .unwrap();
        assert_eq!(summary.admitted, 1);
        assert_eq!(summary.failed, 1);
    }

    let reopened = Store::open(dir.path(), "ses-1").unwrap();
    let state = reopened.round_state("1").unwrap();
    assert_eq!(state.phase, RoundPhase::Ended);
    assert_eq!(state.admitted_count, 1);
    // p2 is still recorded as moved, so a later manual retry can find it.
    assert_eq!(
        reopened.moved_participants("1"),
        ["p1", "p2"].map(String::from).into()
    );
}

#[test]
fn ended_round_can_restart_after_reopen() {
    let dir = tempdir().unwrap();

    {
        let mut store = Store::open(dir.path(), "ses-1").unwrap();
        store.start_round("1").unwrap();
        store.record_moved("1", &[OperationResult::succeeded("p1", 0)]).unwrap();
        store.end_round("1", &[OperationResult::succeeded("p1", 0)]).unwrap();
    }

    let mut reopened = Store::open(dir.path(), "ses-1").unwrap();
    reopened.start_round("1").unwrap();
    let state = reopened.round_state("1").unwrap();
    assert_eq!(state.phase, RoundPhase::Active);
    assert_eq!(
        reopened.moved_participants("1"),
        ["p1"].map(String::from).into()
    );
}

#[test]
fn trail_records_every_attempt() {
    let dir = tempdir().unwrap();

    let mut store = Store::open(dir.path(), "ses-1").unwrap();
    store.start_round("1").unwrap();
    store
        .record_moved(
            "1",
            &[
                OperationResult::succeeded("p1", 0),
                OperationResult::failed(
                    "p2",
                    FailureReason::Transient {
                        message: "down".into(),
                    },
                    3,
                ),
            ],
        )
        .unwrap();
    store.end_round("1", &[OperationResult::succeeded("p1", 0)]).unwrap();

    let records = read_trail(&dir.path().join("trail"), "ses-1").unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].operation, OperationKind::MoveToWaitingRoom);
    assert!(records[0].result.success);
    assert!(!records[1].result.success);
    assert_eq!(records[2].operation, OperationKind::AdmitFromWaitingRoom);
    assert!(records.iter().all(|r| r.session_id == "ses-1" && r.round_id == "1"));
}

#[test]
fn assignment_attempts_land_in_trail() {
    let dir = tempdir().unwrap();

    let mut store = Store::open(dir.path(), "ses-1").unwrap();
    store.start_round("2").unwrap();
    store
        .record_assignments(
            "2",
            &[
                OperationResult::succeeded("p1", 0),
                OperationResult::failed(
                    "p2",
                    FailureReason::Transient {
                        message: "room full".into(),
                    },
                    3,
                ),
            ],
        )
        .unwrap();

    let records = read_trail(&dir.path().join("trail"), "ses-1").unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.operation == OperationKind::AssignToBreakoutRoom && r.round_id == "2"));
    assert!(records[0].result.success);
    assert!(!records[1].result.success);
}

#[test]
fn disabled_trail_writes_nothing() {
    let dir = tempdir().unwrap();

    {
        let mut store = Store::open_with_trail(dir.path(), "ses-1", false).unwrap();
        store.start_round("1").unwrap();
        store.record_moved("1", &[OperationResult::succeeded("p1", 0)]).unwrap();
        store.end_round("1", &[OperationResult::succeeded("p1", 0)]).unwrap();
    }

    assert!(read_trail(&dir.path().join("trail"), "ses-1").unwrap().is_empty());
    // The state document is untouched by the trail setting.
    let reopened = Store::open(dir.path(), "ses-1").unwrap();
    assert_eq!(reopened.round_state("1").unwrap().admitted_count, 1);
}

#[test]
fn corrupt_document_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("ses-1.json"), "not json {").unwrap();
    let err = Store::open(dir.path(), "ses-1").unwrap_err();
    assert!(err.to_string().contains("corrupt"));
}
