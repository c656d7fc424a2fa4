#![allow(clippy::unwrap_used, clippy::float_cmp)]

// Coordinator behavior against an instrumented transport, on a paused clock.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

use common::{Call, MockTransport, Reply, config, full_payload};
use cyberq_core::{
    Availability, Coordinator, CoordinatorEvent, CoreError, Field, FieldValue, ProbeId, RampProbe,
    RefreshOutcome, Status, UnavailableReason, WriteError,
};

fn coordinator(mock: &MockTransport) -> Coordinator<MockTransport> {
    Coordinator::with_transport(config(), mock.clone())
}

/// Availability transitions seen on the event channel, in order.
fn availability_events(rx: &mut broadcast::Receiver<CoordinatorEvent>) -> Vec<&'static str> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let CoordinatorEvent::AvailabilityChanged(state) = event {
            seen.push(if state.is_available() { "available" } else { "unavailable" });
        }
    }
    seen
}

fn cook_temp(coordinator: &Coordinator<MockTransport>) -> Option<f64> {
    coordinator.current_snapshot().unwrap().cook().temperature
}

// ── Availability ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn repeated_failures_notify_unavailable_once() {
    let mock = MockTransport::new(full_payload());
    mock.script([
        Reply::Current,
        Reply::Timeout,
        Reply::Timeout,
        Reply::Timeout,
        Reply::Timeout,
        Reply::Refused,
    ]);
    let coordinator = coordinator(&mock);
    let mut events = coordinator.subscribe();

    coordinator.start().await;
    // ticks at 0, 5, 10, 15, 20, 25
    tokio::time::sleep(Duration::from_secs(26)).await;
    coordinator.stop().await;

    assert_eq!(mock.fetches(), 6);
    assert_eq!(availability_events(&mut events), ["available", "unavailable"]);
    match coordinator.availability() {
        Availability::Unavailable {
            reason,
            consecutive_failures,
            ..
        } => {
            assert_eq!(reason, UnavailableReason::Transport);
            assert_eq!(consecutive_failures, 5);
        }
        Availability::Available => panic!("expected unavailable"),
    }
    // the last good snapshot is kept
    assert_eq!(cook_temp(&coordinator), Some(225.0));
}

#[tokio::test(start_paused = true)]
async fn never_reached_device_notifies_once_at_the_threshold() {
    let mock = MockTransport::new(full_payload());
    mock.script([Reply::Timeout, Reply::Timeout, Reply::Timeout, Reply::Timeout]);
    let coordinator = coordinator(&mock);
    let mut events = coordinator.subscribe();

    let unavailable = |coordinator: &Coordinator<MockTransport>| match coordinator.availability() {
        Availability::Unavailable {
            reason,
            consecutive_failures,
            ..
        } => (reason, consecutive_failures),
        Availability::Available => panic!("expected unavailable"),
    };

    for expected in 1..=2 {
        assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
        assert_eq!(
            unavailable(&coordinator),
            (UnavailableReason::NotYetPolled, expected)
        );
    }
    assert!(availability_events(&mut events).is_empty());

    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
    assert_eq!(unavailable(&coordinator), (UnavailableReason::Transport, 3));
    assert_eq!(availability_events(&mut events), ["unavailable"]);

    // further failures keep counting without another notification
    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
    assert_eq!(unavailable(&coordinator), (UnavailableReason::Transport, 4));
    assert!(availability_events(&mut events).is_empty());
    assert!(coordinator.current_snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn first_success_after_outage_recovers_and_resets_the_count() {
    let mock = MockTransport::new(full_payload());
    mock.script([
        Reply::Current,
        Reply::Timeout,
        Reply::Timeout,
        Reply::Timeout,
        Reply::Current,
        Reply::Timeout,
        Reply::Timeout,
    ]);
    let coordinator = coordinator(&mock);
    let mut events = coordinator.subscribe();

    coordinator.start().await;
    // ticks at 0 .. 30
    tokio::time::sleep(Duration::from_secs(31)).await;
    coordinator.stop().await;

    assert_eq!(mock.fetches(), 7);
    // two failures after recovery stay below the threshold
    assert_eq!(
        availability_events(&mut events),
        ["available", "unavailable", "available"]
    );
    assert!(coordinator.availability().is_available());
}

#[tokio::test(start_paused = true)]
async fn outage_then_new_reading() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);
    let mut events = coordinator.subscribe();

    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Updated(_)));
    let snapshot = coordinator.current_snapshot().unwrap();
    assert_eq!(snapshot.cook().temperature, Some(225.0));
    assert_eq!(snapshot.cook().status, Status::Ok);

    mock.script([Reply::Timeout, Reply::Timeout, Reply::Timeout]);
    for _ in 0..2 {
        assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
        assert!(coordinator.availability().is_available());
    }
    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
    assert!(!coordinator.availability().is_available());

    mock.set("COOK_TEMP", "2300");
    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Updated(_)));
    assert!(coordinator.availability().is_available());
    assert_eq!(cook_temp(&coordinator), Some(230.0));
    assert_eq!(
        availability_events(&mut events),
        ["available", "unavailable", "available"]
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_payloads_mark_the_device_unavailable() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);
    coordinator.refresh().await;
    let before = coordinator.current_snapshot().unwrap();

    mock.script([Reply::Garbage, Reply::Garbage, Reply::Garbage]);
    for _ in 0..3 {
        assert!(matches!(coordinator.refresh().await, RefreshOutcome::Failed));
    }

    assert!(matches!(
        coordinator.availability(),
        Availability::Unavailable {
            reason: UnavailableReason::Parse,
            consecutive_failures: 3,
            ..
        }
    ));
    assert_eq!(coordinator.current_snapshot().unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn first_refresh_surfaces_the_error() {
    let mock = MockTransport::new(full_payload());
    mock.script([Reply::Refused]);
    let coordinator = coordinator(&mock);

    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Transport(_)), "{err:?}");
    // one failure is below the threshold
    assert!(matches!(
        coordinator.availability(),
        Availability::Unavailable {
            reason: UnavailableReason::NotYetPolled,
            consecutive_failures: 1,
            ..
        }
    ));

    let snapshot = coordinator.first_refresh().await.unwrap();
    assert_eq!(snapshot.sequence, 2);
    assert!(coordinator.availability().is_available());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn out_of_range_writes_never_reach_the_device() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);

    let cases: Vec<(Field, FieldValue)> = vec![
        (Field::CookSet, FieldValue::Number(500.0)),
        (Field::CookSet, FieldValue::Number(31.0)),
        (Field::AlarmDev, FieldValue::Number(101.0)),
        (Field::PropBand, FieldValue::Number(4.0)),
        (Field::CycleTime, FieldValue::Number(2.5)),
        (Field::CookName, FieldValue::Text(String::new())),
        (Field::CookName, FieldValue::Text("Brisket!".into())),
        (Field::CookRamp, FieldValue::Option("Food 4".into())),
        (Field::KeyBeeps, FieldValue::Number(1.0)),
    ];
    for (field, value) in cases {
        let err = coordinator.write(field, value.clone()).await.unwrap_err();
        assert!(
            matches!(err, WriteError::InvalidValue { field: f, .. } if f == field),
            "{field} = {value:?}: {err:?}"
        );
    }

    let err = coordinator.write(Field::CookTemp, 200.0).await.unwrap_err();
    assert!(matches!(err, WriteError::ReadOnly(Field::CookTemp)));

    assert_eq!(mock.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn write_during_poll_waits_then_applies() {
    let mock = MockTransport::new(full_payload());
    mock.set_fetch_delay(Duration::from_secs(2));
    let coordinator = coordinator(&mock);

    coordinator.start().await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(mock.log(), [Call::FetchStart]);

    let writer = coordinator.clone();
    let write = tokio::spawn(async move { writer.write(Field::AlarmDev, 15.0).await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(mock.writes(), 0, "write must wait for the poll");

    write.await.unwrap().unwrap();
    assert_eq!(
        mock.log(),
        [
            Call::FetchStart,
            Call::FetchEnd,
            Call::Write("ALARMDEV".into(), "15".into())
        ]
    );
    assert_eq!(coordinator.current_snapshot().unwrap().control.alarm_deviation, 15);

    // next poll agrees with the write
    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(mock.fetches(), 2);
    assert_eq!(coordinator.current_snapshot().unwrap().control.alarm_deviation, 15);

    // the device is authoritative once it reports something else
    mock.set("ALARMDEV", "20");
    tokio::time::sleep(Duration::from_secs(5)).await;
    coordinator.stop().await;
    assert_eq!(coordinator.current_snapshot().unwrap().control.alarm_deviation, 20);
    assert!(!mock.overlapped());
}

#[tokio::test(start_paused = true)]
async fn concurrent_writes_and_polls_never_overlap() {
    let mock = MockTransport::new(full_payload());
    mock.set_fetch_delay(Duration::from_millis(700));
    mock.set_write_delay(Duration::from_millis(300));
    let coordinator =
        Coordinator::with_transport(config().with_poll_interval(Duration::from_secs(1)), mock.clone());

    coordinator.start().await;
    let writers: Vec<_> = (0..10u8)
        .map(|i| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(250) * u32::from(i)).await;
                coordinator.write(Field::AlarmDev, f64::from(i)).await
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap().unwrap();
    }
    tokio::time::sleep(Duration::from_secs(3)).await;
    coordinator.stop().await;

    assert!(!mock.overlapped());
    assert_eq!(mock.writes(), 10);
    assert!(mock.fetches() >= 2);
}

#[tokio::test(start_paused = true)]
async fn write_gives_up_when_the_lock_is_held_too_long() {
    let mock = MockTransport::new(full_payload());
    mock.set_fetch_delay(Duration::from_secs(3));
    let coordinator = Coordinator::with_transport(
        config().with_write_lock_timeout(Duration::from_secs(1)),
        mock.clone(),
    );

    coordinator.start().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let err = coordinator.write(Field::KeyBeeps, true).await.unwrap_err();
    coordinator.stop().await;

    assert!(matches!(err, WriteError::Busy { waited_ms: 1000 }), "{err:?}");
    assert_eq!(mock.writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn poll_is_skipped_while_a_write_holds_the_device() {
    let mock = MockTransport::new(full_payload());
    mock.set_write_delay(Duration::from_secs(2));
    let coordinator = coordinator(&mock);
    coordinator.refresh().await;

    let writer = coordinator.clone();
    let write = tokio::spawn(async move { writer.write(Field::CookSet, 230.0).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Skipped));
    write.await.unwrap().unwrap();
    assert_eq!(mock.fetches(), 1);
    assert_eq!(mock.log().last(), Some(&Call::Write("COOK_SET".into(), "230".into())));
}

#[tokio::test(start_paused = true)]
async fn accepted_write_publishes_a_newer_snapshot() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);
    coordinator.refresh().await;
    let before = coordinator.current_snapshot().unwrap();
    let mut events = coordinator.subscribe();

    coordinator
        .write(Field::CookRamp, FieldValue::Option("food 2".into()))
        .await
        .unwrap();

    let after = coordinator.current_snapshot().unwrap();
    assert!(after.sequence > before.sequence);
    assert_eq!(after.control.ramp, RampProbe::Food2);
    match events.try_recv().unwrap() {
        CoordinatorEvent::DataUpdated(published) => assert_eq!(published, after),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(mock.log().last(), Some(&Call::Write("COOK_RAMP".into(), "2".into())));
}

#[tokio::test(start_paused = true)]
async fn rejected_write_leaves_the_snapshot_alone() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);
    coordinator.refresh().await;
    let before = coordinator.current_snapshot().unwrap();

    mock.reject_next_write("2250");
    let err = coordinator.write(Field::CookSet, 230.0).await.unwrap_err();

    assert!(
        matches!(
            &err,
            WriteError::Rejected { field: Field::CookSet, echoed, .. } if echoed == "2250"
        ),
        "{err:?}"
    );
    assert_eq!(coordinator.current_snapshot().unwrap(), before);
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stopped_coordinator_makes_no_more_calls() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);

    coordinator.start().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.stop().await;
    let calls = mock.calls();

    assert!(matches!(
        coordinator.write(Field::KeyBeeps, true).await,
        Err(WriteError::Stopped)
    ));
    assert!(matches!(coordinator.refresh().await, RefreshOutcome::Stopped));
    assert!(matches!(coordinator.first_refresh().await, Err(CoreError::Stopped)));

    coordinator.start().await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn snapshot_stream_sees_each_publish() {
    let mock = MockTransport::new(full_payload());
    let coordinator = coordinator(&mock);
    let mut stream = coordinator.snapshots();
    assert!(stream.current().is_none());

    coordinator.refresh().await;
    let first = stream.changed().await.unwrap();
    assert_eq!(first.sequence, 1);

    coordinator.write(Field::Food1Set, 200.0).await.unwrap();
    let second = stream.changed().await.unwrap();
    assert_eq!(second.sequence, 2);
    assert_eq!(second.probe(ProbeId::Food1).target, 200.0);
    assert_eq!(stream.current().map(|s| s.sequence), Some(2));
}
