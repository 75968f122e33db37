use std::{
    thread,
    time::{Duration, Instant},
};

use ime_switcher_core::{ImeState, KeyboardLayoutId};

use super::fakes::{Harness, fast_settings, snapshot};
use crate::domain::outcome::{ActionOutcome, SkipReason};

const RUSSIAN: KeyboardLayoutId = KeyboardLayoutId(0x0000_0419);

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

/// Waits until `n` layout commands were issued, then a little longer so the session has
/// cleared the activity recorded before the switch.
fn wait_switched(h: &Harness, n: usize) {
    assert!(wait_until(Duration::from_secs(3), || h.commander.layouts().len() == n));
    thread::sleep(Duration::from_millis(30));
}

/// Records a key press and returns how long after it the revert command was issued.
fn revert_delay_after_press(h: &Harness) -> Duration {
    let pressed_at = Instant::now();
    h.activity.record_press();
    while h.commander.layouts().len() < 2 {
        assert!(pressed_at.elapsed() < Duration::from_secs(5), "no revert");
        thread::sleep(Duration::from_millis(1));
    }
    pressed_at.elapsed()
}

/// Scheduling allowance on top of one poll period.
const SLACK: Duration = Duration::from_millis(50);

/// English window with a non-Chinese secondary layout, so no composition floor applies.
fn russian_harness() -> Harness {
    Harness::new(snapshot(0x0409_0409, ImeState::CLOSED), fast_settings(RUSSIAN))
}

#[test]
fn reverts_after_typing_then_idle() {
    let h = russian_harness();
    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(60))
        .unwrap();

    wait_switched(&h, 1);
    h.activity.record_press();

    let outcome = worker.join().unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(h.commander.layouts(), vec![RUSSIAN, KeyboardLayoutId::ENGLISH_US]);
    assert!(!h.engine.is_session_active());
}

#[test]
fn revert_lands_within_one_poll_after_the_interval() {
    let h = russian_harness();
    let interval = Duration::from_millis(120);
    let poll = h.engine.settings().timing.poll;
    let worker = h.engine.spawn_temp_toggle(interval).unwrap();

    wait_switched(&h, 1);
    let delay = revert_delay_after_press(&h);

    assert!(delay >= interval, "reverted after {delay:?}");
    assert!(delay <= interval + poll + SLACK, "reverted after {delay:?}");
    assert_eq!(worker.join().unwrap(), ActionOutcome::Applied);
}

#[test]
fn keeps_waiting_while_user_types() {
    let h = russian_harness();
    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(80))
        .unwrap();

    wait_switched(&h, 1);

    // Presses closer together than the interval keep the session alive.
    for _ in 0..6 {
        h.activity.record_press();
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(h.commander.layouts().len(), 1);

    let outcome = worker.join().unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(h.commander.layouts().len(), 2);
}

#[test]
fn never_reverts_without_a_key_press() {
    let h = russian_harness();
    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(20))
        .unwrap();

    thread::sleep(Duration::from_millis(250));
    assert_eq!(h.commander.layouts(), vec![RUSSIAN]);
    assert!(h.engine.is_session_active());

    h.shutdown.cancel();
    assert_eq!(
        worker.join().unwrap(),
        ActionOutcome::Skipped(SkipReason::Cancelled)
    );
    assert_eq!(h.commander.layouts(), vec![RUSSIAN]);
    assert!(!h.engine.is_session_active());
}

#[test]
fn presses_before_the_switch_do_not_count() {
    let h = russian_harness();
    h.activity.record_press();

    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(20))
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    assert_eq!(h.commander.layouts().len(), 1);

    h.shutdown.cancel();
    worker.join().unwrap();
}

#[test]
fn second_trigger_during_session_is_rejected() {
    let h = russian_harness();
    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(40))
        .unwrap();

    assert!(wait_until(Duration::from_secs(2), || h.engine.is_session_active()));
    assert_eq!(
        h.engine.temp_toggle(Duration::from_millis(40)),
        ActionOutcome::Skipped(SkipReason::Reentry)
    );

    wait_switched(&h, 1);
    h.activity.record_press();
    worker.join().unwrap();

    // Exactly one switch and one revert.
    assert_eq!(h.commander.layouts(), vec![RUSSIAN, KeyboardLayoutId::ENGLISH_US]);

    // Session is free again.
    let again = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(20))
        .unwrap();
    wait_switched(&h, 3);
    h.activity.record_press();
    assert_eq!(again.join().unwrap(), ActionOutcome::Applied);
}

#[test]
fn english_to_chinese_waits_at_least_the_composition_floor() {
    let h = Harness::english();
    let timing = h.engine.settings().timing;
    let worker = h
        .engine
        .spawn_temp_toggle(Duration::from_millis(10))
        .unwrap();

    wait_switched(&h, 1);
    let delay = revert_delay_after_press(&h);

    assert!(delay >= timing.composition_floor, "reverted after {delay:?}");
    assert!(
        delay <= timing.composition_floor + timing.poll + SLACK,
        "reverted after {delay:?}"
    );
    assert_eq!(worker.join().unwrap(), ActionOutcome::Applied);
    assert_eq!(
        h.commander.layouts(),
        vec![KeyboardLayoutId::CHINESE_SIMPLIFIED, KeyboardLayoutId::ENGLISH_US]
    );
}

#[test]
fn shutdown_during_settle_issues_nothing() {
    let h = russian_harness();
    h.shutdown.cancel();

    assert_eq!(
        h.engine.temp_toggle(Duration::from_millis(20)),
        ActionOutcome::Skipped(SkipReason::Cancelled)
    );
    assert!(h.commander.layouts().is_empty());
    assert!(!h.engine.is_session_active());
}

#[test]
fn failed_switch_ends_the_session() {
    let h = russian_harness();
    h.commander.fail_all(true);

    assert!(matches!(
        h.engine.temp_toggle(Duration::from_millis(20)),
        ActionOutcome::Failed(_)
    ));
    assert!(!h.engine.is_session_active());
}
