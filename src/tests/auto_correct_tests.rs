use std::{thread, time::Duration};

use ime_switcher_core::{ConversionMode, ImeState, KeyboardLayoutId};
use tracing_test::traced_test;

use super::fakes::{Command, Harness, WINDOW, fast_settings, snapshot};
use crate::domain::{
    outcome::{ActionOutcome, Failure, SkipReason},
    ports::WindowHandle,
};

const PINYIN: u32 = 0x0804_0804;

fn alphanumeric() -> ImeState {
    ImeState {
        is_open: true,
        conversion: ConversionMode::ALPHANUMERIC,
    }
}

fn native() -> ImeState {
    ImeState {
        is_open: true,
        conversion: ConversionMode::NATIVE,
    }
}

fn pinyin_harness(ime: ImeState) -> Harness {
    Harness::new(
        snapshot(PINYIN, ime),
        fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
    )
}

fn force_native() -> Command {
    Command::Ime(WINDOW, Some(true), Some(ConversionMode::NATIVE))
}

#[traced_test]
#[test]
fn candidate_in_alphanumeric_mode_is_forced_to_native() {
    let h = pinyin_harness(alphanumeric());

    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
    assert_eq!(h.commander.commands(), vec![force_native()]);
    assert!(logs_contain("switched IME to native mode"));

    assert_eq!(
        h.engine.auto_correct_tick(),
        ActionOutcome::Skipped(SkipReason::AlreadyNative)
    );
    assert_eq!(h.commander.commands().len(), 1);
}

#[test]
fn user_override_is_respected_until_status_changes() {
    let h = pinyin_harness(alphanumeric());
    h.commander.fail_all(true);

    // The failed attempt still records the status, so it is not retried on every tick.
    assert_eq!(
        h.engine.auto_correct_tick(),
        ActionOutcome::Failed(Failure::ImeError)
    );
    h.commander.fail_all(false);
    assert_eq!(
        h.engine.auto_correct_tick(),
        ActionOutcome::Skipped(SkipReason::AlreadyCorrected)
    );
    assert_eq!(h.commander.commands().len(), 1);

    // Focus moves to another window: the status tuple differs, so it corrects again.
    let mut other = snapshot(PINYIN, alphanumeric());
    other.window = WindowHandle(0x9999);
    h.query.set(other);

    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
    assert_eq!(h.commander.commands().len(), 2);
}

#[test]
fn returning_to_alphanumeric_after_native_is_corrected_again() {
    let h = pinyin_harness(native());

    assert_eq!(
        h.engine.auto_correct_tick(),
        ActionOutcome::Skipped(SkipReason::AlreadyNative)
    );

    h.query.set_ime(alphanumeric());
    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
    assert_eq!(h.commander.commands(), vec![force_native()]);
}

#[test]
fn non_candidate_layouts_are_left_alone() {
    for layout in [0x0409_0409, 0x0419_0419, 0x0411_0411] {
        let h = Harness::new(
            snapshot(layout, alphanumeric()),
            fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
        );
        assert_eq!(
            h.engine.auto_correct_tick(),
            ActionOutcome::Skipped(SkipReason::NotCandidate)
        );
        assert!(h.commander.commands().is_empty());
    }
}

#[test]
fn noconversion_counts_as_not_native() {
    let h = pinyin_harness(ImeState {
        is_open: true,
        conversion: ConversionMode::NATIVE | ConversionMode::NOCONVERSION,
    });

    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
}

#[test]
fn all_microsoft_pinyin_layouts_are_candidates() {
    for layout in [0x0804_0804, 0x0000_0804, 0xE001_0804] {
        let h = Harness::new(
            snapshot(layout, ImeState::CLOSED),
            fast_settings(KeyboardLayoutId::CHINESE_SIMPLIFIED),
        );
        assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied, "{layout:08X}");
    }
}

#[test]
fn disabled_rule_does_nothing_and_enabling_resets_the_cache() {
    let h = pinyin_harness(alphanumeric());

    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
    h.query.set_ime(alphanumeric());

    h.engine.set_auto_correct_enabled(false);
    assert!(!h.engine.auto_correct_enabled());
    assert_eq!(
        h.engine.auto_correct_tick(),
        ActionOutcome::Skipped(SkipReason::Disabled)
    );

    h.engine.set_auto_correct_enabled(true);
    assert_eq!(h.engine.auto_correct_tick(), ActionOutcome::Applied);
    assert_eq!(h.commander.commands(), vec![force_native(), force_native()]);
}

#[test]
fn loop_corrects_and_stops_on_shutdown() {
    let h = pinyin_harness(alphanumeric());

    let worker = {
        let engine = std::sync::Arc::clone(&h.engine);
        thread::spawn(move || engine.run_auto_correct())
    };

    thread::sleep(Duration::from_millis(100));
    h.shutdown.cancel();
    worker.join().unwrap();

    assert_eq!(h.commander.commands(), vec![force_native()]);
}
